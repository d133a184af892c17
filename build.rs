#![forbid(unsafe_code)]

fn main() {
    // Builds outside a git checkout still succeed; the version endpoint
    // reports "unknown" for whatever could not be determined.
    set_build_env("GIT_BRANCH", build_data::get_git_branch());
    set_build_env("GIT_COMMIT_SHORT", build_data::get_git_commit_short());
    set_build_env("GIT_DIRTY", build_data::get_git_dirty());
    set_build_env("RUSTC_VERSION", build_data::get_rustc_version());

    // Tells cargo not to rebuild build.rs during debug builds when other files change.
    // This speeds up development builds.
    //build_data::no_debug_rebuilds();
}

fn set_build_env<T: std::fmt::Display, E>(name: &str, value: Result<T, E>) {
    let value = match value {
        Ok(v) => v.to_string(),
        Err(_) => "unknown".to_string(),
    };
    println!("cargo:rustc-env={}={}", name, value);
}
