#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::Result;
use log::{error, info};
use poem::middleware::Cors;
use poem::{listener::TcpListener, EndpointExt};

// Sapatos Utilities
use crate::utils::config::{get_parms, init_log, Parms};
use crate::utils::db::{MySqlShoeRepository, SharedRepository};
use crate::utils::db_init::connect_options;
use crate::utils::errors::Errors;

// Modules
mod api;
mod utils;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SERVER_NAME : &str = "SapatosServer"; // for poem logging

// ***************************************************************************
//                             Runtime Context
// ***************************************************************************
// Everything built once at startup.  The repository handle is the only part
// the endpoints see.
#[derive(Debug)]
struct RuntimeCtx {
    parms: Parms,
}

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() {
    // --------------- Initialize Server --------------
    // Announce ourselves.
    println!("Starting sapatos_server!");

    // Initialize logging and read configuration.  Either failing ends the
    // process before anything is bound.
    let ctx = match sapatos_init() {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("ERROR: sapatos_server initialization failed: {:#}", e);
            std::process::exit(1);
        }
    };

    // --------------- Main Loop Set Up ---------------
    let config = &ctx.parms.config;
    let server_url = format!("http://{}:{}", config.http_addr, config.http_port);
    let addr = format!("{}:{}", config.http_addr, config.http_port);

    // One storage handle shared by every endpoint; each request still
    // opens and closes its own connection through it.
    let repo: SharedRepository = Arc::new(MySqlShoeRepository::new(connect_options(&config.db)));
    let app = api::build_routes(repo, &server_url).with(Cors::new());

    // ------------------ Main Loop -------------------
    info!("{} listening on {} (configuration: {})", config.title, addr, ctx.parms.config_source());
    let result = poem::Server::new(TcpListener::bind(addr.clone()))
        .name(SERVER_NAME)
        .run(app)
        .await;

    if let Err(e) = result {
        error!("{}", Errors::ServerStart(addr, e.to_string()));
        log::logger().flush();
        std::process::exit(1);
    }
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// sapatos_init:
// ---------------------------------------------------------------------------
/** Initialize all subsystems and data structures other than those needed
 * to configure the main loop processor.
 */
fn sapatos_init() -> Result<RuntimeCtx> {
    // Configure our log.
    init_log()?;

    // Read the input parameters.
    let ctx = RuntimeCtx { parms: get_parms()? };
    info!("{}", Errors::InputParms(format!("{:#?}", ctx)));

    // Log build info.
    print_version_info();
    Ok(ctx)
}

// ---------------------------------------------------------------------------
// print_version_info:
// ---------------------------------------------------------------------------
fn print_version_info() {
    info!("\n*** Running SAPATOS={}, BRANCH={}, COMMIT={}, DIRTY={}, RUSTC={}",
          option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"),
          env!("GIT_BRANCH"),
          env!("GIT_COMMIT_SHORT"),
          env!("GIT_DIRTY"),
          env!("RUSTC_VERSION"));
}
