#![forbid(unsafe_code)]

use anyhow::{Result, anyhow};
use log::{info, error, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use serde::Deserialize;
use std::{env, fs, path::Path};
use lazy_static::lazy_static;
use structopt::StructOpt;

// Sapatos Utilities
use crate::utils::{sapatos_utils, errors::Errors};

use super::sapatos_utils::get_absolute_path;

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Directory and file locations. Unless otherwise noted, all files and directories
// are relative to the root directory.
const ENV_SAPATOS_ROOT_DIR : &str = "SAPATOS_ROOT_DIR";
const DEFAULT_ROOT_DIR     : &str = "~/.sapatos";
const CONFIG_DIR           : &str = "/config";
const LOG4RS_CONFIG_FILE   : &str = "/log4rs.yml";    // relative to config dir
const SAPATOS_CONFIG_FILE  : &str = "/sapatos.toml";  // relative to config dir

// Networking.
const DEFAULT_HTTP_ADDR    : &str = "0.0.0.0";
const DEFAULT_HTTP_PORT    : u16  = 8000;

// Database.
const DEFAULT_DB_HOST      : &str = "localhost";
const DEFAULT_DB_PORT      : u16  = 3306;
const DEFAULT_DB_USER      : &str = "root";
const DEFAULT_DB_NAME      : &str = "sapatos";

// Used when no log4rs configuration file is installed.
const DEFAULT_LOG_PATTERN  : &str = "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {M} - {m}{n}";

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Assign the command line arguments BEFORE the runtime context is built in main.
lazy_static! {
    pub static ref SAPATOS_ARGS: SapatosArgs = init_sapatos_args();
}

// ***************************************************************************
//                               Config Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// SapatosArgs:
// ---------------------------------------------------------------------------
#[derive(Debug, StructOpt)]
#[structopt(name = "sapatos_args", about = "Command line arguments for the Sapatos Server.")]
pub struct SapatosArgs {
    /// Specify the server's root data directory.
    ///
    /// The root directory is calculated using the following priority order:
    ///
    ///   1. If set, the value of the SAPATOS_ROOT_DIR environment,
    ///
    ///   2. Otherwise, if set, the value of the --root-dir command line argument,
    ///
    ///   3. Otherwise, ~/.sapatos
    ///
    #[structopt(short, long)]
    pub root_dir: Option<String>,

    /// Read the server configuration from this TOML file instead of
    /// <root-dir>/config/sapatos.toml.
    #[structopt(short, long)]
    pub config_file: Option<String>,
}

// ---------------------------------------------------------------------------
// Parms:
// ---------------------------------------------------------------------------
#[derive(Debug)]
pub struct Parms {
    /// None when no file could be read and the defaults are in effect.
    pub config_file: Option<String>,
    pub config: Config,
}

impl Parms {
    /// Where the running configuration came from, for the startup log.
    pub fn config_source(&self) -> &str {
        self.config_file.as_deref().unwrap_or("<built-in defaults>")
    }
}

// ---------------------------------------------------------------------------
// Config:
// ---------------------------------------------------------------------------
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub http_addr: String,
    pub http_port: u16,
    pub db: DbConfig,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Sapatos Server".to_string(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            db: DbConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// DbConfig:
// ---------------------------------------------------------------------------
#[derive(Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            user: DEFAULT_DB_USER.to_string(),
            password: String::new(),
            database: DEFAULT_DB_NAME.to_string(),
        }
    }
}

// Keep the password out of the startup log.
impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

// ***************************************************************************
//                            Directory Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_sapatos_args:
// ---------------------------------------------------------------------------
/** Get the command line arguments. */
fn init_sapatos_args() -> SapatosArgs {
    let args = SapatosArgs::from_args();
    println!("{:?}", args);
    args
}

// ---------------------------------------------------------------------------
// get_root_dir:
// ---------------------------------------------------------------------------
fn get_root_dir() -> String {
    // Order of precedence:
    //  1. Environment variable
    //  2. Command line --root-dir argument
    //  3. Default location
    //
    let root_dir = env::var(ENV_SAPATOS_ROOT_DIR).unwrap_or_else(
        |_| {
            match SAPATOS_ARGS.root_dir.clone() {
                Some(r) => r,
                None => DEFAULT_ROOT_DIR.to_string(),
            }
        });

    // Canonicalize the path.
    get_absolute_path(&root_dir)
}

// ---------------------------------------------------------------------------
// get_config_dir:
// ---------------------------------------------------------------------------
fn get_config_dir() -> String {
    get_root_dir() + CONFIG_DIR
}

// ***************************************************************************
//                               Log Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_log:
// ---------------------------------------------------------------------------
/** Initialize log4rs from the installed configuration file or, if there is
 * none, with a console appender at info level.
 */
pub fn init_log() -> Result<()> {
    let logconfig = get_config_dir() + LOG4RS_CONFIG_FILE;
    if Path::new(&logconfig).is_file() {
        match log4rs::init_file(&logconfig, Default::default()) {
            Ok(_) => (),
            Err(e) => {
                println!("{}", e);
                return Err(anyhow!(Errors::Log4rsInitialization(logconfig)));
            },
        }
        info!("Log4rs initialized using: {}", logconfig);
    } else {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(DEFAULT_LOG_PATTERN)))
            .build();
        let config = LogConfig::builder()
            .appender(Appender::builder().build("stdout", Box::new(stdout)))
            .build(Root::builder().appender("stdout").build(LevelFilter::Info))
            .map_err(|e| anyhow!(Errors::Log4rsInitialization(e.to_string())))?;
        log4rs::init_config(config)
            .map_err(|e| anyhow!(Errors::Log4rsInitialization(e.to_string())))?;
        info!("Log4rs initialized with console defaults, no file at: {}", logconfig);
    }
    Ok(())
}

/// ***************************************************************************
//                             Parms Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_parms:
// ---------------------------------------------------------------------------
/** Retrieve the application parameters from the configuration file specified
 * on the command line or, by default, from the root directory's config
 * subdirectory.  If the file can't be read, the default values are used.
 */
pub fn get_parms() -> Result<Parms> {
    // Get the config file path.
    let config_file = match &SAPATOS_ARGS.config_file {
        Some(f) => f.clone(),
        None => get_config_dir() + SAPATOS_CONFIG_FILE,
    };

    // Read the cofiguration file.
    let config_file_abs = sapatos_utils::get_absolute_path(&config_file);
    info!("{}", Errors::ReadingConfigFile(config_file_abs.clone()));
    let contents = match fs::read_to_string(&config_file_abs) {
        Ok(c) => c,
        Err(_) => {
            info!("Unable to read configuration at {}. Using default values.", config_file_abs);
            return Ok(Parms { config_file: None, config: Config::new() });
        }
    };

    // Parse the toml configuration.
    let config = parse_config(&contents, &config_file_abs)?;
    Ok(Parms { config_file: Some(config_file_abs), config })
}

// ---------------------------------------------------------------------------
// parse_config:
// ---------------------------------------------------------------------------
fn parse_config(contents: &str, config_file: &str) -> Result<Config> {
    match toml::from_str(contents) {
        Ok(c)  => Ok(c),
        Err(e) => {
            let msg = format!("{}\n   {}", Errors::TOMLParseError(config_file.to_string()), e);
            error!("{}", msg);
            Err(anyhow!(msg))
        }
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::new();
        assert_eq!(config.http_port, 8000);
        assert_eq!(config.db.database, "sapatos");
        assert_eq!(config.db.user, "root");
        assert!(config.db.password.is_empty());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let toml = r#"
            http_port = 9090

            [db]
            host = "db.internal"
            password = "segredo"
        "#;
        let config = parse_config(toml, "test.toml").unwrap();
        assert_eq!(config.http_port, 9090);
        assert_eq!(config.http_addr, "0.0.0.0");
        assert_eq!(config.db.host, "db.internal");
        assert_eq!(config.db.port, 3306);
        assert_eq!(config.db.password, "segredo");
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(parse_config("http_port = \"oito mil\"", "bad.toml").is_err());
    }

    #[test]
    fn config_source() {
        let parms = Parms { config_file: None, config: Config::new() };
        assert_eq!(parms.config_source(), "<built-in defaults>");
        let parms = Parms { config_file: Some("/etc/sapatos.toml".to_string()), config: Config::new() };
        assert_eq!(parms.config_source(), "/etc/sapatos.toml");
    }

    #[test]
    fn password_not_in_debug_output() {
        let mut db = DbConfig::default();
        db.password = "segredo".to_string();
        assert!(!format!("{:?}", db).contains("segredo"));
    }
}
