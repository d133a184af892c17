#![forbid(unsafe_code)]

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};

use log::{debug, warn};
use crate::utils::config::DbConfig;
use crate::utils::errors::StoreError;

// ---------------------------------------------------------------------------
// connect_options:
// ---------------------------------------------------------------------------
/** Build the connection options from the configured host, credentials and
 * database name.  Nothing is contacted here; the options are computed once
 * at startup and reused for every per-request connection.
 */
pub fn connect_options(cfg: &DbConfig) -> MySqlConnectOptions {
    let options = MySqlConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .username(&cfg.user)
        .database(&cfg.database);

    // An empty password means the account has none.
    let options = if cfg.password.is_empty() {
        options
    } else {
        options.password(&cfg.password)
    };

    // Statements are logged at debug level by our own handlers.
    options.disable_statement_logging()
}

// ---------------------------------------------------------------------------
// connect:
// ---------------------------------------------------------------------------
/** Open one new connection.  Failures (refused, unknown database, bad
 * credentials) are returned to the caller immediately without retry.
 */
pub async fn connect(options: &MySqlConnectOptions) -> Result<MySqlConnection, StoreError> {
    let conn = MySqlConnection::connect_with(options).await?;
    debug!("Database connection opened.");
    Ok(conn)
}

// ---------------------------------------------------------------------------
// release:
// ---------------------------------------------------------------------------
/** Close a connection gracefully.  A failed close is only logged since the
 * request's outcome has already been decided.
 */
pub async fn release(conn: MySqlConnection) {
    match conn.close().await {
        Ok(_) => debug!("Database connection closed."),
        Err(e) => warn!("Unable to close database connection cleanly: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_from_config() {
        let cfg = DbConfig::default();
        let options = connect_options(&cfg);
        assert_eq!(options.get_host(), "localhost");
        assert_eq!(options.get_port(), 3306);
        assert_eq!(options.get_username(), "root");
        assert_eq!(options.get_database(), Some("sapatos"));
    }
}
