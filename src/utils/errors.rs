#![forbid(unsafe_code)]

use std::fmt;

use log::error;
use poem_openapi::{payload::Json, Object};
use sqlx::mysql::MySqlDatabaseError;
use thiserror::Error;

/// Error enumerates the errors returned by this application.
#[derive(Error, Debug)]
pub enum Errors {
    /// Input parameter logging.
    #[error("sapatos_server input parameters:\n{}", .0)]
    InputParms(String),

    /// Inaccessible logger configuration file.
    #[error("Unable to access the Log4rs configuration file: {}", .0)]
    Log4rsInitialization(String),

    #[error("Reading application configuration file: {}", .0)]
    ReadingConfigFile(String),

    #[error("Unable to parse TOML file: {}", .0)]
    TOMLParseError(String),

    #[error("Unable to start the HTTP server on {}: {}", .0, .1)]
    ServerStart(String, String),
}

// ***************************************************************************
//                            Driver Error Codes
// ***************************************************************************
// MySQL server error numbers we classify.
const ER_ACCESS_DENIED_ERROR: u16 = 1045;
const ER_BAD_DB_ERROR: u16 = 1049;
const ER_PARSE_ERROR: u16 = 1064;
const ER_NO_SUCH_TABLE: u16 = 1146;

const UNCLASSIFIED: &str = "UNCLASSIFIED";

/// The symbolic class of a storage failure as reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverErrorCode {
    ConnectionRefused,
    BadDb,
    AccessDenied,
    NoSuchTable,
    ParseError,
    Unclassified(String),
}

impl DriverErrorCode {
    /// Classify a MySQL server error number.
    pub fn from_mysql_number(number: u16) -> Self {
        match number {
            ER_BAD_DB_ERROR => DriverErrorCode::BadDb,
            ER_ACCESS_DENIED_ERROR => DriverErrorCode::AccessDenied,
            ER_NO_SUCH_TABLE => DriverErrorCode::NoSuchTable,
            ER_PARSE_ERROR => DriverErrorCode::ParseError,
            n => DriverErrorCode::Unclassified(format!("MYSQL_{}", n)),
        }
    }

    /// Classify any error raised by sqlx.
    pub fn from_sqlx(err: &sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
                DriverErrorCode::ConnectionRefused
            }
            sqlx::Error::Database(db_err) => match db_err.try_downcast_ref::<MySqlDatabaseError>() {
                Some(mysql_err) => Self::from_mysql_number(mysql_err.number()),
                None => DriverErrorCode::Unclassified(UNCLASSIFIED.to_string()),
            },
            _ => DriverErrorCode::Unclassified(UNCLASSIFIED.to_string()),
        }
    }

    /// The machine-readable code placed in the `erro` field of error bodies.
    pub fn as_str(&self) -> &str {
        match self {
            DriverErrorCode::ConnectionRefused => "ECONNREFUSED",
            DriverErrorCode::BadDb => "ER_BAD_DB_ERROR",
            DriverErrorCode::AccessDenied => "ER_ACCESS_DENIED_ERROR",
            DriverErrorCode::NoSuchTable => "ER_NO_SUCH_TABLE",
            DriverErrorCode::ParseError => "ER_PARSE_ERROR",
            DriverErrorCode::Unclassified(code) => code.as_str(),
        }
    }
}

impl fmt::Display for DriverErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ***************************************************************************
//                              Storage Errors
// ***************************************************************************
/// A failed storage operation: the driver's classification plus the
/// driver's own description for the log.
#[derive(Error, Debug)]
#[error("{code}: {detail}")]
pub struct StoreError {
    pub code: DriverErrorCode,
    pub detail: String,
}

impl StoreError {
    pub fn new(code: DriverErrorCode, detail: impl Into<String>) -> Self {
        Self { code, detail: detail.into() }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::new(DriverErrorCode::from_sqlx(&err), err.to_string())
    }
}

// ***************************************************************************
//                             Error Translator
// ***************************************************************************
/// The HTTP rendition of a driver error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub status: u16,
    pub message: &'static str,
}

/// Map a driver error code to an HTTP status and user-facing message.
/// Unknown codes fall through to a generic 500.
pub fn translate(code: &DriverErrorCode) -> Translation {
    let (status, message) = match code {
        DriverErrorCode::ConnectionRefused => (400, "ERRO: LIGUE O LARAGAO => Conexão Recusada"),
        DriverErrorCode::BadDb => (400, "ERRO: CRIE UM BANCO DE DADOS COM O NOME DEFINIDO NA CONEXÃO"),
        DriverErrorCode::AccessDenied => (400, "ERRO: CONFERIR O USUÁRIO E SENHA DEFINIDOS NA CONEXÃO"),
        DriverErrorCode::NoSuchTable => (400, "ERRO: Você deve criar a tabela com o mesmo nome da sua QUERY"),
        DriverErrorCode::ParseError => (400, "ERRO: Você tem um erro de escrita em sua QUERY confira: VÍRGULAS, PARENTESES E NOME DE COLUNAS"),
        DriverErrorCode::Unclassified(_) => (500, "ERRO: NÃO IDENTIFICADO"),
    };
    Translation { status, message }
}

// ***************************************************************************
//                              HTTP Results
// ***************************************************************************
/// Body of every error response.
#[derive(Object, Debug, Clone, PartialEq)]
pub struct HttpResult {
    pub mensagem: String,
    #[oai(skip_serializing_if_is_none)]
    pub erro: Option<String>,
}

impl HttpResult {
    pub fn new(mensagem: impl Into<String>) -> Self {
        Self { mensagem: mensagem.into(), erro: None }
    }

    pub fn with_code(mensagem: impl Into<String>, erro: impl Into<String>) -> Self {
        Self { mensagem: mensagem.into(), erro: Some(erro.into()) }
    }
}

/// The error statuses shared by every endpoint's response enum.
pub trait ErrorResponses: Sized {
    fn http_400(body: Json<HttpResult>) -> Self;
    fn http_500(body: Json<HttpResult>) -> Self;
}

// ---------------------------------------------------------------------------
// store_error_response:
// ---------------------------------------------------------------------------
/** Log a storage failure and convert it into the endpoint's response using
 * the shared translation table.  The task names the failed operation in the
 * log record.
 */
pub fn store_error_response<R: ErrorResponses>(task: &str, err: &StoreError) -> R {
    error!("ERROR: {} failed with {}", task, err);
    let t = translate(&err.code);
    let body = Json(HttpResult::with_code(t.message, err.code.as_str()));
    match t.status {
        400 => R::http_400(body),
        _ => R::http_500(body),
    }
}
