#![forbid(unsafe_code)]

use log::info;
use poem::Route;
use poem_openapi::error::ContentTypeError;
use poem_openapi::{Object, OpenApiService};

use crate::utils::db::SharedRepository;
use crate::utils::db_types::Shoe;
use crate::utils::errors::HttpResult;

use self::sapatos_create::CreateShoesApi;
use self::sapatos_delete::DeleteShoesApi;
use self::sapatos_get::GetShoesApi;
use self::sapatos_list::ListShoesApi;
use self::sapatos_update::UpdateShoesApi;
use self::version::VersionApi;

pub mod sapatos_create;
pub mod sapatos_delete;
pub mod sapatos_get;
pub mod sapatos_list;
pub mod sapatos_update;
pub mod version;

// ***************************************************************************
//                                Messages
// ***************************************************************************
pub const MSG_INVALID_ID: &str = "ID inválido";
pub const MSG_NOT_FOUND: &str = "ESSE PRODUTO NÃO EXISTE";
pub const MSG_NO_SEARCH_FILTER: &str = "Por favor, forneça o nome ou o preço do sapato para buscar.";
pub const MSG_INVALID_PRICE: &str = "O preço deve ser um número maior ou igual a zero.";
pub const MSG_MISSING_FIELDS: &str = "Por favor, forneça o nome e o preço do sapato.";
pub const MSG_NO_UPDATE_FIELDS: &str = "Por favor, forneça o nome ou o preço do sapato para atualizar.";
pub const MSG_INVALID_BODY: &str = "Corpo da requisição inválido: envie um JSON com nome (texto) e preco (número).";

// ***************************************************************************
//                             Shared Payloads
// ***************************************************************************
/// A shoe record as returned to clients.
#[derive(Object, Debug, Clone, PartialEq)]
pub struct ShoeRecord
{
    id: i32,
    nome: String,
    preco: f64,
}

impl From<Shoe> for ShoeRecord {
    fn from(shoe: Shoe) -> Self {
        Self {id: shoe.id, nome: shoe.nome, preco: shoe.preco}
    }
}

// ---------------------------------------------------------------------------
// unreadable_body:
// ---------------------------------------------------------------------------
/** Build the error body for a request whose JSON payload was rejected before
 * the endpoint ran.  A request with no body at all (no Content-Type) gets
 * the endpoint's missing-fields message.
 */
pub fn unreadable_body(err: &poem::Error, missing: &str) -> HttpResult {
    info!("Rejected request body: {}", err);
    match err.downcast_ref::<ContentTypeError>() {
        Some(ContentTypeError::ExpectContentType) => HttpResult::new(missing),
        _ => HttpResult::new(MSG_INVALID_BODY),
    }
}

// ***************************************************************************
//                                 Routes
// ***************************************************************************
// ---------------------------------------------------------------------------
// build_routes:
// ---------------------------------------------------------------------------
/** Register every endpoint with the repository handle they share, plus the
 * generated OpenAPI documents and Swagger UI.
 */
pub fn build_routes(repo: SharedRepository, server_url: &str) -> Route {
    let endpoints = (
        ListShoesApi::new(repo.clone()),
        GetShoesApi::new(repo.clone()),
        CreateShoesApi::new(repo.clone()),
        UpdateShoesApi::new(repo.clone()),
        DeleteShoesApi::new(repo),
        VersionApi,
    );
    let api_service = OpenApiService::new(endpoints, "Sapatos Server", env!("CARGO_PKG_VERSION"))
        .server(server_url);

    // Allow the generated openapi specs to be retrieved from the server.
    let spec = api_service.spec_endpoint();
    let spec_yaml = api_service.spec_endpoint_yaml();
    let ui = api_service.swagger_ui();

    Route::new()
        .nest("/docs", ui)
        .at("/spec", spec)
        .at("/spec_yaml", spec_yaml)
        .nest("/", api_service)
}
