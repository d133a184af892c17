#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, Object, ApiResponse };
use log::info;

use crate::api::{unreadable_body, MSG_INVALID_PRICE, MSG_MISSING_FIELDS};
use crate::utils::db::SharedRepository;
use crate::utils::db_types::NewShoe;
use crate::utils::errors::{store_error_response, ErrorResponses, HttpResult};
use crate::utils::sapatos_utils::{self, non_blank, valid_price, RequestDebug};

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct CreateShoesApi {
    repo: SharedRepository,
}

impl CreateShoesApi {
    pub fn new(repo: SharedRepository) -> Self {
        Self {repo}
    }
}

// Both fields are required, but they're checked by the endpoint so that a
// missing one gets our error body.
#[derive(Object)]
pub struct ReqCreateShoe
{
    nome: Option<String>,
    preco: Option<f64>,
}

#[derive(Object, Debug)]
pub struct RespCreateShoe
{
    mensagem: String,
    id: i32,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqCreateShoe {
    type Req = ReqCreateShoe;
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Request body:");
        s.push_str("\n    nome: ");
        s.push_str(self.nome.as_deref().unwrap_or("<none>"));
        s.push_str("\n    preco: ");
        s.push_str(&self.preco.map(|p| p.to_string()).unwrap_or("<none>".to_string()));
        s
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
#[oai(bad_request_handler = "bad_request_handler")]
enum SapatosResponse {
    #[oai(status = 201)]
    Http201(Json<RespCreateShoe>),
    #[oai(status = 400)]
    Http400(Json<HttpResult>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

impl ErrorResponses for SapatosResponse {
    fn http_400(body: Json<HttpResult>) -> Self { SapatosResponse::Http400(body) }
    fn http_500(body: Json<HttpResult>) -> Self { SapatosResponse::Http500(body) }
}

fn make_http_201(resp: RespCreateShoe) -> SapatosResponse {
    SapatosResponse::Http201(Json(resp))
}
fn make_http_400(msg: &str) -> SapatosResponse {
    SapatosResponse::Http400(Json(HttpResult::new(msg)))
}

// Payload extraction failures answer with our error body too.
fn bad_request_handler(err: poem::Error) -> SapatosResponse {
    SapatosResponse::Http400(Json(unreadable_body(&err, MSG_MISSING_FIELDS)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl CreateShoesApi {
    /// Add a shoe to the inventory.
    #[oai(path = "/sapatos", method = "post")]
    async fn create_shoe_api(&self, http_req: &Request, req: Json<ReqCreateShoe>) -> SapatosResponse {
        sapatos_utils::debug_request(http_req, &*req);

        // -------------------- Validate -----------------------------
        let nome = non_blank(req.nome.as_deref());
        let (nome, preco) = match (nome, req.preco) {
            (Some(nome), Some(preco)) => (nome, preco),
            _ => return make_http_400(MSG_MISSING_FIELDS),
        };
        if !valid_price(preco) {
            return make_http_400(MSG_INVALID_PRICE);
        }

        // -------------------- Process Request ----------------------
        RespCreateShoe::process(&self.repo, NewShoe::new(nome, preco)).await
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespCreateShoe {
    /// Create a new response.
    fn new(mensagem: &str, id: i32) -> Self {
        Self {mensagem: mensagem.to_string(), id}
    }

    /// Process the request.
    async fn process(repo: &SharedRepository, shoe: NewShoe) -> SapatosResponse {
        match repo.create(&shoe).await {
            Ok(id) => {
                info!("New shoe #{} created: {} at {}.", id, shoe.nome, shoe.preco);
                make_http_201(Self::new("Sapato cadastrado com sucesso", id))
            },
            Err(e) => store_error_response("creating shoe", &e),
        }
    }
}
