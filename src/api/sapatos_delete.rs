#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, param::Path, Object, ApiResponse };
use log::info;

use crate::api::{MSG_INVALID_ID, MSG_NOT_FOUND};
use crate::utils::db::SharedRepository;
use crate::utils::errors::{store_error_response, ErrorResponses, HttpResult};
use crate::utils::sapatos_utils::{self, parse_id, RequestDebug};

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct DeleteShoesApi {
    repo: SharedRepository,
}

impl DeleteShoesApi {
    pub fn new(repo: SharedRepository) -> Self {
        Self {repo}
    }
}

struct ReqDeleteShoe
{
    id: i32,
}

#[derive(Object, Debug)]
pub struct RespDeleteShoe
{
    mensagem: String,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqDeleteShoe {
    type Req = ReqDeleteShoe;
    fn get_request_info(&self) -> String {
        format!("  Request parameters:\n    id: {}", self.id)
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum SapatosResponse {
    #[oai(status = 200)]
    Http200(Json<RespDeleteShoe>),
    #[oai(status = 400)]
    Http400(Json<HttpResult>),
    #[oai(status = 404)]
    Http404(Json<HttpResult>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

impl ErrorResponses for SapatosResponse {
    fn http_400(body: Json<HttpResult>) -> Self { SapatosResponse::Http400(body) }
    fn http_500(body: Json<HttpResult>) -> Self { SapatosResponse::Http500(body) }
}

fn make_http_200(resp: RespDeleteShoe) -> SapatosResponse {
    SapatosResponse::Http200(Json(resp))
}
fn make_http_400(msg: &str) -> SapatosResponse {
    SapatosResponse::Http400(Json(HttpResult::new(msg)))
}
fn make_http_404(msg: &str) -> SapatosResponse {
    SapatosResponse::Http404(Json(HttpResult::new(msg)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl DeleteShoesApi {
    /// Remove a shoe from the inventory.
    #[oai(path = "/sapatos/:id", method = "delete")]
    async fn delete_shoe_api(&self, http_req: &Request, id: Path<String>) -> SapatosResponse {
        let req = match parse_id(&id.0) {
            Some(id) => ReqDeleteShoe {id},
            None => return make_http_400(MSG_INVALID_ID),
        };
        sapatos_utils::debug_request(http_req, &req);

        match self.repo.delete(req.id).await {
            Ok(true) => {
                info!("Shoe #{} deleted.", req.id);
                make_http_200(RespDeleteShoe {mensagem: "Sapato removido com sucesso".to_string()})
            },
            Ok(false) => make_http_404(MSG_NOT_FOUND),
            Err(e) => store_error_response(&format!("deleting shoe #{}", req.id), &e),
        }
    }
}
