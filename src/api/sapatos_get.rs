#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, param::Path, ApiResponse };

use crate::api::{ShoeRecord, MSG_INVALID_ID, MSG_NOT_FOUND};
use crate::utils::db::SharedRepository;
use crate::utils::errors::{store_error_response, ErrorResponses, HttpResult};
use crate::utils::sapatos_utils::{self, parse_id, RequestDebug};

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct GetShoesApi {
    repo: SharedRepository,
}

impl GetShoesApi {
    pub fn new(repo: SharedRepository) -> Self {
        Self {repo}
    }
}

struct ReqGetShoe
{
    id: i32,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqGetShoe {
    type Req = ReqGetShoe;
    fn get_request_info(&self) -> String {
        format!("  Request parameters:\n    id: {}", self.id)
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum SapatosResponse {
    #[oai(status = 200)]
    Http200(Json<ShoeRecord>),
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

fn make_http_200(resp: ShoeRecord) -> SapatosResponse {
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
impl GetShoesApi {
    /// Retrieve one shoe by id.
    #[oai(path = "/sapatos/:id", method = "get")]
    async fn get_shoe_api(&self, http_req: &Request, id: Path<String>) -> SapatosResponse {
        // The id is validated here rather than by the extractor so that
        // the caller gets our error body.
        let req = match parse_id(&id.0) {
            Some(id) => ReqGetShoe {id},
            None => return make_http_400(MSG_INVALID_ID),
        };
        sapatos_utils::debug_request(http_req, &req);

        match self.repo.get(req.id).await {
            Ok(Some(shoe)) => make_http_200(ShoeRecord::from(shoe)),
            Ok(None) => make_http_404(MSG_NOT_FOUND),
            Err(e) => store_error_response(&format!("retrieving shoe #{}", req.id), &e),
        }
    }
}
