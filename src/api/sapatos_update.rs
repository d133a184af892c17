#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, param::Path, Object, ApiResponse };
use log::info;

use crate::api::{unreadable_body, MSG_INVALID_ID, MSG_INVALID_PRICE, MSG_NOT_FOUND, MSG_NO_UPDATE_FIELDS};
use crate::utils::db::SharedRepository;
use crate::utils::db_types::ShoeChanges;
use crate::utils::errors::{store_error_response, ErrorResponses, HttpResult};
use crate::utils::sapatos_utils::{self, non_blank, parse_id, valid_price, RequestDebug};

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct UpdateShoesApi {
    repo: SharedRepository,
}

impl UpdateShoesApi {
    pub fn new(repo: SharedRepository) -> Self {
        Self {repo}
    }
}

#[derive(Object)]
pub struct ReqUpdateShoe
{
    nome: Option<String>,
    preco: Option<f64>,
}

#[derive(Object, Debug)]
pub struct RespUpdateShoe
{
    mensagem: String,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqUpdateShoe {
    type Req = ReqUpdateShoe;
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
    #[oai(status = 200)]
    Http200(Json<RespUpdateShoe>),
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

fn make_http_200(resp: RespUpdateShoe) -> SapatosResponse {
    SapatosResponse::Http200(Json(resp))
}
fn make_http_400(msg: &str) -> SapatosResponse {
    SapatosResponse::Http400(Json(HttpResult::new(msg)))
}

// Payload extraction failures answer with our error body too.
fn bad_request_handler(err: poem::Error) -> SapatosResponse {
    SapatosResponse::Http400(Json(unreadable_body(&err, MSG_NO_UPDATE_FIELDS)))
}
fn make_http_404(msg: &str) -> SapatosResponse {
    SapatosResponse::Http404(Json(HttpResult::new(msg)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl UpdateShoesApi {
    /// Change the name and/or price of a shoe.  Omitted fields keep their
    /// current values.
    #[oai(path = "/sapatos/:id", method = "put")]
    async fn update_shoe_api(&self, http_req: &Request, id: Path<String>, req: Json<ReqUpdateShoe>) -> SapatosResponse {
        sapatos_utils::debug_request(http_req, &*req);

        // -------------------- Validate -----------------------------
        let id = match parse_id(&id.0) {
            Some(id) => id,
            None => return make_http_400(MSG_INVALID_ID),
        };
        if let Some(preco) = req.preco {
            if !valid_price(preco) {
                return make_http_400(MSG_INVALID_PRICE);
            }
        }
        let changes = ShoeChanges::new(non_blank(req.nome.as_deref()), req.preco);
        if changes.is_empty() {
            return make_http_400(MSG_NO_UPDATE_FIELDS);
        }

        // -------------------- Process Request ----------------------
        RespUpdateShoe::process(&self.repo, id, &changes).await
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespUpdateShoe {
    /// Create a new response.
    fn new(mensagem: &str) -> Self {
        Self {mensagem: mensagem.to_string()}
    }

    /// Process the request.
    async fn process(repo: &SharedRepository, id: i32, changes: &ShoeChanges) -> SapatosResponse {
        match repo.update(id, changes).await {
            Ok(true) => {
                info!("Shoe #{} updated: {:?}.", id, changes);
                make_http_200(Self::new("Sapato atualizado com sucesso"))
            },
            Ok(false) => make_http_404(MSG_NOT_FOUND),
            Err(e) => store_error_response(&format!("updating shoe #{}", id), &e),
        }
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use poem::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::{client, read};
    use crate::api::{MSG_INVALID_BODY, MSG_INVALID_ID, MSG_NOT_FOUND, MSG_NO_UPDATE_FIELDS};
    use crate::utils::db_mem::MemShoeRepository;
    use crate::utils::errors::DriverErrorCode;

    #[tokio::test]
    async fn price_only_keeps_name() {
        let repo = MemShoeRepository::with_shoes(&[("Bota", 200.0)]);
        let (status, _) = read(client(repo.shared()).put("/sapatos/1")
            .body_json(&json!({"preco": 180}))
            .send().await).await;
        assert_eq!(status, StatusCode::OK);
        let shoe = repo.find(1).unwrap();
        assert_eq!(shoe.nome, "Bota");
        assert_eq!(shoe.preco, 180.0);
    }

    #[tokio::test]
    async fn name_only_keeps_price() {
        let repo = MemShoeRepository::with_shoes(&[("Bota", 200.0)]);
        let (status, _) = read(client(repo.shared()).put("/sapatos/1")
            .body_json(&json!({"nome": "Bota Cano Alto"}))
            .send().await).await;
        assert_eq!(status, StatusCode::OK);
        let shoe = repo.find(1).unwrap();
        assert_eq!(shoe.nome, "Bota Cano Alto");
        assert_eq!(shoe.preco, 200.0);
    }

    #[tokio::test]
    async fn no_fields() {
        let repo = MemShoeRepository::with_shoes(&[("Bota", 200.0)]);
        let (status, body) = read(client(repo.shared()).put("/sapatos/1")
            .body_json(&json!({"nome": ""}))
            .send().await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["mensagem"], MSG_NO_UPDATE_FIELDS);
        assert_eq!(repo.accesses(), 0);
    }

    #[tokio::test]
    async fn invalid_id() {
        let repo = MemShoeRepository::with_shoes(&[("Bota", 200.0)]);
        let (status, body) = read(client(repo.shared()).put("/sapatos/um")
            .body_json(&json!({"preco": 1}))
            .send().await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["mensagem"], MSG_INVALID_ID);
        assert_eq!(repo.accesses(), 0);
    }

    #[tokio::test]
    async fn missing_record() {
        let repo = MemShoeRepository::with_shoes(&[("Bota", 200.0)]);
        let (status, body) = read(client(repo.shared()).put("/sapatos/5")
            .body_json(&json!({"preco": 1}))
            .send().await).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["mensagem"], MSG_NOT_FOUND);
    }

    #[tokio::test]
    async fn statement_error() {
        let repo = MemShoeRepository::with_shoes(&[("Bota", 200.0)]);
        repo.fail_with(DriverErrorCode::ParseError);
        let (status, body) = read(client(repo.shared()).put("/sapatos/1")
            .body_json(&json!({"preco": 1}))
            .send().await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["erro"], "ER_PARSE_ERROR");
    }

    #[tokio::test]
    async fn unreadable_body_keeps_record() {
        let repo = MemShoeRepository::with_shoes(&[("Bota", 200.0)]);
        let cli = client(repo.shared());

        let (status, body) = read(cli.put("/sapatos/1")
            .body_json(&json!({"preco": "barato"}))
            .send().await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["mensagem"], MSG_INVALID_BODY);

        let (status, body) = read(cli.put("/sapatos/1").send().await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["mensagem"], MSG_NO_UPDATE_FIELDS);

        assert_eq!(repo.accesses(), 0);
        assert_eq!(repo.find(1).unwrap().preco, 200.0);
    }
}
