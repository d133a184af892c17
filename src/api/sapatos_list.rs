#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, param::Query, ApiResponse };
use log::info;

use crate::api::{ShoeRecord, MSG_INVALID_PRICE, MSG_NOT_FOUND, MSG_NO_SEARCH_FILTER};
use crate::utils::db::SharedRepository;
use crate::utils::db_types::ShoeFilter;
use crate::utils::errors::{store_error_response, ErrorResponses, HttpResult};
use crate::utils::sapatos_utils::{self, non_blank, parse_price, RequestDebug};

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct ListShoesApi {
    repo: SharedRepository,
}

impl ListShoesApi {
    pub fn new(repo: SharedRepository) -> Self {
        Self {repo}
    }
}

// The raw query parameters, before normalization.
struct ReqListShoes
{
    nome: Option<String>,
    preco: Option<String>,
}

impl ReqListShoes {
    // Whether the caller asked for a search at all, even with empty values.
    fn is_search(&self) -> bool {
        self.nome.is_some() || self.preco.is_some()
    }
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqListShoes {
    type Req = ReqListShoes;
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Request parameters:");
        s.push_str("\n    nome: ");
        s.push_str(self.nome.as_deref().unwrap_or("<none>"));
        s.push_str("\n    preco: ");
        s.push_str(self.preco.as_deref().unwrap_or("<none>"));
        s
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum SapatosResponse {
    #[oai(status = 200)]
    Http200(Json<Vec<ShoeRecord>>),
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

fn make_http_200(resp: Vec<ShoeRecord>) -> SapatosResponse {
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
impl ListShoesApi {
    /// List every shoe, or search when a nome or preco parameter is given.
    #[oai(path = "/sapatos", method = "get")]
    async fn list_shoes_api(&self, http_req: &Request, nome: Query<Option<String>>,
                            preco: Query<Option<String>>) -> SapatosResponse {
        let req = ReqListShoes {nome: nome.0, preco: preco.0};
        sapatos_utils::debug_request(http_req, &req);

        if req.is_search() {
            search(&self.repo, &req).await
        } else {
            list(&self.repo).await
        }
    }

    /// Search shoes by name substring and/or exact price.
    #[oai(path = "/Sapatos", method = "get")]
    async fn search_shoes_api(&self, http_req: &Request, nome: Query<Option<String>>,
                              preco: Query<Option<String>>) -> SapatosResponse {
        let req = ReqListShoes {nome: nome.0, preco: preco.0};
        sapatos_utils::debug_request(http_req, &req);
        search(&self.repo, &req).await
    }
}

// ***************************************************************************
//                          Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// list:
// ---------------------------------------------------------------------------
async fn list(repo: &SharedRepository) -> SapatosResponse {
    match repo.list().await {
        Ok(shoes) => {
            info!("Listing {} shoe(s).", shoes.len());
            make_http_200(shoes.into_iter().map(ShoeRecord::from).collect())
        },
        Err(e) => store_error_response("listing shoes", &e),
    }
}

// ---------------------------------------------------------------------------
// search:
// ---------------------------------------------------------------------------
/** Validate the filters before touching storage.  An empty result is a 404,
 * unlike the unfiltered list.
 */
async fn search(repo: &SharedRepository, req: &ReqListShoes) -> SapatosResponse {
    let preco = match parse_price(req.preco.as_deref()) {
        Ok(p) => p,
        Err(_) => return make_http_400(MSG_INVALID_PRICE),
    };
    let filter = ShoeFilter::new(non_blank(req.nome.as_deref()), preco);
    if filter.is_empty() {
        return make_http_400(MSG_NO_SEARCH_FILTER);
    }

    match repo.search(&filter).await {
        Ok(shoes) if shoes.is_empty() => make_http_404(MSG_NOT_FOUND),
        Ok(shoes) => {
            info!("Search {:?} matched {} shoe(s).", filter, shoes.len());
            make_http_200(shoes.into_iter().map(ShoeRecord::from).collect())
        },
        Err(e) => store_error_response("searching shoes", &e),
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use poem::http::StatusCode;

    use crate::api::test_support::{client, read};
    use crate::api::{MSG_INVALID_PRICE, MSG_NOT_FOUND, MSG_NO_SEARCH_FILTER};
    use crate::utils::db_mem::MemShoeRepository;
    use crate::utils::errors::DriverErrorCode;

    fn stocked() -> std::sync::Arc<MemShoeRepository> {
        MemShoeRepository::with_shoes(&[
            ("Tênis Corrida", 150.0),
            ("Bota Couro", 320.0),
            ("tênis casual", 99.9),
            ("Sandália", 150.0),
        ])
    }

    #[tokio::test]
    async fn list_all() {
        let repo = stocked();
        let (status, body) = read(client(repo.shared()).get("/sapatos").send().await).await;
        assert_eq!(status, StatusCode::OK);
        let shoes = body.as_array().unwrap();
        assert_eq!(shoes.len(), 4);
        assert_eq!(shoes[1]["nome"], "Bota Couro");
    }

    #[tokio::test]
    async fn empty_list_is_ok() {
        let repo = MemShoeRepository::new();
        let (status, body) = read(client(repo.shared()).get("/sapatos").send().await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(|a| a.len()), Some(0));
    }

    #[tokio::test]
    async fn search_by_name_is_case_insensitive_substring() {
        let repo = stocked();
        let (status, body) = read(client(repo.shared()).get("/sapatos?nome=T%C3%8ANIS").send().await).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body.as_array().unwrap().iter()
            .map(|s| s["nome"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Tênis Corrida", "tênis casual"]);
    }

    #[tokio::test]
    async fn search_filters_are_conjunctive() {
        let repo = stocked();
        let cli = client(repo.shared());

        let (status, body) = read(cli.get("/sapatos?preco=150").send().await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, body) = read(cli.get("/Sapatos?nome=san&preco=150").send().await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["nome"], "Sandália");
    }

    #[tokio::test]
    async fn search_without_match_is_not_found() {
        let repo = stocked();
        let (status, body) = read(client(repo.shared()).get("/sapatos?nome=chinelo").send().await).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["mensagem"], MSG_NOT_FOUND);
    }

    #[tokio::test]
    async fn search_without_filter_never_touches_storage() {
        let repo = stocked();
        let cli = client(repo.shared());
        for uri in ["/Sapatos", "/Sapatos?nome=", "/Sapatos?nome=&preco=", "/Sapatos?nome=%20%20"] {
            let (status, body) = read(cli.get(uri).send().await).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["mensagem"], MSG_NO_SEARCH_FILTER);
            assert!(body.get("erro").is_none());
        }
        assert_eq!(repo.accesses(), 0);
    }

    #[tokio::test]
    async fn search_with_bad_price() {
        let repo = stocked();
        let (status, body) = read(client(repo.shared()).get("/sapatos?preco=barato").send().await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["mensagem"], MSG_INVALID_PRICE);
        assert_eq!(repo.accesses(), 0);
    }

    #[tokio::test]
    async fn storage_errors_are_translated() {
        let repo = stocked();
        let cli = client(repo.shared());

        repo.fail_with(DriverErrorCode::ConnectionRefused);
        let (status, body) = read(cli.get("/sapatos").send().await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["erro"], "ECONNREFUSED");

        repo.fail_with(DriverErrorCode::NoSuchTable);
        let (status, body) = read(cli.get("/sapatos?nome=bota").send().await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["erro"], "ER_NO_SUCH_TABLE");

        repo.fail_with(DriverErrorCode::Unclassified("MYSQL_2013".to_string()));
        let (status, body) = read(cli.get("/sapatos").send().await).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["mensagem"], "ERRO: NÃO IDENTIFICADO");
    }
}
