//! AWS Lambda handler exposing the growth projection service over HTTP
//!
//! Routes:
//! - `GET  /items?query=`            catalog search
//! - `POST /projections`             growth projection for one purchase
//! - `POST /scenarios`               save a scenario (Bearer token)
//! - `GET  /scenarios`               list saved scenarios (Bearer token)
//! - `GET  /scenarios/projections`   saved scenarios with projections (Bearer token)
//! - `GET  /auth/callback?code=`     exchange an authorization code for a session
//!
//! Supports Lambda Function URLs for direct HTTP access.

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use save_now_earn_later::auth::InMemoryAuthenticator;
use save_now_earn_later::catalog::load_catalog;
use save_now_earn_later::scenario::InMemoryScenarioStore;
use save_now_earn_later::service::{GrowthProjectionRequest, SaveScenarioRequest};
use save_now_earn_later::{AppConfig, AppService, ServiceError};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

fn cors(builder: lambda_http::http::response::Builder) -> lambda_http::http::response::Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
}

fn error_response(status: u16, message: &str) -> Result<Response<Body>, Error> {
    let body = serde_json::json!({ "error": message }).to_string();
    Ok(cors(Response::builder())
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::Text(body))?)
}

fn json_response<T: Serialize>(body: &T) -> Result<Response<Body>, Error> {
    Ok(cors(Response::builder())
        .status(200)
        .header("Content-Type", "application/json")
        .body(Body::Text(serde_json::to_string(body)?))?)
}

fn service_error_response(err: ServiceError) -> Result<Response<Body>, Error> {
    let status = err.status_code();
    if status >= 500 {
        log::error!("request failed: {}", err);
    } else {
        log::warn!("request rejected: {}", err);
    }
    error_response(status, &err.to_string())
}

fn body_text(event: &Request) -> String {
    match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    }
}

fn bearer_token(event: &Request) -> Option<String> {
    event
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, t)| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Route one request to the service
fn handle(service: &AppService, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str().to_string();
    let path = event.uri().path().trim_end_matches('/').to_string();
    let params = event.query_string_parameters();
    let token = bearer_token(&event);

    // Handle CORS preflight
    if method == "OPTIONS" {
        return Ok(cors(Response::builder()).status(200).body(Body::Empty)?);
    }

    match (method.as_str(), path.as_str()) {
        ("GET", "/items") => {
            let query = params.first("query").unwrap_or_default();
            match service.search_items(query) {
                Ok(items) => json_response(&items),
                Err(e) => service_error_response(e),
            }
        }
        ("POST", "/projections") => {
            let request: GrowthProjectionRequest = match serde_json::from_str(&body_text(&event)) {
                Ok(r) => r,
                Err(e) => return error_response(400, &format!("Invalid JSON: {}", e)),
            };
            match service.growth_projections(&request) {
                Ok(response) => json_response(&response),
                Err(e) => service_error_response(e),
            }
        }
        ("POST", "/scenarios") => {
            let request: SaveScenarioRequest = match serde_json::from_str(&body_text(&event)) {
                Ok(r) => r,
                Err(e) => return error_response(400, &format!("Invalid JSON: {}", e)),
            };
            match service.save_scenario(token.as_deref(), request) {
                Ok(scenario) => json_response(&scenario),
                Err(e) => service_error_response(e),
            }
        }
        ("GET", "/scenarios") => match service.user_scenarios(token.as_deref()) {
            Ok(scenarios) => json_response(&scenarios),
            Err(e) => service_error_response(e),
        },
        ("GET", "/scenarios/projections") => {
            let annual_return = match params.first("annualReturn").map(str::parse::<f64>) {
                None => None,
                Some(Ok(rate)) => Some(rate),
                Some(Err(_)) => return error_response(400, "annualReturn must be a number"),
            };
            match service.project_user_scenarios(token.as_deref(), annual_return) {
                Ok(projected) => json_response(&projected),
                Err(e) => service_error_response(e),
            }
        }
        ("GET", "/auth/callback") => {
            let code = params.first("code").unwrap_or_default();
            match service.exchange_code(code) {
                Ok(session) => json_response(&session),
                Err(e) => service_error_response(e),
            }
        }
        _ => error_response(404, &format!("No route for {} {}", method, path)),
    }
}

fn build_service() -> anyhow::Result<AppService> {
    let config_path = std::env::var("SNEL_CONFIG").ok().map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;
    let catalog = load_catalog(&config.catalog_path)?;
    let auth = InMemoryAuthenticator::from_code_list(
        &std::env::var("SNEL_AUTH_CODES").unwrap_or_default(),
    )?;

    Ok(AppService::new(
        &config,
        catalog,
        Arc::new(InMemoryScenarioStore::new()),
        Arc::new(auth),
    ))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let service = Arc::new(build_service().map_err(|e| Error::from(e.to_string()))?);

    run(service_fn(move |event: Request| {
        let service = Arc::clone(&service);
        async move { handle(&service, event) }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use save_now_earn_later::auth::User;
    use save_now_earn_later::catalog::load_catalog_from_reader;
    use std::collections::HashMap;

    fn test_service() -> AppService {
        let auth = InMemoryAuthenticator::new();
        auth.register_code(
            "code-alice",
            User {
                id: "user-alice".to_string(),
                email: "alice@example.com".to_string(),
            },
        );
        let catalog = load_catalog_from_reader(
            "id,name,category,unit_price\n1,Coffee,Food & Drink,5.00\n".as_bytes(),
        )
        .unwrap();

        AppService::new(
            &AppConfig::default(),
            catalog,
            Arc::new(InMemoryScenarioStore::new()),
            Arc::new(auth),
        )
    }

    fn request(method: &str, path: &str, body: Body) -> Request {
        lambda_http::http::Request::builder()
            .method(method)
            .uri(path)
            .body(body)
            .unwrap()
    }

    fn with_query(req: Request, key: &str, value: &str) -> Request {
        let mut params = HashMap::new();
        params.insert(key.to_string(), value.to_string());
        req.with_query_string_parameters(params)
    }

    fn json_body(response: &Response<Body>) -> serde_json::Value {
        match response.body() {
            Body::Text(s) => serde_json::from_str(s).unwrap(),
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_search_route() {
        let service = test_service();
        let req = with_query(request("GET", "/items", Body::Empty), "query", "coffee");

        let response = handle(&service, req).unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(json_body(&response)[0]["name"], "Coffee");
    }

    #[test]
    fn test_projection_route() {
        let service = test_service();
        let req = request(
            "POST",
            "/projections",
            Body::Text(r#"{"price": 5, "frequencyDays": 1}"#.to_string()),
        );

        let response = handle(&service, req).unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let body = json_body(&response);
        assert_eq!(body["annualAmount"], 1825.0);
        assert_eq!(body["series"][29]["totalContributed"], 54750.0);
    }

    #[test]
    fn test_projection_route_validation() {
        let service = test_service();
        let body = Body::Text(r#"{"price": -5, "frequencyDays": 1}"#.to_string());
        let req = request("POST", "/projections", body);
        assert_eq!(handle(&service, req).unwrap().status().as_u16(), 400);

        let req = request("POST", "/projections", Body::Text("not json".to_string()));
        assert_eq!(handle(&service, req).unwrap().status().as_u16(), 400);
    }

    #[test]
    fn test_scenario_routes_require_token() {
        let service = test_service();
        let response = handle(&service, request("GET", "/scenarios", Body::Empty)).unwrap();
        assert_eq!(response.status().as_u16(), 401);
    }

    #[test]
    fn test_sign_in_and_save_scenario() {
        let service = test_service();

        let callback = request("GET", "/auth/callback", Body::Empty);
        let callback = with_query(callback, "code", "code-alice");
        let session = json_body(&handle(&service, callback).unwrap());
        let token = session["token"].as_str().unwrap().to_string();

        let save = lambda_http::http::Request::builder()
            .method("POST")
            .uri("/scenarios")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::Text(
                r#"{"title": "Coffee habit",
                    "items": [{"itemId": 1, "price": 5, "frequencyDays": 1}]}"#
                    .to_string(),
            ))
            .unwrap();
        let response = handle(&service, save).unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(json_body(&response)["title"], "Coffee habit");

        let list = lambda_http::http::Request::builder()
            .method("GET")
            .uri("/scenarios")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::Empty)
            .unwrap();
        let listed = json_body(&handle(&service, list).unwrap());
        assert_eq!(listed.as_array().map(Vec::len), Some(1));
        assert_eq!(listed[0]["items"][0]["item"]["name"], "Coffee");
    }

    fn authorized(header: &str) -> Request {
        lambda_http::http::Request::builder()
            .method("GET")
            .uri("/scenarios")
            .header("Authorization", header)
            .body(Body::Empty)
            .unwrap()
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        let service = test_service();
        let token = service.exchange_code("code-alice").unwrap().token;

        for header in [
            format!("Bearer {}", token),
            format!("bearer {}", token),
            format!("BEARER  {}", token),
        ] {
            assert_eq!(bearer_token(&authorized(&header)), Some(token.clone()));
            let response = handle(&service, authorized(&header)).unwrap();
            assert_eq!(response.status().as_u16(), 200, "header {:?}", header);
        }

        assert_eq!(bearer_token(&authorized(&format!("Basic {}", token))), None);
        assert_eq!(bearer_token(&authorized("Bearer")), None);
    }

    #[test]
    fn test_scenario_projections_route_is_rounded() {
        let service = test_service();
        let token = service.exchange_code("code-alice").unwrap().token;
        service
            .save_scenario(
                Some(&token),
                SaveScenarioRequest {
                    title: "Coffee habit".to_string(),
                    items: vec![save_now_earn_later::scenario::ScenarioItem {
                        item_id: Some(1),
                        custom_name: None,
                        price: 5.0,
                        frequency_days: 1.0,
                    }],
                },
            )
            .unwrap();

        let req = lambda_http::http::Request::builder()
            .method("GET")
            .uri("/scenarios/projections")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::Empty)
            .unwrap();
        let body = json_body(&handle(&service, req).unwrap());
        let year_30 = &body[0]["projection"]["combined"]["series"][29];
        assert_eq!(year_30["projectedValue"], 300_202.0);
        assert_eq!(year_30["totalReturns"], 245_452.0);
    }

    #[test]
    fn test_unknown_route() {
        let service = test_service();
        let response = handle(&service, request("DELETE", "/items", Body::Empty)).unwrap();
        assert_eq!(response.status().as_u16(), 404);
    }
}
