mod common;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use cla_backend::app::ports::AuthUser;
use cla_backend::config::Config;
use cla_backend::constants::USERS_TABLE;
use cla_backend::server::{create_server, AppState};
use cla_backend::storage::DocumentStore;
use common::{test_config, CountingStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app(store: &Arc<CountingStore>, config: &Config) -> (Router, AppState) {
    let dyn_store: Arc<dyn DocumentStore> = store.clone();
    let state = AppState::new(dyn_store, config);
    (create_server(state.clone(), config), state)
}

async fn send(app: &Router, req: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(req).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let store = CountingStore::new(10);
    let (app, _) = app(&store, &test_config());

    let (status, body) = send(&app, get("/v3/ops/health")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    Ok(())
}

#[tokio::test]
async fn test_create_and_search_companies() -> Result<()> {
    let store = CountingStore::new(10);
    let (app, _) = app(&store, &test_config());

    for name in ["Acme Corp", "Globex"] {
        let (status, body) =
            send(&app, with_json("POST", "/v3/company", json!({"companyName": name}))).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["companyName"], name);
    }

    let (status, _) =
        send(&app, with_json("POST", "/v3/company", json!({"companyName": "Globex"}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, get("/v3/company/search?companyName=Acme")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resultCount"], 1);
    assert_eq!(body["searchTerms"], "Acme");
    assert_eq!(body["companies"][0]["companyName"], "Acme Corp");

    let (status, body) = send(&app, get("/v3/company/search")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resultCount"], 0);
    Ok(())
}

#[tokio::test]
async fn test_missing_company_is_json_404() -> Result<()> {
    let store = CountingStore::new(10);
    let (app, _) = app(&store, &test_config());

    let (status, body) = send(&app, get("/v3/company/c-404")).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
    assert_eq!(body["message"], "company does not exist: c-404");
    Ok(())
}

#[tokio::test]
async fn test_invite_flow_over_http() -> Result<()> {
    let store = CountingStore::new(10);
    store
        .seed(USERS_TABLE, json!({"user_id": "u-1", "lf_username": "jdoe"}))
        .await;
    let (app, _) = app(&store, &test_config());

    let (_, company) =
        send(&app, with_json("POST", "/v3/company", json!({"companyName": "Acme"}))).await?;
    let company_id = company["companyID"].as_str().unwrap_or_default().to_string();

    let uri = format!("/v3/company/{company_id}/invite-request");
    let (status, invite) = send(&app, with_json("POST", &uri, json!({"userID": "u-1"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invite["status"], "pending");
    let invite_id = invite["company_invite_id"].as_str().unwrap_or_default().to_string();

    let approve = format!("/v3/company/{company_id}/invite-request/{invite_id}/approve");
    let (status, approved) = send(&app, with_json("PUT", &approve, json!({}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");

    let (status, body) = send(&app, with_json("PUT", &approve, json!({}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);

    let (_, company) = send(&app, get(&format!("/v3/company/{company_id}"))).await?;
    assert_eq!(company["companyACL"], json!(["jdoe"]));

    let (status, managed) = send(&app, get("/v3/company/user/u-1")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(managed["resultCount"], 1);
    Ok(())
}

#[tokio::test]
async fn test_cors_outside_local_mode() -> Result<()> {
    let store = CountingStore::new(10);
    let config = Config {
        local_mode: false,
        allowed_origins: vec!["project.lfx.dev".to_string()],
        ..test_config()
    };
    let (app, _) = app(&store, &config);

    let request = |origin: &str| {
        Request::builder()
            .uri("/v3/ops/health")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(request("https://project.lfx.dev")).await?;
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some(&header::HeaderValue::from_static("https://project.lfx.dev"))
    );

    let response = app.clone().oneshot(request("https://evil.example.com")).await?;
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
    Ok(())
}

#[tokio::test]
async fn test_bearer_token_creates_user() -> Result<()> {
    let store = CountingStore::new(10);
    let mut config = test_config();
    config.auth.tokens.insert(
        "t0k3n".to_string(),
        AuthUser {
            lf_username: "newbie".to_string(),
            lf_email: "newbie@example.org".to_string(),
            name: "New Bie".to_string(),
        },
    );
    let (app, state) = app(&store, &config);

    let req = Request::builder()
        .uri("/v3/ops/health")
        .header(header::AUTHORIZATION, "Bearer t0k3n")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await?;
    assert_eq!(status, StatusCode::OK);

    let user = state.users.get_user_by_lf_username("newbie").await?;
    assert_eq!(user.lf_email, "newbie@example.org");

    // A second request finds the user instead of creating another
    let req = Request::builder()
        .uri("/v3/ops/health")
        .header(header::AUTHORIZATION, "Bearer t0k3n")
        .body(Body::empty())
        .unwrap();
    send(&app, req).await?;
    let (_, body) = send(&app, get("/v3/metrics")).await?;
    assert_eq!(body["users"]["totalCount"], 1);
    Ok(())
}
