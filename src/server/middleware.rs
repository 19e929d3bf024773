use super::state::AppState;
use crate::observability::metrics::http;
use axum::extract::{MatchedPath, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;
use tracing::{debug, warn};

/// Create a user record for an authenticated caller that has none yet.
/// Never rejects the request; failures are only logged.
pub async fn create_user_from_request(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(req.headers()) {
        match state.authorizer.authorize(&token).await {
            Ok(auth) => {
                if let Err(e) = state.users.ensure_user(&auth).await {
                    warn!("unable to create user {} from request, error: {}", auth.lf_username, e);
                }
            }
            Err(e) => warn!("unable to authorize bearer token, error: {}", e),
        }
    }
    next.run(req).await
}

/// Log each request at DEBUG and record the request counter and latency histogram
pub async fn track_requests(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;

    let elapsed = started.elapsed();
    let status = response.status().as_u16();
    debug!("{} {} -> {} in {:?}", method, route, status, elapsed);
    http::record_request(&method, &route, status, elapsed);
    response
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}
