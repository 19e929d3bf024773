use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{request::Parts, HeaderValue, Method};
use reqwest::Url;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, warn};

/// CORS for the API. Local mode mirrors any origin back; otherwise the origin
/// host has to be listed in `allowed_origins`.
pub fn cors_layer(local_mode: bool, allowed_origins: Vec<String>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    if local_mode {
        debug!("Allowing all origins");
        return layer.allow_origin(AllowOrigin::mirror_request());
    }

    debug!("Allowed origins: {:?}", allowed_origins);
    layer.allow_origin(AllowOrigin::predicate(
        move |origin: &HeaderValue, _parts: &Parts| match origin.to_str() {
            Ok(origin) => origin_allowed(origin, &allowed_origins),
            Err(_) => false,
        },
    ))
}

/// The host must be listed. `localhost` is only allowed over http and every
/// other host only over https.
pub fn origin_allowed(origin: &str, allowed_origins: &[String]) -> bool {
    let url = match Url::parse(origin) {
        Ok(url) => url,
        Err(e) => {
            warn!("cors parse origin issue: {}", e);
            return false;
        }
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    if !allowed_origins.iter().any(|allowed| allowed == host) {
        warn!("origin {} is NOT allowed - not in allowed list: {:?}", host, allowed_origins);
        return false;
    }
    let localhost = host.starts_with("localhost");
    let allowed = match url.scheme() {
        "http" => localhost,
        "https" => !localhost,
        _ => false,
    };
    debug!(
        "origin {} with protocol {} is {}allowed",
        host,
        url.scheme(),
        if allowed { "" } else { "NOT " }
    );
    allowed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["localhost".to_string(), "project.lfx.dev".to_string()]
    }

    #[test]
    fn test_origin_allowed() {
        assert!(origin_allowed("http://localhost:8100", &allowed()));
        assert!(origin_allowed("https://project.lfx.dev", &allowed()));
    }

    #[test]
    fn test_origin_scheme_rules() {
        assert!(!origin_allowed("https://localhost:8100", &allowed()));
        assert!(!origin_allowed("http://project.lfx.dev", &allowed()));
    }

    #[test]
    fn test_origin_not_listed_or_unparseable() {
        assert!(!origin_allowed("https://evil.example.com", &allowed()));
        assert!(!origin_allowed("not a url", &allowed()));
    }
}
