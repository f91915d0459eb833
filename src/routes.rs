//! API route handlers.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::auth::{AuthError, AuthGate};
use crate::error::ScrapeError;
use crate::scraper::OddsExtractor;
use crate::types::{ErrorResponse, HealthResponse, LoginResponse, OddsResponse};

/// Application state shared across handlers.
pub struct AppState {
    pub auth: AuthGate,
    pub extractor: OddsExtractor,
}

/// Error type for API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.into(),
        }
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ScrapeError> for ApiError {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::Engine(e) => {
                tracing::error!("Browser engine failure: {:#}", e);
                ApiError::internal("browser engine failure")
            }
            domain => ApiError::bad_request(domain.to_string()),
        }
    }
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Login endpoint. Issues a token for any supplied username; no credential
/// check is performed.
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Option<Json<Value>>,
) -> Result<Json<LoginResponse>, ApiError> {
    let body = body
        .map(|Json(v)| v)
        .ok_or_else(|| ApiError::bad_request("missing request body"))?;

    let username = body.get("username").and_then(Value::as_str).unwrap_or_default();

    let token = state
        .auth
        .issue(username)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    Ok(Json(LoginResponse { token }))
}

/// Odds endpoint. Verifies the bearer token, validates the body, then runs
/// the extraction.
pub async fn odds(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> Result<Json<OddsResponse>, ApiError> {
    // Authentication short-circuits before any body inspection
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::unauthorized(AuthError::NoCredential.to_string()))?;
    state
        .auth
        .verify(token)
        .map_err(|e| ApiError::forbidden(e.to_string()))?;

    let body = body.map(|Json(v)| v);
    let event_url = validate_odds_request(body.as_ref())?;

    let response = state.extractor.extract(event_url).await?;
    Ok(Json(response))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Check the request body shape. Rules run in order and the first
/// violation wins, each with its own message.
fn validate_odds_request(body: Option<&Value>) -> Result<&str, ApiError> {
    let body = body.ok_or_else(|| ApiError::bad_request("missing request body"))?;
    let event_url = body
        .get("eventUrl")
        .ok_or_else(|| ApiError::bad_request("missing eventUrl field"))?;
    event_url
        .as_str()
        .ok_or_else(|| ApiError::bad_request("eventUrl must be a string"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{get, post};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::scraper::PageSession;

    const TEST_SECRET: &str = "test-secret";

    fn test_app() -> Router {
        let config = AppConfig::default();
        let session = Arc::new(PageSession::new(&config.scraper));
        let extractor = OddsExtractor::new(session, &config.scraper);
        let auth = AuthGate::new(TEST_SECRET, 3600);
        let state = Arc::new(AppState { auth, extractor });

        Router::new()
            .route("/health", get(health))
            .route("/login", post(login))
            .route("/odds", post(odds))
            .with_state(state)
    }

    fn token() -> String {
        AuthGate::new(TEST_SECRET, 3600).issue("tester").unwrap()
    }

    fn json_request(uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        match body {
            Some(value) => builder
                .header("content-type", "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let request = Request::builder()
            .method("GET")
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn login_without_body_is_rejected() {
        let (status, body) = send(json_request("/login", None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing request body");
    }

    #[tokio::test]
    async fn login_without_username_is_rejected() {
        let (status, body) = send(json_request("/login", None, Some(json!({})))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing username");
    }

    #[tokio::test]
    async fn login_issues_a_token() {
        let (status, body) =
            send(json_request("/login", None, Some(json!({"username": "alice"})))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn odds_without_credential_is_unauthorized() {
        let (status, body) = send(json_request(
            "/odds",
            None,
            Some(json!({"eventUrl": "https://www.betmgm.co.uk/x"})),
        ))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "missing bearer token");
    }

    #[tokio::test]
    async fn odds_with_garbage_token_is_forbidden() {
        let (status, body) = send(json_request(
            "/odds",
            Some("garbage"),
            Some(json!({"eventUrl": "https://www.betmgm.co.uk/x"})),
        ))
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "invalid or expired token");
    }

    #[tokio::test]
    async fn odds_with_expired_token_is_forbidden() {
        let expired = AuthGate::new(TEST_SECRET, 0).issue("tester").unwrap();
        let (status, _) = send(json_request(
            "/odds",
            Some(&expired),
            Some(json!({"eventUrl": "https://www.betmgm.co.uk/x"})),
        ))
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn auth_runs_before_body_validation() {
        // no credential and no body: the credential complaint wins
        let (status, body) = send(json_request("/odds", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "missing bearer token");
    }

    #[tokio::test]
    async fn odds_without_body_is_rejected() {
        let (status, body) = send(json_request("/odds", Some(&token()), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing request body");
    }

    #[tokio::test]
    async fn odds_without_event_url_is_rejected() {
        let (status, body) = send(json_request("/odds", Some(&token()), Some(json!({})))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing eventUrl field");
    }

    #[tokio::test]
    async fn odds_with_non_string_event_url_is_rejected() {
        let (status, body) = send(json_request(
            "/odds",
            Some(&token()),
            Some(json!({"eventUrl": 42})),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "eventUrl must be a string");
    }

    #[tokio::test]
    async fn odds_with_malformed_url_is_rejected() {
        let (status, body) = send(json_request(
            "/odds",
            Some(&token()),
            Some(json!({"eventUrl": "not a url"})),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("invalid URL"));
    }

    #[tokio::test]
    async fn odds_with_foreign_host_is_rejected() {
        let (status, body) = send(json_request(
            "/odds",
            Some(&token()),
            Some(json!({"eventUrl": "https://example.com/horse-racing/event/123"})),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("www.betmgm.co.uk"));
    }
}
