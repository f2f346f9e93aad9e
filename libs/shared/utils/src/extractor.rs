use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequest, FromRequestParts, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use headers::{authorization::Bearer, Authorization, HeaderMapExt};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::jwt::validate_token;

pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    if !headers.contains_key("Authorization") {
        return Err(AppError::Auth("Missing authorization header".to_string()));
    }

    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))
}

/// Rejects the request unless it carries a valid bearer token; on success the
/// decoded `TokenClaims` are inserted into the request extensions.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers())?;

    let claims = validate_token(&token, &config.token_secret).map_err(AppError::Auth)?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// `Json` body extractor whose rejections are `{"message"}` validation errors.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ValidJson<T>(pub T);

/// `Path` extractor whose rejections are `{"message"}` validation errors.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ValidPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ValidQuery<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::{
        http::{HeaderValue, StatusCode},
        middleware,
        routing::{get, post},
        Extension, Json, Router,
    };
    use tower::ServiceExt;

    use shared_models::auth::TokenClaims;

    use crate::test_utils::{JwtTestUtils, TestConfig, TestUser};

    fn protected_app(config: Arc<AppConfig>) -> Router {
        Router::new()
            .route(
                "/me",
                get(|Extension(claims): Extension<TokenClaims>| async move { Json(claims) }),
            )
            .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
            .with_state(config)
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_matches!(extract_bearer_token(&headers), Err(AppError::Auth(msg)) if msg == "Missing authorization header");

        headers.insert("Authorization", HeaderValue::from_static("Token abc"));
        assert_matches!(extract_bearer_token(&headers), Err(AppError::Auth(msg)) if msg == "Invalid authorization header format");

        headers.insert("Authorization", HeaderValue::from_static("Bearer abc"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_middleware_exposes_claims() {
        let config = TestConfig::default().to_arc();
        let user = TestUser::patient("patient@example.com");
        let token = JwtTestUtils::create_test_token(&user, &config.token_secret, Some(1));

        let request = Request::builder()
            .uri("/me")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = protected_app(config).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["id"], user.id.to_string());
        assert_eq!(json["email"], user.email);
    }

    #[tokio::test]
    async fn test_middleware_rejects_expired_token() {
        let config = TestConfig::default().to_arc();
        let user = TestUser::patient("patient@example.com");
        let token = JwtTestUtils::create_expired_token(&user, &config.token_secret);

        let request = Request::builder()
            .uri("/me")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = protected_app(config).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_middleware_rejects_missing_token() {
        let config = TestConfig::default().to_arc();
        let request = Request::builder().uri("/me").body(Body::empty()).unwrap();

        let response = protected_app(config).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    fn validating_app() -> Router {
        Router::new()
            .route(
                "/items/{item_id}",
                get(|ValidPath(id): ValidPath<uuid::Uuid>| async move { id.to_string() }),
            )
            .route(
                "/items",
                post(|ValidJson(body): ValidJson<serde_json::Value>| async move { Json(body) }),
            )
    }

    async fn message_of(response: Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        json["message"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_malformed_path_is_json_validation_error() {
        let request = Request::builder().uri("/items/not-a-uuid").body(Body::empty()).unwrap();

        let response = validating_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(message_of(response).await.contains("item_id"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_validation_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/items")
            .header("Content-Type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = validating_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!message_of(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_content_type_is_json_validation_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/items")
            .body(Body::from("{}"))
            .unwrap();

        let response = validating_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(message_of(response).await.contains("Content-Type"));
    }
}
