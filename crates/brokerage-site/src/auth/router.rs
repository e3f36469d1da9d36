use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::guard::{decide, GuardDecision, RouteRequirement};
use super::provider::{session_token, AuthError, SessionProvider};
use super::session::AuthSession;

/// Router builder exposing session lookup, sign-out, and guard decisions for client routing.
pub fn auth_router<P>(provider: Arc<P>) -> Router
where
    P: SessionProvider + 'static,
{
    Router::new()
        .route("/api/v1/auth/session", get(session_handler::<P>))
        .route("/api/v1/auth/sign-out", post(sign_out_handler::<P>))
        .route("/api/v1/guard", get(guard_handler::<P>))
        .with_state(provider)
}

#[derive(Debug, Deserialize)]
pub(crate) struct GuardQuery {
    pub(crate) path: String,
    #[serde(default)]
    pub(crate) admin: bool,
}

pub(crate) async fn session_handler<P>(
    State(provider): State<Arc<P>>,
    headers: HeaderMap,
) -> Json<AuthSession>
where
    P: SessionProvider + 'static,
{
    Json(provider.session(session_token(&headers)))
}

pub(crate) async fn sign_out_handler<P>(
    State(provider): State<Arc<P>>,
    headers: HeaderMap,
) -> Response
where
    P: SessionProvider + 'static,
{
    let Some(token) = session_token(&headers) else {
        return StatusCode::NO_CONTENT.into_response();
    };

    match provider.sign_out(token) {
        Ok(()) | Err(AuthError::UnknownToken) => StatusCode::NO_CONTENT.into_response(),
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::SERVICE_UNAVAILABLE, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn guard_handler<P>(
    State(provider): State<Arc<P>>,
    headers: HeaderMap,
    Query(query): Query<GuardQuery>,
) -> Json<GuardDecision>
where
    P: SessionProvider + 'static,
{
    let session = provider.session(session_token(&headers));
    let requirement = RouteRequirement::from_admin_flag(query.admin);
    Json(decide(&session, requirement, &query.path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::provider::StaticTokenProvider;
    use crate::auth::session::UserId;
    use crate::config::{AuthConfig, TokenGrant};
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    fn provider() -> Arc<StaticTokenProvider> {
        let provider = loading_provider();
        provider.mark_ready();
        provider
    }

    fn loading_provider() -> Arc<StaticTokenProvider> {
        Arc::new(StaticTokenProvider::from_config(&AuthConfig {
            admin_tokens: Vec::new(),
            member_tokens: vec![TokenGrant {
                token: "member-token".to_string(),
                user: UserId("agent".to_string()),
            }],
        }))
    }

    async fn read_json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    fn with_token(uri: &str, method: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, "Bearer member-token")
            .body(Body::empty())
            .expect("request builds")
    }

    #[tokio::test]
    async fn guard_endpoint_reports_redirect_for_members_on_admin_routes() {
        let response = auth_router(provider())
            .oneshot(with_token("/api/v1/guard?path=/admin&admin=true", "GET"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json_body(response).await;
        assert_eq!(body["decision"], "redirect_to");
        assert_eq!(body["path"], "/");
    }

    #[tokio::test]
    async fn guard_endpoint_renders_signed_in_routes() {
        let response = auth_router(provider())
            .oneshot(with_token("/api/v1/guard?path=/account", "GET"))
            .await
            .expect("router responds");

        let body = read_json_body(response).await;
        assert_eq!(body["decision"], "render");
    }

    #[tokio::test]
    async fn sign_out_ends_the_session() {
        let provider = provider();
        let router = auth_router(provider.clone());

        let response = router
            .clone()
            .oneshot(with_token("/api/v1/auth/sign-out", "POST"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = router
            .oneshot(with_token("/api/v1/auth/session", "GET"))
            .await
            .expect("router responds");
        let body = read_json_body(response).await;
        assert_eq!(body["user"], Value::Null);
        assert_eq!(body["loading"], false);
    }

    #[tokio::test]
    async fn sign_out_while_sessions_load_is_unavailable() {
        let response = auth_router(loading_provider())
            .oneshot(with_token("/api/v1/auth/sign-out", "POST"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = read_json_body(response).await;
        assert_eq!(
            body["error"],
            "session store unavailable: sessions still loading"
        );
    }
}
