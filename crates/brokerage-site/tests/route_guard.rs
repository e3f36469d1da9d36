//! Guard decisions exercised through the public API and a guarded router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::get;
use axum::Router;
use brokerage_site::auth::{
    decide, guarded, AuthSession, GuardDecision, RouteRequirement, SessionProvider,
    StaticTokenProvider, UserId,
};
use brokerage_site::config::{AuthConfig, TokenGrant};
use tower::ServiceExt;

fn provider() -> Arc<StaticTokenProvider> {
    let provider = StaticTokenProvider::from_config(&AuthConfig {
        admin_tokens: vec![TokenGrant {
            token: "broker-secret".to_string(),
            user: UserId("dana".to_string()),
        }],
        member_tokens: vec![TokenGrant {
            token: "agent-secret".to_string(),
            user: UserId("lee".to_string()),
        }],
    });
    provider.mark_ready();
    Arc::new(provider)
}

#[test]
fn guard_table_matches_session_states() {
    let user = UserId("lee".to_string());
    let cases = [
        (AuthSession::loading(), RouteRequirement::Admin, GuardDecision::Pending),
        (
            AuthSession::anonymous(),
            RouteRequirement::SignedIn,
            GuardDecision::RedirectTo {
                path: "/login".to_string(),
                return_to: Some("/admin".to_string()),
            },
        ),
        (
            AuthSession::member(user.clone()),
            RouteRequirement::Admin,
            GuardDecision::RedirectTo {
                path: "/".to_string(),
                return_to: None,
            },
        ),
        (AuthSession::admin(user), RouteRequirement::Admin, GuardDecision::Render),
    ];

    for (session, requirement, expected) in cases {
        assert_eq!(decide(&session, requirement, "/admin"), expected, "{session:?}");
    }
}

#[tokio::test]
async fn signed_out_admin_is_sent_back_to_login() {
    let provider = provider();
    let app = guarded(
        Router::new().route("/admin", get(|| async { "leads" })),
        provider.clone(),
        RouteRequirement::Admin,
    );

    let request = || {
        Request::get("/admin")
            .header(header::COOKIE, "session=broker-secret")
            .body(Body::empty())
            .expect("request builds")
    };

    let response = app.clone().oneshot(request()).await.expect("responds");
    assert_eq!(response.status(), StatusCode::OK);

    provider.sign_out("broker-secret").expect("known token");

    let response = app.oneshot(request()).await.expect("responds");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some("/login?redirect=%2Fadmin")
    );
}
