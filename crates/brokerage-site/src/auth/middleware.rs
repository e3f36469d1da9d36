use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    Router,
};
use tracing::debug;

use super::guard::{decide, GuardDecision, RouteRequirement};
use super::provider::{session_token, SessionProvider};

/// Provider plus the requirement shared by every route behind one guard.
pub struct GuardState<P> {
    pub provider: Arc<P>,
    pub requirement: RouteRequirement,
}

impl<P> Clone for GuardState<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            requirement: self.requirement,
        }
    }
}

/// Puts every route of `router` behind the guard.
pub fn guarded<P>(router: Router, provider: Arc<P>, requirement: RouteRequirement) -> Router
where
    P: SessionProvider + 'static,
{
    let state = GuardState {
        provider,
        requirement,
    };
    router.route_layer(middleware::from_fn_with_state(state, enforce::<P>))
}

pub(crate) async fn enforce<P>(
    State(state): State<GuardState<P>>,
    request: Request,
    next: Next,
) -> Response
where
    P: SessionProvider + 'static,
{
    let requested = request
        .uri()
        .path_and_query()
        .map(|target| target.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let session = state.provider.session(session_token(request.headers()));
    let decision = decide(&session, state.requirement, &requested);

    match decision.location() {
        None if decision == GuardDecision::Render => next.run(request).await,
        None => {
            debug!(path = %requested, "session still loading");
            (StatusCode::SERVICE_UNAVAILABLE, [(header::RETRY_AFTER, "1")]).into_response()
        }
        Some(location) => {
            debug!(path = %requested, %location, "guard redirect");
            Redirect::to(&location).into_response()
        }
    }
}
