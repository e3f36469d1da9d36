use serde::{Deserialize, Serialize};

use super::session::AuthSession;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Access level a route demands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteRequirement {
    #[default]
    SignedIn,
    Admin,
}

impl RouteRequirement {
    pub fn from_admin_flag(require_admin: bool) -> Self {
        if require_admin {
            Self::Admin
        } else {
            Self::SignedIn
        }
    }
}

/// What the caller should do with a navigation to a protected route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Session still resolving; render nothing and show a loading indicator.
    Pending,
    Render,
    RedirectTo {
        path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        return_to: Option<String>,
    },
}

impl GuardDecision {
    /// Redirect target including the `redirect` query parameter when one was captured.
    pub fn location(&self) -> Option<String> {
        match self {
            GuardDecision::RedirectTo {
                path,
                return_to: Some(return_to),
            } => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(return_to.as_bytes()).collect();
                Some(format!("{path}?redirect={encoded}"))
            }
            GuardDecision::RedirectTo {
                path,
                return_to: None,
            } => Some(path.clone()),
            GuardDecision::Pending | GuardDecision::Render => None,
        }
    }
}

/// Decides whether `requested` renders for this session.
pub fn decide(
    session: &AuthSession,
    requirement: RouteRequirement,
    requested: &str,
) -> GuardDecision {
    if session.loading {
        return GuardDecision::Pending;
    }

    if session.user.is_none() {
        return GuardDecision::RedirectTo {
            path: LOGIN_PATH.to_string(),
            return_to: Some(requested.to_string()),
        };
    }

    if requirement == RouteRequirement::Admin && !session.is_admin {
        return GuardDecision::RedirectTo {
            path: HOME_PATH.to_string(),
            return_to: None,
        };
    }

    GuardDecision::Render
}
