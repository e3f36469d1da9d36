use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::http::{header, HeaderMap};
use tracing::info;

use super::session::{AuthSession, UserId};
use crate::config::AuthConfig;

pub const SESSION_COOKIE: &str = "session";

/// Source of authentication state for incoming requests.
pub trait SessionProvider: Send + Sync {
    /// Resolves the session for an optional bearer token.
    fn session(&self, token: Option<&str>) -> AuthSession;
    fn sign_out(&self, token: &str) -> Result<(), AuthError>;
}

/// Error enumeration for provider failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("unknown session token")]
    UnknownToken,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Pulls the session token from `Authorization: Bearer` or the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    bearer.or_else(|| {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|cookies| cookies.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, token)| token.trim())
            .filter(|token| !token.is_empty())
    })
}

#[derive(Debug, Clone)]
struct Grant {
    user: UserId,
    is_admin: bool,
}

/// Provider backed by the static token lists in [`AuthConfig`].
///
/// Reports `loading` until [`StaticTokenProvider::mark_ready`] is called so routes hit during
/// start-up get a pending decision instead of a redirect.
pub struct StaticTokenProvider {
    grants: HashMap<String, Grant>,
    revoked: Mutex<HashSet<String>>,
    ready: Arc<AtomicBool>,
}

impl StaticTokenProvider {
    pub fn from_config(config: &AuthConfig) -> Self {
        let members = config.member_tokens.iter().map(|grant| (grant, false));
        let admins = config.admin_tokens.iter().map(|grant| (grant, true));

        let grants = members
            .chain(admins)
            .map(|(grant, is_admin)| {
                (
                    grant.token.clone(),
                    Grant {
                        user: grant.user.clone(),
                        is_admin,
                    },
                )
            })
            .collect();

        Self {
            grants,
            revoked: Mutex::new(HashSet::new()),
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shares an externally owned readiness flag, typically the server's own.
    pub fn with_readiness(mut self, ready: Arc<AtomicBool>) -> Self {
        self.ready = ready;
        self
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn revoked(&self) -> Result<MutexGuard<'_, HashSet<String>>, AuthError> {
        self.revoked
            .lock()
            .map_err(|_| AuthError::Unavailable("revocation list poisoned".to_string()))
    }

    /// A token is revoked when signed out, or when the revocation list cannot be read.
    fn is_revoked(&self, token: &str) -> bool {
        self.revoked()
            .map(|revoked| revoked.contains(token))
            .unwrap_or(true)
    }
}

impl SessionProvider for StaticTokenProvider {
    fn session(&self, token: Option<&str>) -> AuthSession {
        if !self.is_ready() {
            return AuthSession::loading();
        }

        let Some(token) = token else {
            return AuthSession::anonymous();
        };

        match self.grants.get(token) {
            Some(grant) if !self.is_revoked(token) => {
                if grant.is_admin {
                    AuthSession::admin(grant.user.clone())
                } else {
                    AuthSession::member(grant.user.clone())
                }
            }
            _ => AuthSession::anonymous(),
        }
    }

    fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        if !self.is_ready() {
            return Err(AuthError::Unavailable("sessions still loading".to_string()));
        }

        let grant = self.grants.get(token).ok_or(AuthError::UnknownToken)?;
        self.revoked()?.insert(token.to_string());
        info!(user = %grant.user, "session signed out");
        Ok(())
    }
}
