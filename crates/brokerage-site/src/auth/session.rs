use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a signed-in visitor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authentication state as reported by the session provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: Option<UserId>,
    pub is_admin: bool,
    /// The provider has not finished resolving the session yet.
    pub loading: bool,
}

impl AuthSession {
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn member(user: UserId) -> Self {
        Self {
            user: Some(user),
            is_admin: false,
            loading: false,
        }
    }

    pub fn admin(user: UserId) -> Self {
        Self {
            user: Some(user),
            is_admin: true,
            loading: false,
        }
    }
}
