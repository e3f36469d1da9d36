//! Session-based route guarding for the signed-in and admin areas of the site.
//!
//! The guard only reads sessions. Resolving a token into a session and signing out belong to a
//! [`SessionProvider`].

pub mod guard;
pub mod middleware;
pub mod provider;
pub mod router;
pub mod session;

pub use guard::{decide, GuardDecision, RouteRequirement, HOME_PATH, LOGIN_PATH};
pub use middleware::{guarded, GuardState};
pub use provider::{session_token, AuthError, SessionProvider, StaticTokenProvider};
pub use router::auth_router;
pub use session::{AuthSession, UserId};
