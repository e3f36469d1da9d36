use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::auth::UserId;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub contact: ContactConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let submit_latency = millis_var("CONTACT_SUBMIT_LATENCY_MS", 1500)?;
        let reset_delay = millis_var("CONTACT_RESET_DELAY_MS", 5000)?;
        let form_ttl = millis_var("CONTACT_FORM_TTL_MS", DEFAULT_FORM_TTL_MS)?;

        let admin_tokens = token_var("AUTH_ADMIN_TOKENS")?;
        let member_tokens = token_var("AUTH_MEMBER_TOKENS")?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            contact: ContactConfig {
                submit_latency,
                reset_delay,
                form_ttl,
            },
            auth: AuthConfig {
                admin_tokens,
                member_tokens,
            },
        })
    }
}

fn millis_var(name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidDuration { name }),
        Err(_) => Ok(Duration::from_millis(default)),
    }
}

fn token_var(name: &'static str) -> Result<Vec<TokenGrant>, ConfigError> {
    let raw = env::var(name).unwrap_or_default();
    parse_token_grants(&raw).map_err(|entry| ConfigError::InvalidToken { name, entry })
}

/// Parses `token:user` pairs separated by commas; blank entries are skipped.
pub(crate) fn parse_token_grants(raw: &str) -> Result<Vec<TokenGrant>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((token, user)) if !token.trim().is_empty() && !user.trim().is_empty() => {
                Ok(TokenGrant {
                    token: token.trim().to_string(),
                    user: UserId(user.trim().to_string()),
                })
            }
            _ => Err(entry.to_string()),
        })
        .collect()
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Timers driving the contact form lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactConfig {
    /// Simulated round trip between Submitting and Submitted.
    pub submit_latency: Duration,
    /// How long the confirmation stays visible before the form resets.
    pub reset_delay: Duration,
    /// Forms untouched for this long are treated as abandoned and evicted.
    pub form_ttl: Duration,
}

const DEFAULT_FORM_TTL_MS: u64 = 30 * 60 * 1000;

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            submit_latency: Duration::from_millis(1500),
            reset_delay: Duration::from_millis(5000),
            form_ttl: Duration::from_millis(DEFAULT_FORM_TTL_MS),
        }
    }
}

/// Static bearer tokens recognised by the built-in session provider.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub admin_tokens: Vec<TokenGrant>,
    pub member_tokens: Vec<TokenGrant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub token: String,
    pub user: UserId,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidDuration { name: &'static str },
    InvalidToken { name: &'static str, entry: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDuration { name } => {
                write!(f, "{name} must be a whole number of milliseconds")
            }
            ConfigError::InvalidToken { name, entry } => {
                write!(f, "{name} entry '{entry}' must look like token:user")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidDuration { .. }
            | ConfigError::InvalidToken { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "CONTACT_SUBMIT_LATENCY_MS",
            "CONTACT_RESET_DELAY_MS",
            "CONTACT_FORM_TTL_MS",
            "AUTH_ADMIN_TOKENS",
            "AUTH_MEMBER_TOKENS",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.contact, ContactConfig::default());
        assert!(config.auth.admin_tokens.is_empty());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn contact_timers_are_read_in_milliseconds() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CONTACT_SUBMIT_LATENCY_MS", "250");
        env::set_var("CONTACT_RESET_DELAY_MS", "1000");
        env::set_var("CONTACT_FORM_TTL_MS", "60000");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.contact.submit_latency, Duration::from_millis(250));
        assert_eq!(config.contact.reset_delay, Duration::from_secs(1));
        assert_eq!(config.contact.form_ttl, Duration::from_secs(60));

        env::set_var("CONTACT_RESET_DELAY_MS", "soon");
        let err = AppConfig::load().expect_err("non-numeric delay rejected");
        assert!(err.to_string().contains("CONTACT_RESET_DELAY_MS"));
        reset_env();
    }

    #[test]
    fn token_grants_parse_pairs_and_reject_malformed_entries() {
        let grants = parse_token_grants(" abc:dana , ,xyz:lee").expect("valid grants");
        assert_eq!(grants.len(), 2);
        assert_eq!(grants[0].token, "abc");
        assert_eq!(grants[0].user, UserId("dana".to_string()));

        assert_eq!(parse_token_grants("orphan"), Err("orphan".to_string()));
        assert_eq!(parse_token_grants(":nobody"), Err(":nobody".to_string()));
    }
}
