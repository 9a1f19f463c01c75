//! Client application-state configuration.
//!
//! Configuration is resolved once at startup from environment variables and
//! never changes afterwards. In particular the auth mode picks exactly one
//! strategy for the lifetime of the process. All sensitive fields are
//! redacted in Debug output.

use common::secret::SecretString;
use common::types::RoomType;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default path of the token endpoint, relative to the app origin.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "/token";

/// Default origin that relative token endpoints resolve against.
pub const DEFAULT_APP_BASE_URL: &str = "http://localhost:3000";

/// Default timeout for token requests in seconds.
pub const DEFAULT_TOKEN_HTTP_TIMEOUT_SECONDS: u64 = 10;

/// Authentication strategy compiled into this client deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMode {
    /// No user authentication; the demo token endpoint is called with a
    /// static bearer credential.
    NoAuth,
    /// Identity-provider sign-in (Firebase style ID tokens).
    Firebase,
    /// Shared meeting passcode.
    Passcode,
}

impl AuthMode {
    /// Parse the `AUTH_MODE` value. Unset or empty selects [`AuthMode::NoAuth`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidAuthMode` for any other value.
    pub fn parse(value: Option<&str>) -> Result<Self, ConfigError> {
        match value.map(str::trim) {
            None | Some("") => Ok(AuthMode::NoAuth),
            Some("firebase") => Ok(AuthMode::Firebase),
            Some("passcode") => Ok(AuthMode::Passcode),
            Some(other) => Err(ConfigError::InvalidAuthMode(format!(
                "AUTH_MODE must be unset, 'firebase' or 'passcode', got '{}'",
                other
            ))),
        }
    }

    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::NoAuth => "none",
            AuthMode::Firebase => "firebase",
            AuthMode::Passcode => "passcode",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-state configuration.
#[derive(Clone)]
pub struct Config {
    /// Selected authentication strategy.
    pub auth_mode: AuthMode,

    /// Token endpoint, either a path (default "/token") or an absolute URL.
    pub token_endpoint: String,

    /// Origin used to resolve a relative `token_endpoint`.
    pub app_base_url: String,

    /// Static bearer credential sent by the no-auth strategy.
    pub token_bearer: Option<SecretString>,

    /// Passcode to verify at startup (passcode mode only).
    pub initial_passcode: Option<SecretString>,

    /// Optional room type hint published to consumers.
    pub room_type: Option<RoomType>,

    /// Timeout applied to every token request.
    pub http_timeout: Duration,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("auth_mode", &self.auth_mode)
            .field("token_endpoint", &self.token_endpoint)
            .field("app_base_url", &self.app_base_url)
            .field(
                "token_bearer",
                &self.token_bearer.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "initial_passcode",
                &self.initial_passcode.as_ref().map(|_| "[REDACTED]"),
            )
            .field("room_type", &self.room_type)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid auth mode configuration: {0}")]
    InvalidAuthMode(String),

    #[error("Invalid room type configuration: {0}")]
    InvalidRoomType(String),

    #[error("Invalid token timeout configuration: {0}")]
    InvalidTimeout(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let auth_mode = AuthMode::parse(vars.get("AUTH_MODE").map(String::as_str))?;

        let token_endpoint = vars
            .get("TOKEN_ENDPOINT")
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_TOKEN_ENDPOINT.to_string());

        let app_base_url = vars
            .get("APP_BASE_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_APP_BASE_URL.to_string());

        let token_bearer = vars
            .get("TOKEN_BEARER")
            .filter(|v| !v.is_empty())
            .map(|v| SecretString::from(v.clone()));

        // The demo endpoint cannot be reached without its bearer credential
        if auth_mode == AuthMode::NoAuth && token_bearer.is_none() {
            return Err(ConfigError::MissingEnvVar("TOKEN_BEARER".to_string()));
        }

        let initial_passcode = vars
            .get("PASSCODE")
            .filter(|v| !v.is_empty())
            .map(|v| SecretString::from(v.clone()));

        let room_type = match vars.get("ROOM_TYPE").filter(|v| !v.is_empty()) {
            Some(value) => Some(
                value
                    .parse::<RoomType>()
                    .map_err(|e| ConfigError::InvalidRoomType(e.to_string()))?,
            ),
            None => None,
        };

        let http_timeout = if let Some(value_str) = vars.get("TOKEN_HTTP_TIMEOUT_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidTimeout(format!(
                    "TOKEN_HTTP_TIMEOUT_SECONDS must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidTimeout(
                    "TOKEN_HTTP_TIMEOUT_SECONDS must be greater than 0".to_string(),
                ));
            }

            Duration::from_secs(value)
        } else {
            Duration::from_secs(DEFAULT_TOKEN_HTTP_TIMEOUT_SECONDS)
        };

        Ok(Config {
            auth_mode,
            token_endpoint,
            app_base_url,
            token_bearer,
            initial_passcode,
            room_type,
            http_timeout,
        })
    }

    /// Absolute URL of the token endpoint.
    ///
    /// Absolute endpoints are used as-is; paths are joined onto
    /// `app_base_url`.
    pub fn token_url(&self) -> String {
        if self.token_endpoint.starts_with("http://") || self.token_endpoint.starts_with("https://")
        {
            return self.token_endpoint.clone();
        }

        let base = self.app_base_url.trim_end_matches('/');
        if self.token_endpoint.starts_with('/') {
            format!("{}{}", base, self.token_endpoint)
        } else {
            format!("{}/{}", base, self.token_endpoint)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use common::secret::ExposeSecret;

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([("TOKEN_BEARER".to_string(), "demo-bearer".to_string())])
    }

    #[test]
    fn test_from_vars_success_with_defaults() {
        let config = Config::from_vars(&base_vars()).expect("Config should load successfully");

        assert_eq!(config.auth_mode, AuthMode::NoAuth);
        assert_eq!(config.token_endpoint, DEFAULT_TOKEN_ENDPOINT);
        assert_eq!(config.app_base_url, DEFAULT_APP_BASE_URL);
        assert_eq!(
            config.token_bearer.as_ref().unwrap().expose_secret(),
            "demo-bearer"
        );
        assert!(config.initial_passcode.is_none());
        assert!(config.room_type.is_none());
        assert_eq!(
            config.http_timeout,
            Duration::from_secs(DEFAULT_TOKEN_HTTP_TIMEOUT_SECONDS)
        );
        assert_eq!(config.token_url(), "http://localhost:3000/token");
    }

    #[test]
    fn test_from_vars_success_with_custom_values() {
        let mut vars = base_vars();
        vars.insert("AUTH_MODE".to_string(), "passcode".to_string());
        vars.insert("TOKEN_ENDPOINT".to_string(), "/custom".to_string());
        vars.insert(
            "APP_BASE_URL".to_string(),
            "https://video.example.com/".to_string(),
        );
        vars.insert("PASSCODE".to_string(), "12345678901234".to_string());
        vars.insert("ROOM_TYPE".to_string(), "group-small".to_string());
        vars.insert("TOKEN_HTTP_TIMEOUT_SECONDS".to_string(), "3".to_string());

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.auth_mode, AuthMode::Passcode);
        assert_eq!(config.token_url(), "https://video.example.com/custom");
        assert_eq!(
            config.initial_passcode.as_ref().unwrap().expose_secret(),
            "12345678901234"
        );
        assert_eq!(config.room_type, Some(RoomType::GroupSmall));
        assert_eq!(config.http_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_auth_mode_parse() {
        assert_eq!(AuthMode::parse(None).unwrap(), AuthMode::NoAuth);
        assert_eq!(AuthMode::parse(Some("")).unwrap(), AuthMode::NoAuth);
        assert_eq!(
            AuthMode::parse(Some("firebase")).unwrap(),
            AuthMode::Firebase
        );
        assert_eq!(
            AuthMode::parse(Some("passcode")).unwrap(),
            AuthMode::Passcode
        );
        assert!(matches!(
            AuthMode::parse(Some("oauth")),
            Err(ConfigError::InvalidAuthMode(_))
        ));
    }

    #[test]
    fn test_missing_bearer_rejected_only_without_auth() {
        let result = Config::from_vars(&HashMap::new());
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "TOKEN_BEARER"));

        let vars = HashMap::from([("AUTH_MODE".to_string(), "firebase".to_string())]);
        let config = Config::from_vars(&vars).expect("firebase mode needs no bearer");
        assert_eq!(config.auth_mode, AuthMode::Firebase);
        assert!(config.token_bearer.is_none());
    }

    #[test]
    fn test_absolute_token_endpoint_used_as_is() {
        let mut vars = base_vars();
        vars.insert(
            "TOKEN_ENDPOINT".to_string(),
            "https://tokens.example.com/v2/token".to_string(),
        );

        let config = Config::from_vars(&vars).unwrap();
        assert_eq!(config.token_url(), "https://tokens.example.com/v2/token");
    }

    #[test]
    fn test_relative_endpoint_without_leading_slash() {
        let mut vars = base_vars();
        vars.insert("TOKEN_ENDPOINT".to_string(), "api/token".to_string());

        let config = Config::from_vars(&vars).unwrap();
        assert_eq!(config.token_url(), "http://localhost:3000/api/token");
    }

    #[test]
    fn test_invalid_room_type_rejected() {
        let mut vars = base_vars();
        vars.insert("ROOM_TYPE".to_string(), "lobby".to_string());

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidRoomType(_))));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let mut vars = base_vars();
        vars.insert("TOKEN_HTTP_TIMEOUT_SECONDS".to_string(), "0".to_string());
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidTimeout(_))
        ));

        vars.insert("TOKEN_HTTP_TIMEOUT_SECONDS".to_string(), "soon".to_string());
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidTimeout(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut vars = base_vars();
        vars.insert("PASSCODE".to_string(), "98765432109876".to_string());

        let config = Config::from_vars(&vars).unwrap();
        let debug_str = format!("{:?}", config);

        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("demo-bearer"));
        assert!(!debug_str.contains("98765432109876"));
    }
}
