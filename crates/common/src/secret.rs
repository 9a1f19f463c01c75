//! Secret types for protecting credentials held by the client.
//!
//! Re-exports the [`secrecy`] types. Anything that grants access to a room
//! goes through these wrappers:
//!
//! - the static bearer credential used by the demo token endpoint
//! - meeting passcodes
//! - identity-provider ID tokens
//! - fetched room access tokens
//!
//! `SecretString` redacts itself in `Debug`, so structs deriving `Debug`
//! stay safe to log through `tracing`. Reading the value requires an
//! explicit `expose_secret()` call at the point of use.
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct JoinCredentials {
//!     identity: String,
//!     room_token: SecretString,
//! }
//!
//! let creds = JoinCredentials {
//!     identity: "alice".to_string(),
//!     room_token: SecretString::from("tok-123"),
//! };
//!
//! assert!(!format!("{creds:?}").contains("tok-123"));
//! assert_eq!(creds.room_token.expose_secret(), "tok-123");
//! ```

pub use secrecy::{ExposeSecret, SecretString};

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_room_token_debug_is_redacted() {
        let token = SecretString::from("tok-123");
        let debug_str = format!("{token:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("tok-123"));
    }

    #[test]
    fn test_passcode_deserializes_and_stays_redacted() {
        #[allow(dead_code)]
        #[derive(Debug, Deserialize)]
        struct PasscodeForm {
            room_name: String,
            passcode: SecretString,
        }

        let json = r#"{"room_name": "standup", "passcode": "12345678901234"}"#;
        let form: PasscodeForm = serde_json::from_str(json).expect("deserialize");

        assert_eq!(form.passcode.expose_secret(), "12345678901234");

        let debug = format!("{form:?}");
        assert!(debug.contains("standup"));
        assert!(!debug.contains("12345678901234"));
    }
}
