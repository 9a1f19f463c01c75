//! Common error types for Dark Tower client components.

use thiserror::Error;

/// Errors raised when a textual value does not name a known variant.
///
/// Shared by every enum that is parsed from configuration or from a
/// settings action (room types, bandwidth modes, render dimensions, ...).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The value is not one of the accepted spellings.
    #[error("Unknown {kind} value: '{value}'")]
    UnknownVariant {
        /// Human-readable name of the type being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}

impl ParseError {
    /// Build an `UnknownVariant` error for `kind`.
    #[must_use]
    pub fn unknown(kind: &'static str, value: &str) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_variant_message() {
        let err = ParseError::unknown("room type", "lobby");
        assert_eq!(err.to_string(), "Unknown room type value: 'lobby'");
    }
}
