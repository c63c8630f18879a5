//! Secure string handling with redacted display and serialization.
//!
//! Provides `RedactedString` for storing sensitive data like passwords while preventing
//! accidental exposure in logs, debug output, or serialized configuration.

use bon::Builder;
use derive_more::From;
use getset::Getters;
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Debug, Formatter};
use std::result;
use validator::Validate;
use zeroize::Zeroize;

/// Placeholder text shown instead of the actual password in logs/debug output
pub static REDACTED_PASSWORD: &str = "###REDACTED_PASSWORD###";

/// A string that gets redacted in debug output and serialization
///
/// Used to store sensitive data like passwords while preventing
/// accidental exposure in logs, debug output, or serialized config.
///
/// Provides access through getter methods and automatically
/// zeros memory on drop.
#[derive(Validate, Clone, Zeroize, From, Builder, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct RedactedString {
    #[validate(length(min = 1))]
    #[builder(into)]
    inner: String,
}

impl RedactedString {
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Debug for RedactedString {
    /// Always shows the redacted placeholder instead of the actual value
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", REDACTED_PASSWORD)
    }
}

impl Serialize for RedactedString {
    /// Always serializes as the redacted placeholder
    fn serialize<S: Serializer>(&self, serializer: S) -> result::Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED_PASSWORD)
    }
}

impl<'de> Deserialize<'de> for RedactedString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> result::Result<Self, D::Error> {
        deserializer.deserialize_str(RedactedStringVisitor)
    }
}

impl Drop for RedactedString {
    fn drop(&mut self) {
        // Zero out the internal string when dropped
        self.zeroize();
    }
}

pub struct RedactedStringVisitor;

impl Visitor<'_> for RedactedStringVisitor {
    type Value = RedactedString;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("a string")
    }

    /// Deserializes the actual secret value
    fn visit_str<E>(self, v: &str) -> result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(RedactedString::builder().inner(v).build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_string_debug() {
        let redacted = RedactedString::builder().inner("secret_password").build();
        let debug_str = format!("{:?}", redacted);
        assert_eq!(debug_str, REDACTED_PASSWORD);
    }

    #[test]
    fn test_redacted_string_serialize() {
        let redacted = RedactedString::builder().inner("secret_password").build();
        let serialized = serde_yml::to_string(&redacted).unwrap();
        assert!(serialized.contains(REDACTED_PASSWORD));
        assert!(!serialized.contains("secret_password"));
    }

    #[test]
    fn test_redacted_string_deserialize() {
        let redacted: RedactedString = serde_yml::from_str("\"actual_password_123\"").unwrap();
        assert_eq!(redacted.inner(), "actual_password_123");
    }

    #[test]
    fn test_redacted_string_validation() {
        let valid = RedactedString::builder().inner("valid_password").build();
        assert!(valid.validate().is_ok());

        let invalid = RedactedString::builder().inner("").build();
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_redacted_string_is_empty() {
        assert!(RedactedString::builder().inner("").build().is_empty());
        assert!(!RedactedString::builder().inner("x").build().is_empty());
    }
}
