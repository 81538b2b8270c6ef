//! Token types

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

/// A token within this many seconds of expiry is refreshed early
const EXPIRY_SKEW_SECONDS: i64 = 30;

/// Bearer token issued by a token endpoint
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The bearer value
    pub value: String,
    /// Absent when the provider sent no `expires_in`
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Read `access_token` and the optional `expires_in` from a token response
    pub fn from_response(body: &Value, issued_at: DateTime<Utc>) -> Result<Self> {
        let value = body
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::auth("Token response has no string field 'access_token'"))?
            .to_string();

        // An expiry past chrono's range is kept as no expiry
        let expires_at = body
            .get("expires_in")
            .and_then(Value::as_i64)
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime));

        Ok(Self { value, expires_at })
    }

    /// Whether the token can still be sent at `now`
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        let Some(expires_at) = self.expires_at else {
            return true;
        };
        now.checked_add_signed(Duration::seconds(EXPIRY_SKEW_SECONDS))
            .map_or(false, |deadline| deadline < expires_at)
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn token(expires_in: i64) -> AccessToken {
        let body = json!({"access_token": "t", "expires_in": expires_in});
        AccessToken::from_response(&body, Utc::now()).unwrap()
    }

    #[test]
    fn test_fresh_token_usable() {
        assert!(token(3600).is_usable_at(Utc::now()));
    }

    #[test]
    fn test_expired_token_unusable() {
        assert!(!token(-100).is_usable_at(Utc::now()));
    }

    #[test]
    fn test_token_inside_skew_unusable() {
        assert!(!token(10).is_usable_at(Utc::now()));
    }

    #[test]
    fn test_token_without_expiry_always_usable() {
        let token = AccessToken::from_response(&json!({"access_token": "t"}), Utc::now()).unwrap();
        assert!(token.expires_at.is_none());
        assert!(token.is_usable_at(Utc::now() + Duration::days(365)));
    }

    #[test_case(i64::MAX ; "beyond duration range")]
    #[test_case(i64::MAX / 1000 ; "beyond datetime range")]
    fn test_huge_expires_in_means_no_expiry(expires_in: i64) {
        let token = token(expires_in);
        assert!(token.expires_at.is_none());
        assert!(token.is_usable_at(Utc::now()));
    }

    #[test]
    fn test_missing_access_token() {
        let err = AccessToken::from_response(&json!({"token": "t"}), Utc::now()).unwrap_err();
        assert!(err.to_string().contains("access_token"));
    }
}
