// src/utils/token.rs

//! Bearer-token cache for the authenticated detail API.
//!
//! The registry hands out JWTs valid for roughly 100 minutes and offers no
//! programmatic refresh; tokens are operator-supplied. This cache only
//! gates reuse behind an expiry check - it never renews anything itself.

use chrono::{DateTime, Duration, Utc};

/// Default validity window in minutes for a freshly supplied token.
pub const DEFAULT_VALID_MINUTES: i64 = 100;

/// Safety margin subtracted from the stated validity.
const EXPIRY_MARGIN_MINUTES: i64 = 5;

/// Holds one bearer token plus its computed expiry instant.
#[derive(Debug, Default)]
pub struct TokenManager {
    token: Option<String>,
    expiry: Option<DateTime<Utc>>,
}

impl TokenManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a token, treating it as expired 5 minutes before its stated
    /// validity runs out. A validity of 5 minutes or less yields a token
    /// that is already expired.
    pub fn set_token(&mut self, token: impl Into<String>, valid_minutes: i64) {
        let expiry = Utc::now() + Duration::minutes(valid_minutes - EXPIRY_MARGIN_MINUTES);
        self.token = Some(token.into());
        self.expiry = Some(expiry);
        log::info!("Bearer token updated. Expires at: {}", expiry.to_rfc3339());
    }

    /// The stored token, or `None` if absent or past expiry.
    pub fn token(&self) -> Option<&str> {
        match (&self.token, self.expiry) {
            (Some(token), Some(expiry)) if Utc::now() <= expiry => Some(token),
            _ => None,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.token().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_fresh_token() {
        let mut tokens = TokenManager::new();
        tokens.set_token("t", 10);
        assert_eq!(tokens.token(), Some("t"));
        assert!(!tokens.is_expired());
    }

    #[test]
    fn empty_manager_is_expired() {
        let tokens = TokenManager::new();
        assert_eq!(tokens.token(), None);
        assert!(tokens.is_expired());
    }

    #[test]
    fn expiry_honors_safety_margin() {
        let mut tokens = TokenManager::new();
        tokens.set_token("t", 10);
        // Simulate the clock passing the (10 - 5) minute mark.
        tokens.expiry = Some(Utc::now() - Duration::seconds(1));
        assert_eq!(tokens.token(), None);
        assert!(tokens.is_expired());
    }

    #[test]
    fn short_validity_is_immediately_expired() {
        let mut tokens = TokenManager::new();
        tokens.set_token("t", 5);
        assert_eq!(tokens.token(), None);
    }
}
