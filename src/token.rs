//! Typed token and user-snapshot accessors over the credential store

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::error::Error;
use crate::session::User;
use crate::store::CredentialStore;

pub(crate) const ACCESS_TOKEN_KEY: &str = "access_token";
pub(crate) const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub(crate) const USER_KEY: &str = "auth_user";

#[derive(Debug, Deserialize)]
struct TokenClaims {
    exp: Option<i64>,
}

/// Typed wrapper over the credential store for exactly three logical values:
/// the access token, the refresh token, and the cached user snapshot.
#[derive(Clone)]
pub struct TokenService {
    store: Arc<CredentialStore>,
}

impl TokenService {
    pub fn new(store: Arc<CredentialStore>) -> Self {
        Self { store }
    }

    /// Write the access/refresh pair under their fixed keys.
    pub fn set_tokens(&self, access: &str, refresh: &str) {
        self.store.set(ACCESS_TOKEN_KEY, access);
        self.store.set(REFRESH_TOKEN_KEY, refresh);
    }

    pub fn access_token(&self) -> Option<String> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    /// Serialize and store the user snapshot.
    pub fn set_user(&self, user: &User) -> Result<(), Error> {
        let raw = serde_json::to_string(user)?;
        self.store.set(USER_KEY, &raw);
        Ok(())
    }

    /// Read the stored user snapshot. A corrupt entry is removed and treated
    /// as absent, never surfaced as an error.
    pub fn stored_user(&self) -> Option<User> {
        let raw = self.store.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                log::warn!("discarding corrupt stored user snapshot: {}", err);
                self.store.remove(USER_KEY);
                None
            }
        }
    }

    /// Remove all three keys.
    pub fn clear_tokens(&self) {
        self.store.remove(ACCESS_TOKEN_KEY);
        self.store.remove(REFRESH_TOKEN_KEY);
        self.store.remove(USER_KEY);
    }

    /// Whether a stored access token exists and its `exp` lies in the future.
    /// Any decode failure answers `false`.
    pub fn has_valid_token(&self) -> bool {
        let token = match self.access_token() {
            Some(token) => token,
            None => return false,
        };
        match decode_claims(&token) {
            Ok(TokenClaims { exp: Some(exp) }) => exp > Utc::now().timestamp(),
            _ => false,
        }
    }

    /// Whether `token` (or the stored access token when omitted) is expired.
    /// A missing token or an undecodable expiry counts as expired.
    pub fn is_token_expired(&self, token: Option<&str>) -> bool {
        let token = match token {
            Some(token) => token.to_string(),
            None => match self.access_token() {
                Some(token) => token,
                None => return true,
            },
        };
        match decode_claims(&token) {
            Ok(TokenClaims { exp: Some(exp) }) => exp <= Utc::now().timestamp(),
            _ => true,
        }
    }

    /// Expiry instant carried by `token`, or `None` on any decode failure.
    pub fn token_expiration_date(&self, token: &str) -> Option<DateTime<Utc>> {
        let claims = decode_claims(token).ok()?;
        let exp = claims.exp?;
        Utc.timestamp_opt(exp, 0).single()
    }
}

/// Split on `.`, require exactly three segments, base64url-decode the middle
/// one and parse it as JSON. Every public method owns its own error boundary
/// around this.
fn decode_claims(token: &str) -> Result<TokenClaims, Error> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(Error::invalid_token("expected three token segments"));
    }
    let payload = URL_SAFE_NO_PAD
        .decode(segments[1])
        .map_err(Error::invalid_token)?;
    Ok(serde_json::from_slice(&payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> TokenService {
        TokenService::new(Arc::new(CredentialStore::durable(MemoryStore::new())))
    }

    fn token_with_exp(exp: i64) -> String {
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{}}}"#, exp));
        format!("header.{}.signature", payload)
    }

    #[test]
    fn stores_and_clears_token_pair() {
        let tokens = service();
        tokens.set_tokens("a.b.c", "refresh-1");
        assert_eq!(tokens.access_token(), Some("a.b.c".to_string()));
        assert_eq!(tokens.refresh_token(), Some("refresh-1".to_string()));

        tokens.clear_tokens();
        assert_eq!(tokens.access_token(), None);
        assert_eq!(tokens.refresh_token(), None);
    }

    #[test]
    fn corrupt_user_snapshot_is_discarded() {
        let tokens = service();
        tokens.store.set(USER_KEY, "{not json");
        assert!(tokens.stored_user().is_none());
        // The corrupt entry must be gone, not returned again
        assert_eq!(tokens.store.get(USER_KEY), None);
        assert!(tokens.stored_user().is_none());
    }

    #[test]
    fn user_snapshot_round_trips() {
        let tokens = service();
        let user = User {
            id: "u-1".to_string(),
            first_name: "Claire".to_string(),
            last_name: "Moreau".to_string(),
            email: "claire@etude.example".to_string(),
            phone: None,
            profile: Some("notaire".to_string()),
            online: true,
            marital_status: None,
            created_at: None,
            updated_at: None,
        };
        tokens.set_user(&user).unwrap();
        assert_eq!(tokens.stored_user(), Some(user));
    }

    #[test]
    fn token_one_second_in_the_future_is_valid() {
        let tokens = service();
        tokens.set_tokens(&token_with_exp(Utc::now().timestamp() + 1), "r");
        assert!(tokens.has_valid_token());
        assert!(!tokens.is_token_expired(None));
    }

    #[test]
    fn token_one_second_in_the_past_is_expired() {
        let tokens = service();
        tokens.set_tokens(&token_with_exp(Utc::now().timestamp() - 1), "r");
        assert!(!tokens.has_valid_token());
        assert!(tokens.is_token_expired(None));
    }

    #[test]
    fn missing_token_is_expired_and_invalid() {
        let tokens = service();
        assert!(!tokens.has_valid_token());
        assert!(tokens.is_token_expired(None));
    }

    #[test]
    fn malformed_tokens_decode_as_expired() {
        let tokens = service();
        for bad in ["two.segments", "not-even-dotted", "a.!!!not-base64!!!.c"] {
            assert!(tokens.is_token_expired(Some(bad)), "token: {bad}");
            assert_eq!(tokens.token_expiration_date(bad), None);
        }

        let no_exp = format!("h.{}.s", URL_SAFE_NO_PAD.encode("{}"));
        assert!(tokens.is_token_expired(Some(&no_exp)));

        tokens.set_tokens("garbage", "r");
        assert!(!tokens.has_valid_token());
    }

    #[test]
    fn expiration_date_reflects_exp_claim() {
        let tokens = service();
        let exp = Utc::now().timestamp() + 3600;
        let date = tokens
            .token_expiration_date(&token_with_exp(exp))
            .expect("decodable token");
        assert_eq!(date.timestamp(), exp);
    }
}
