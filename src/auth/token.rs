//! HMAC-SHA256 signed bearer tokens.
//!
//! Format: `base64url(claims json) "." base64url(mac over the first part)`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::AuthError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email.
    pub sub: String,
    /// Issued at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds. The token is valid while `now < exp`.
    pub exp: i64,
}

pub struct TokenIssuer {
    secret: SecretString,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: SecretString, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` with the configured ttl.
    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        self.issue_at(subject, self.ttl, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let expires = now
            .checked_add_signed(ttl)
            .ok_or(AuthError::ExpiryOutOfRange)?;
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };
        let json = serde_json::to_vec(&claims).map_err(|_| AuthError::InvalidToken)?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{}.{}", payload, signature))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Checks the signature first, then expiry.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let (payload, signature) = token.split_once('.').ok_or(AuthError::InvalidToken)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::InvalidToken)?;
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::InvalidToken)?;
        let claims: Claims = serde_json::from_slice(&json).map_err(|_| AuthError::InvalidToken)?;
        if now.timestamp() >= claims.exp {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| AuthError::SigningKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(SecretString::from(secret.to_string()), Duration::minutes(60))
    }

    #[test]
    fn token_valid_until_ttl_elapses() {
        let tokens = issuer("0123456789abcdef0123456789abcdef");
        let now = Utc::now();
        let token = tokens
            .issue_at("alice@example.com", Duration::minutes(60), now)
            .unwrap();

        let claims = tokens.verify_at(&token, now).unwrap();
        assert_eq!(claims.sub, "alice@example.com");
        assert!(tokens.verify_at(&token, now + Duration::minutes(59)).is_ok());
        assert!(matches!(
            tokens.verify_at(&token, now + Duration::minutes(60)),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn oversized_ttl_is_an_error() {
        let tokens = issuer("0123456789abcdef0123456789abcdef");
        let err = tokens
            .issue_at("alice@example.com", Duration::MAX, Utc::now())
            .unwrap_err();
        assert!(matches!(err, AuthError::ExpiryOutOfRange));
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let a = issuer("0123456789abcdef0123456789abcdef");
        let b = issuer("fedcba9876543210fedcba9876543210");
        let token = a.issue("alice@example.com").unwrap();
        assert!(matches!(b.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn rejects_tampered_claims() {
        let tokens = issuer("0123456789abcdef0123456789abcdef");
        let token = tokens.issue("alice@example.com").unwrap();
        let (_, signature) = token.split_once('.').unwrap();
        let forged_claims = Claims {
            sub: "bob@example.com".into(),
            iat: 0,
            exp: i64::MAX,
        };
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{}.{}", forged_payload, signature);
        assert!(matches!(tokens.verify(&forged), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn rejects_malformed_tokens() {
        let tokens = issuer("0123456789abcdef0123456789abcdef");
        for token in ["", "abc", "abc.def", "!!!.???"] {
            assert!(tokens.verify(token).is_err(), "accepted {:?}", token);
        }
    }
}
