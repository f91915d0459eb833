//! Bearer token issuing and verification.
//!
//! Tokens are stateless: a base64url JSON claims payload signed with
//! HMAC-SHA256. Login issues a token for any supplied username; no
//! credential check is performed.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing username")]
    MissingUsername,
    #[error("missing bearer token")]
    NoCredential,
    #[error("invalid or expired token")]
    InvalidCredential,
}

/// Claims carried inside a token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies bearer tokens for the odds endpoint.
pub struct AuthGate {
    secret: Vec<u8>,
    ttl_secs: i64,
}

impl AuthGate {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            ttl_secs: ttl_secs as i64,
        }
    }

    /// Issue a token for `username`, expiring a fixed duration from now.
    /// Expiry is not refreshable; a new login is required.
    pub fn issue(&self, username: &str) -> Result<String, AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::MissingUsername);
        }

        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: username.to_string(),
            iat,
            exp: iat + self.ttl_secs,
        };

        let payload = serde_json::to_vec(&claims).expect("claims serialize to JSON");
        let signature = self.sign(&payload);

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload),
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Check a token's signature and expiry, returning its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let (payload_b64, signature_b64) =
            token.split_once('.').ok_or(AuthError::InvalidCredential)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::InvalidCredential)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AuthError::InvalidCredential)?;

        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        mac.update(&payload);
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidCredential)?;

        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| AuthError::InvalidCredential)?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::InvalidCredential);
        }

        Ok(claims)
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AuthGate {
        AuthGate::new("test-secret", 3600)
    }

    #[test]
    fn issued_token_round_trips() {
        let token = gate().issue("alice").unwrap();
        let claims = gate().verify(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn empty_username_is_rejected() {
        assert!(matches!(gate().issue(""), Err(AuthError::MissingUsername)));
        assert!(matches!(gate().issue("   "), Err(AuthError::MissingUsername)));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            gate().verify("not-a-token"),
            Err(AuthError::InvalidCredential)
        ));
        assert!(matches!(
            gate().verify("a.b.c"),
            Err(AuthError::InvalidCredential)
        ));
        assert!(matches!(gate().verify(""), Err(AuthError::InvalidCredential)));
    }

    #[test]
    fn tampered_payload_fails_signature_check() {
        let token = gate().issue("alice").unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let forged = Claims {
            sub: "mallory".to_string(),
            iat: 0,
            exp: i64::MAX,
        };
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
        let tampered = format!("{}.{}", forged_payload, signature);

        assert!(matches!(
            gate().verify(&tampered),
            Err(AuthError::InvalidCredential)
        ));
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = AuthGate::new("other-secret", 3600).issue("alice").unwrap();
        assert!(matches!(
            gate().verify(&token),
            Err(AuthError::InvalidCredential)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let gate = AuthGate::new("test-secret", 0);
        let token = gate.issue("alice").unwrap();
        assert!(matches!(
            gate.verify(&token),
            Err(AuthError::InvalidCredential)
        ));
    }
}
