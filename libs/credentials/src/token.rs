use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::errors::CredentialError;

type HmacSha256 = Hmac<Sha256>;

/// The claims carried by a bearer token. Not exposed to clients as a
/// structured object — they only ever see the opaque `BearerToken` string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// An opaque bearer token: base64url(claims JSON) `.` base64url(HMAC-SHA256
/// over the claims bytes). Deliberately not a JWT — a JWT's header and
/// claims are meant to be read by the client; this token's payload is an
/// implementation detail the client must not rely on.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Signs and verifies bearer tokens with a process-wide HMAC secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    default_ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>, default_ttl_seconds: i64) -> Self {
        Self {
            secret: secret.into(),
            default_ttl: Duration::seconds(default_ttl_seconds),
        }
    }

    pub fn issue(&self, user_id: Uuid) -> (BearerToken, TokenClaims) {
        let now = Utc::now();
        let claims = TokenClaims {
            user_id,
            issued_at: now,
            expires_at: now + self.default_ttl,
        };
        (self.sign(&claims), claims)
    }

    fn sign(&self, claims: &TokenClaims) -> BearerToken {
        let payload = serde_json::to_vec(claims).expect("TokenClaims always serializes");
        let payload_b64 = URL_SAFE_NO_PAD.encode(&payload);
        let signature = self.mac(payload_b64.as_bytes());
        BearerToken(format!("{payload_b64}.{signature}"))
    }

    fn mac(&self, data: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        mac.update(data);
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }

    /// Verifies signature, expiry, and well-formedness. Returns a single
    /// opaque error on any failure so callers cannot distinguish "bad
    /// signature" from "expired" from "malformed" from the response alone.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, CredentialError> {
        let (payload_b64, signature) = token.split_once('.').ok_or(CredentialError::Invalid)?;

        let expected_signature = self.mac(payload_b64.as_bytes());
        let signatures_match: bool = expected_signature
            .as_bytes()
            .ct_eq(signature.as_bytes())
            .into();
        if !signatures_match {
            return Err(CredentialError::Invalid);
        }

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| CredentialError::Invalid)?;
        let claims: TokenClaims =
            serde_json::from_slice(&payload).map_err(|_| CredentialError::Invalid)?;

        if claims.expires_at <= Utc::now() {
            return Err(CredentialError::Invalid);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_fresh_token() {
        let signer = TokenSigner::new(b"test-secret".to_vec(), 3600);
        let user_id = Uuid::new_v4();
        let (token, _) = signer.issue(user_id);
        let claims = signer.verify(&token.0).unwrap();
        assert_eq!(claims.user_id, user_id);
    }

    #[test]
    fn rejects_tampered_signature() {
        let signer = TokenSigner::new(b"test-secret".to_vec(), 3600);
        let (token, _) = signer.issue(Uuid::new_v4());
        let mut tampered = token.0.clone();
        tampered.push('x');
        assert!(signer.verify(&tampered).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let signer = TokenSigner::new(b"test-secret".to_vec(), -1);
        let (token, _) = signer.issue(Uuid::new_v4());
        assert!(signer.verify(&token.0).is_err());
    }

    #[test]
    fn rejects_token_signed_with_a_different_secret() {
        let signer_a = TokenSigner::new(b"secret-a".to_vec(), 3600);
        let signer_b = TokenSigner::new(b"secret-b".to_vec(), 3600);
        let (token, _) = signer_a.issue(Uuid::new_v4());
        assert!(signer_b.verify(&token.0).is_err());
    }
}
