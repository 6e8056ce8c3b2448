use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verifies a provider webhook signature: a keyed MAC (HMAC-SHA256) of the
/// *raw* request body, hex-encoded, compared in constant time. The body
/// must be the exact bytes received, before any JSON parsing, since
/// re-serializing would not reproduce byte-identical input.
pub fn verify_webhook_signature(secret: &[u8], raw_body: &[u8], provided_signature_hex: &str) -> bool {
    let Ok(provided) = hex::decode(provided_signature_hex) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(raw_body);
    let expected = mac.finalize().into_bytes();

    if expected.len() != provided.len() {
        return false;
    }
    expected.ct_eq(&provided).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &[u8], body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_a_correctly_signed_body() {
        let secret = b"webhook-secret";
        let body = br#"{"event_type":"subscription.activated"}"#;
        let signature = sign(secret, body);
        assert!(verify_webhook_signature(secret, body, &signature));
    }

    #[test]
    fn rejects_a_tampered_body() {
        let secret = b"webhook-secret";
        let body = br#"{"event_type":"subscription.activated"}"#;
        let signature = sign(secret, body);
        let tampered = br#"{"event_type":"subscription.cancelled"}"#;
        assert!(!verify_webhook_signature(secret, tampered, &signature));
    }

    #[test]
    fn rejects_a_signature_from_the_wrong_secret() {
        let body = br#"{"event_type":"subscription.activated"}"#;
        let signature = sign(b"other-secret", body);
        assert!(!verify_webhook_signature(b"webhook-secret", body, &signature));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(!verify_webhook_signature(b"secret", b"body", "not-hex"));
    }
}
