use rand::RngCore;

/// A 256-bit random value, hex-encoded (64 characters). Used as the
/// per-workspace proxy credential; never derived from anything
/// predictable, never reused.
pub fn generate_proxy_credential() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_64_hex_characters() {
        let credential = generate_proxy_credential();
        assert_eq!(credential.len(), 64);
        assert!(credential.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn is_not_constant() {
        assert_ne!(generate_proxy_credential(), generate_proxy_credential());
    }
}
