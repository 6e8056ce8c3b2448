use thiserror::Error;

/// A single, non-disclosing error for every way a credential can fail to
/// check out. Callers must not distinguish "wrong password" from "unknown
/// user" or "malformed token" from "expired token" in anything shown to
/// the caller — only in logs, and even there without the secret itself.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid credential")]
    Invalid,
    #[error("hashing backend error: {0}")]
    HashingBackend(String),
}
