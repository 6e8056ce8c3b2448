//! Password hashing, bearer-token issuance/validation, and high-entropy
//! secret generation for per-workspace proxy credentials.
//!
//! Nothing here touches the database or the network; callers own wiring
//! this into the persistence gateway and the HTTP surface.

mod errors;
mod password;
mod proxy_credential;
mod token;

pub use errors::CredentialError;
pub use password::{hash_password, hash_password_with_params, verify_password};
pub use proxy_credential::generate_proxy_credential;
pub use token::{BearerToken, TokenClaims, TokenSigner};
