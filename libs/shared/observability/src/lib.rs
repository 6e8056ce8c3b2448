//! Structured logging with secret redaction enforced at the sink, not by
//! caller discipline — see [`redact::redact_value`] and
//! [`layer::RedactingLayer`].

mod init;
mod layer;
mod redact;

pub use init::init_tracing;
pub use layer::RedactingLayer;
pub use redact::{redact_value, REDACTED_SENTINEL};
