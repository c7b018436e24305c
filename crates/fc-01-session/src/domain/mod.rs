//! Domain layer: credential value and pure claim evaluation.

pub mod claims;
pub mod credential;

pub use claims::{decode_claims, evaluate, SessionClaims, TokenStatus};
pub use credential::Credential;
