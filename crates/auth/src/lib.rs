//! `nestegg-auth` — authentication boundary for the single fixed owner.
//!
//! This crate is intentionally decoupled from HTTP and storage: password
//! verification is a pure hash comparison, and session tokens carry the
//! owner identity that the API layer passes explicitly into every core call.

pub mod claims;
pub mod password;
pub mod token;

pub use claims::{SessionClaims, validate_claims};
pub use password::{hash_password, verify_password};
pub use token::{Session, SessionKeys, TokenError};
