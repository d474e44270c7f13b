//! Credential wrappers and expiry decoding.

pub mod jwt;
pub mod secret;

pub use jwt::*;
pub use secret::TokenSecret;
