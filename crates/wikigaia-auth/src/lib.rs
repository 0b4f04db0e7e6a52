//! # wikigaia-auth
//!
//! Verification of identity tokens issued by the external identity
//! provider. Sessions, passwords, and token issuance live with the provider;
//! this crate only decodes and validates.

pub mod jwt;

pub use jwt::{Claims, JwtDecoder};
