//! `homepage-auth` — bearer token validation for the callback API.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod principal;
pub mod roles;
pub mod validator;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use principal::PrincipalId;
pub use roles::{ADMIN_ROLE, Role};
pub use validator::{Hs256JwtValidator, JwtValidator};
