//! Authentication module
//!
//! Access token signing and the authenticated-subject extractor.

pub mod identity;
pub mod jwt;

pub use identity::{AuthenticatedUser, ACCESS_TOKEN_COOKIE};
pub use jwt::{Claims, IssuedToken, JwtService};
