//! Credential handling and the typed principal produced for every
//! authenticated request.

pub mod extractor;
pub mod jwt;
pub mod password;
pub mod principal;

pub use jwt::{Claims, TokenService};
pub use principal::{Principal, Scope};
