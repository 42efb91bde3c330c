//! Authentication adapters.
//!
//! - `jwt` - HS256 session token codec (`TokenCodec`)
//! - `password` - Argon2id password hashing (`CredentialVerifier`)

mod jwt;
mod password;

pub use jwt::JwtTokenCodec;
pub use password::Argon2CredentialVerifier;
