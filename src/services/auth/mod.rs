pub mod hs256_jwt;

pub use hs256_jwt::{AccessJwtError, AuthService};
