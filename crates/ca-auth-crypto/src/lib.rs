//! # ca-auth-crypto
//!
//! Cryptographic primitives shared by the ca-auth crates:
//! - Salted, deterministic password hashing (Argon2id)
//! - Constant-time comparison
//! - Timestamp helper

#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod utils;

pub use errors::{CryptoError, Result};
pub use hashing::{constant_time_compare, generate_salt, PasswordHasher};
pub use utils::current_timestamp;
