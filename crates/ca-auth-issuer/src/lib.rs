//! # ca-auth-issuer
//!
//! Identity issuer integration for ca-auth.
//!
//! - `IdentityIssuer` / `CredentialWallet` collaborator interfaces
//! - File-system and in-memory credential wallets
//! - `LocalIssuer`, an in-process issuer for development and tests
//! - `IssuerAdapter`, the register/enroll/exists semantics the account
//!   services rely on

#![warn(clippy::all)]

pub mod adapter;
pub mod errors;
pub mod local;
pub mod traits;
pub mod types;
pub mod wallet;

pub use adapter::IssuerAdapter;
pub use errors::{IssuerError, Result};
pub use local::LocalIssuer;
pub use traits::{CredentialWallet, IdentityIssuer};
pub use types::*;
pub use wallet::{validate_label, FileSystemWallet, InMemoryWallet};
