//! # ca-auth-accounts
//!
//! Account lifecycle for ca-auth.
//!
//! Accounts live in two places: a record in the document store and an
//! identity (plus wallet credential) at the identity issuer. This crate
//! keeps the two in step:
//!
//! - `AccountRegistry`: account records in the document store
//! - `RegistrationCoordinator`: issuer registration first, record second
//! - `AuthGate`: token validity plus live wallet credential
//! - `AdminBootstrap`: first administrator from the registrar identity
//! - `AccountService`: login, user creation and token checks

#![warn(clippy::all)]

pub mod errors;
pub mod registry;
mod service;
pub mod traits;
pub mod types;


pub use errors::*;
pub use registry::AccountRegistry;
pub use service::{
    AccountService, AccountServiceOptions, AdminBootstrap, AuthGate, RegistrationCoordinator,
};
pub use traits::AccountManager;
pub use types::*;
