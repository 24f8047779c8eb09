//! # ca-auth-sessions
//!
//! Stateless session tokens for ca-auth.
//!
//! Tokens are HS256 JWTs carrying the account id, username and role. Any
//! process holding the signing secret can verify them.

#![warn(clippy::all)]

pub mod clock;
pub mod errors;
mod service;
pub mod types;


pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::*;
pub use service::TokenService;
pub use types::*;
