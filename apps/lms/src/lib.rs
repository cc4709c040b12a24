//! Last Man Standing competition core.
//!
//! Rounds are grouped into cycles. Exactly one round is ever treated as current;
//! every consumer reaches it through [`services::lifecycle::RoundLifecycle::current_round`].

// Raw tables stay crate-private so nothing outside the crate can query rounds
// by status and bypass the resolver. Integration tests opt in through
// the `test-support` feature to seed rows directly.
#[cfg(feature = "test-support")]
pub mod adapters;
#[cfg(not(feature = "test-support"))]
pub(crate) mod adapters;
pub mod config;
pub mod db;
pub mod domain;
#[cfg(feature = "test-support")]
pub mod entities;
#[cfg(not(feature = "test-support"))]
pub(crate) mod entities;
pub mod error;
pub mod errors;
pub mod infra;
pub mod logging;
pub mod repos;
pub mod services;
pub mod state;
pub mod utils;


pub use error::AppError;
pub use errors::domain::DomainError;
pub use errors::ErrorCode;
