//! Repository functions: domain models over the SeaORM adapters.

pub mod fixtures;
pub mod pick_tokens;
pub mod picks;
pub mod players;
pub mod reminders;
pub mod rounds;
