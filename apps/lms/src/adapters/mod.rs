//! SeaORM adapters. Functions return `sea_orm::DbErr`; repos map to `DomainError`.
//!
//! Round status is deliberately absent here: it is read and written only by
//! `services::lifecycle`.

pub mod fixtures_sea;
pub mod pick_tokens_sea;
pub mod picks_sea;
pub mod players_sea;
pub mod reminders_sea;
pub mod rounds_sea;
