//! Services: transactional operations over repos, returning `AppError`.
//!
//! Every entry point takes the caller's `&DatabaseTransaction`; wrap calls in
//! `db::txn::with_txn` so lifecycle writes commit or roll back together.

pub mod elimination;
pub mod lifecycle;
pub mod picks;
pub mod reminders;
pub mod selections;
pub mod tokens;
