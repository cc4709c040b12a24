pub mod competition;
pub mod fixtures;
pub mod pick_tokens;
pub mod picks;
pub mod players;
pub mod reminder_schedules;
pub mod rounds;
