//! DTOs for reminders_sea adapter.

use time::OffsetDateTime;

#[derive(Debug, Clone)]
pub struct ReminderCreate {
    pub player_id: i64,
    pub round_id: i64,
    pub offset_minutes: i32,
    pub scheduled_at: OffsetDateTime,
}
