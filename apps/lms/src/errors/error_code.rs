//! Error codes surfaced to collaborators (admin tools, messaging, pick pages).
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! Every code is SCREAMING_SNAKE_CASE and unique.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Round lifecycle
    /// Target round is not in a state that permits the transition
    InvalidTransition,
    /// No round is currently open
    NoActiveRound,
    /// A cycle cannot be restarted while it still has contenders
    CycleInProgress,

    // Picks and tokens
    AlreadyPicked,
    AlreadyHasToken,
    PlayerNotActive,
    TokenExpired,
    /// Token is bound to a round that is no longer current
    TokenStale,
    InvalidSelection,
    /// Team was already used by this player in the current cycle
    SelectionReused,
    DeadlinePassed,

    // Results
    UnknownFixture,
    InvalidResult,

    // General validation
    ValidationError,

    // Resource Not Found
    RoundNotFound,
    PlayerNotFound,
    FixtureNotFound,
    TokenNotFound,
    ReminderNotFound,
    NotFound,

    // Conflicts
    DuplicateRound,
    Conflict,

    // System Errors
    DbError,
    DbUnavailable,
    DbTimeout,
    DataCorruption,
    Internal,
    ConfigError,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        Self::InvalidTransition,
        Self::NoActiveRound,
        Self::CycleInProgress,
        Self::AlreadyPicked,
        Self::AlreadyHasToken,
        Self::PlayerNotActive,
        Self::TokenExpired,
        Self::TokenStale,
        Self::InvalidSelection,
        Self::SelectionReused,
        Self::DeadlinePassed,
        Self::UnknownFixture,
        Self::InvalidResult,
        Self::ValidationError,
        Self::RoundNotFound,
        Self::PlayerNotFound,
        Self::FixtureNotFound,
        Self::TokenNotFound,
        Self::ReminderNotFound,
        Self::NotFound,
        Self::DuplicateRound,
        Self::Conflict,
        Self::DbError,
        Self::DbUnavailable,
        Self::DbTimeout,
        Self::DataCorruption,
        Self::Internal,
        Self::ConfigError,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::NoActiveRound => "NO_ACTIVE_ROUND",
            Self::CycleInProgress => "CYCLE_IN_PROGRESS",

            Self::AlreadyPicked => "ALREADY_PICKED",
            Self::AlreadyHasToken => "ALREADY_HAS_TOKEN",
            Self::PlayerNotActive => "PLAYER_NOT_ACTIVE",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenStale => "TOKEN_STALE",
            Self::InvalidSelection => "INVALID_SELECTION",
            Self::SelectionReused => "SELECTION_REUSED",
            Self::DeadlinePassed => "DEADLINE_PASSED",

            Self::UnknownFixture => "UNKNOWN_FIXTURE",
            Self::InvalidResult => "INVALID_RESULT",

            Self::ValidationError => "VALIDATION_ERROR",

            Self::RoundNotFound => "ROUND_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::FixtureNotFound => "FIXTURE_NOT_FOUND",
            Self::TokenNotFound => "TOKEN_NOT_FOUND",
            Self::ReminderNotFound => "REMINDER_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::DuplicateRound => "DUPLICATE_ROUND",
            Self::Conflict => "CONFLICT",

            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
