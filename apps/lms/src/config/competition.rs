//! Competition tuning read from the environment.

use std::env;

use time::Duration;

use crate::error::AppError;

const DEFAULT_TOKEN_TTL_HOURS: i64 = 168;
const DEFAULT_REMINDER_OFFSETS_HOURS: [i64; 2] = [4, 1];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitionConfig {
    /// Lifetime of a freshly minted pick token.
    pub token_ttl: Duration,
    /// Reminder lead times before a round's first kickoff, longest first.
    pub reminder_offsets: Vec<Duration>,
}

impl Default for CompetitionConfig {
    fn default() -> Self {
        Self {
            token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            reminder_offsets: DEFAULT_REMINDER_OFFSETS_HOURS
                .iter()
                .map(|h| Duration::hours(*h))
                .collect(),
        }
    }
}

impl CompetitionConfig {
    /// `LMS_TOKEN_TTL_HOURS` (default 168) and `LMS_REMINDER_OFFSETS_HOURS` (default "4,1").
    pub fn from_env() -> Result<Self, AppError> {
        let token_ttl = match env::var("LMS_TOKEN_TTL_HOURS") {
            Ok(raw) => Duration::hours(parse_positive_hours("LMS_TOKEN_TTL_HOURS", &raw)?),
            Err(_) => Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        };

        let reminder_offsets = match env::var("LMS_REMINDER_OFFSETS_HOURS") {
            Ok(raw) => parse_offsets(&raw)?,
            Err(_) => Self::default().reminder_offsets,
        };

        Ok(Self {
            token_ttl,
            reminder_offsets,
        })
    }
}

fn parse_positive_hours(name: &str, raw: &str) -> Result<i64, AppError> {
    match raw.trim().parse::<i64>() {
        Ok(hours) if hours > 0 => Ok(hours),
        _ => Err(AppError::config(format!(
            "{name} must be a positive number of hours, got '{raw}'"
        ))),
    }
}

fn parse_offsets(raw: &str) -> Result<Vec<Duration>, AppError> {
    let mut hours = raw
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| parse_positive_hours("LMS_REMINDER_OFFSETS_HOURS", part))
        .collect::<Result<Vec<_>, _>>()?;
    hours.sort_unstable_by(|a, b| b.cmp(a));
    hours.dedup();
    Ok(hours.into_iter().map(Duration::hours).collect())
}
