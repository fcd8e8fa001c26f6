use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use validator::{Validate, ValidationError};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIMIT: i64 = 50;
/// Hard cap on the page size; larger requests are clamped, not rejected.
pub const MAX_LIMIT: i64 = 100;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "match_status", rename_all = "kebab-case")]
pub enum MatchStatus {
    Scheduled,
    InProgress,
    Finished,
}

impl MatchStatus {
    /// Lifecycle label of the interval `[start, end)` as seen at `now`.
    ///
    /// Computed once when a match is created; stored rows are never
    /// re-derived as time passes.
    pub fn derive(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now < start {
            MatchStatus::Scheduled
        } else if now < end {
            MatchStatus::InProgress
        } else {
            MatchStatus::Finished
        }
    }
}

// Raw query string, parsed by `validation::parse_list_query`
#[derive(Deserialize, Debug, Default)]
pub struct ListMatchesParams {
    pub limit: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq, Validate)]
pub struct ListMatchesQuery {
    #[validate(range(min = 1))]
    pub limit: Option<i64>,
}

impl ListMatchesQuery {
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
    }
}

/// A validated create payload, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
#[validate(schema(function = "validate_interval", skip_on_field_errors = false))]
pub struct CreateMatchSchema {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[validate(range(min = 0))]
    pub home_score: i32,
    #[validate(range(min = 0))]
    pub away_score: i32,
}

fn validate_interval(schema: &CreateMatchSchema) -> Result<(), ValidationError> {
    if schema.end_time < schema.start_time {
        return Err(ValidationError::new("invalid_interval")
            .with_message(Cow::Borrowed("endTime must not be before startTime")));
    }
    Ok(())
}

/// Row handed to the store: the payload plus its derived status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMatch {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub home_score: i32,
    pub away_score: i32,
    pub status: MatchStatus,
}

impl NewMatch {
    pub fn from_schema(schema: CreateMatchSchema, now: DateTime<Utc>) -> Self {
        Self {
            status: MatchStatus::derive(schema.start_time, schema.end_time, now),
            start_time: schema.start_time,
            end_time: schema.end_time,
            home_score: schema.home_score,
            away_score: schema.away_score,
        }
    }
}

// For json response
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse<T: Serialize> {
    pub message: &'static str,
    pub data: T,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_status_before_start_is_scheduled() {
        assert_eq!(
            MatchStatus::derive(at(10), at(12), at(9)),
            MatchStatus::Scheduled
        );
    }

    #[test]
    fn test_status_at_start_is_in_progress() {
        assert_eq!(
            MatchStatus::derive(at(10), at(12), at(10)),
            MatchStatus::InProgress
        );
        assert_eq!(
            MatchStatus::derive(at(10), at(12), at(12) - Duration::nanoseconds(1)),
            MatchStatus::InProgress
        );
    }

    #[test]
    fn test_status_at_or_after_end_is_finished() {
        assert_eq!(
            MatchStatus::derive(at(10), at(12), at(12)),
            MatchStatus::Finished
        );
        assert_eq!(
            MatchStatus::derive(at(10), at(12), at(20)),
            MatchStatus::Finished
        );
    }

    #[test]
    fn test_status_zero_length_interval() {
        assert_eq!(
            MatchStatus::derive(at(10), at(10), at(9)),
            MatchStatus::Scheduled
        );
        assert_eq!(
            MatchStatus::derive(at(10), at(10), at(10)),
            MatchStatus::Finished
        );
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_value(MatchStatus::InProgress).unwrap(),
            "in-progress"
        );
        assert_eq!(
            serde_json::to_value(MatchStatus::Scheduled).unwrap(),
            "scheduled"
        );
    }

    #[test]
    fn test_effective_limit_defaults_and_clamps() {
        assert_eq!(ListMatchesQuery { limit: None }.effective_limit(), 50);
        assert_eq!(ListMatchesQuery { limit: Some(7) }.effective_limit(), 7);
        assert_eq!(ListMatchesQuery { limit: Some(100) }.effective_limit(), 100);
        assert_eq!(ListMatchesQuery { limit: Some(500) }.effective_limit(), 100);
    }

    #[test]
    fn test_new_match_takes_derived_status() {
        let schema = CreateMatchSchema {
            start_time: at(10),
            end_time: at(12),
            home_score: 2,
            away_score: 1,
        };
        let new = NewMatch::from_schema(schema, at(11));
        assert_eq!(new.status, MatchStatus::InProgress);
        assert_eq!(new.home_score, 2);
        assert_eq!(new.away_score, 1);
    }
}
