//! Safe-parse of list queries and create payloads.
//!
//! Nothing here fails loudly: every entry point returns a [`Validated`] value
//! carrying either the parsed input or the full list of [`Issue`]s, which the
//! handlers serialize into the `details` field of a 400 response.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::schema::{CreateMatchSchema, ListMatchesParams, ListMatchesQuery, MAX_LIMIT};

/// Earliest instant a Postgres `timestamptz` can hold (4714-11-24 BC, Julian day 0).
/// The latest one (294276 AD) lies beyond what chrono can represent.
const EARLIEST_STORABLE_MILLIS: i64 = -210_866_803_200_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidJson,
    InvalidQuery,
    InvalidType,
    Required,
    TooSmall,
    TooLarge,
    InvalidDate,
    InvalidInterval,
}

/// One violation, addressed by the JSON path of the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub path: Vec<String>,
    pub code: IssueCode,
    pub message: String,
}

impl Issue {
    pub fn new(field: &str, code: IssueCode, message: impl Into<String>) -> Self {
        let path = if field.is_empty() {
            Vec::new()
        } else {
            vec![field.to_string()]
        };
        Self {
            path,
            code,
            message: message.into(),
        }
    }
}

pub type Validated<T> = Result<T, Vec<Issue>>;

pub fn parse_list_query(params: &ListMatchesParams) -> Validated<ListMatchesQuery> {
    let mut issues = Vec::new();

    let limit = match params.limit.as_deref() {
        None => None,
        Some(raw) => match parse_limit(raw) {
            Some(limit) => Some(limit),
            None => {
                issues.push(Issue::new(
                    "limit",
                    IssueCode::InvalidType,
                    format!("Expected an integer, received \"{raw}\""),
                ));
                None
            }
        },
    };

    let query = ListMatchesQuery { limit };
    if let Err(errors) = query.validate() {
        issues.extend(issues_from(&errors));
    }

    finish(query, issues)
}

pub fn parse_create_payload(payload: &Value) -> Validated<CreateMatchSchema> {
    let Some(body) = payload.as_object() else {
        return Err(vec![Issue::new(
            "",
            IssueCode::InvalidType,
            format!("Expected an object, received {}", type_name(payload)),
        )]);
    };

    let mut issues = Vec::new();
    let start_time = timestamp_field(body, "startTime", &mut issues);
    let end_time = timestamp_field(body, "endTime", &mut issues);
    let home_score = score_field(body, "homeScore", &mut issues);
    let away_score = score_field(body, "awayScore", &mut issues);

    let (Some(start_time), Some(end_time), Some(home_score), Some(away_score)) =
        (start_time, end_time, home_score, away_score)
    else {
        return Err(sorted(issues));
    };

    let schema = CreateMatchSchema {
        start_time,
        end_time,
        home_score,
        away_score,
    };
    if let Err(errors) = schema.validate() {
        issues.extend(issues_from(&errors));
    }

    finish(schema, issues)
}

// Digit strings too long for i64 are still limits, just far above the cap
fn parse_limit(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(limit) = raw.parse::<i64>() {
        return Some(limit);
    }
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return Some(MAX_LIMIT);
    }
    None
}

/// Issue list for a request whose body or query string could not be decoded at all.
pub fn undecodable(code: IssueCode, message: impl Into<String>) -> Vec<Issue> {
    vec![Issue::new("", code, message)]
}

fn timestamp_field(
    body: &Map<String, Value>,
    field: &str,
    issues: &mut Vec<Issue>,
) -> Option<DateTime<Utc>> {
    let ts = match body.get(field) {
        None | Some(Value::Null) => {
            issues.push(Issue::new(
                field,
                IssueCode::Required,
                format!("{field} is required"),
            ));
            None
        }
        Some(Value::String(raw)) => match DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(_) => {
                issues.push(Issue::new(
                    field,
                    IssueCode::InvalidDate,
                    format!("Expected an RFC 3339 timestamp, received \"{raw}\""),
                ));
                None
            }
        },
        Some(Value::Number(n)) => match n.as_i64().and_then(DateTime::from_timestamp_millis) {
            Some(ts) => Some(ts),
            None => {
                issues.push(Issue::new(
                    field,
                    IssueCode::InvalidDate,
                    format!("{n} is not a valid epoch timestamp in milliseconds"),
                ));
                None
            }
        },
        Some(other) => {
            issues.push(Issue::new(
                field,
                IssueCode::InvalidType,
                format!(
                    "Expected a timestamp string or number, received {}",
                    type_name(other)
                ),
            ));
            None
        }
    }?;

    if ts.timestamp_millis() < EARLIEST_STORABLE_MILLIS {
        issues.push(Issue::new(
            field,
            IssueCode::InvalidDate,
            format!("{field} is before the earliest storable date (4714-11-24 BC)"),
        ));
        return None;
    }
    Some(ts)
}

// Absent and null scores default to 0
fn score_field(body: &Map<String, Value>, field: &str, issues: &mut Vec<Issue>) -> Option<i32> {
    match body.get(field) {
        None | Some(Value::Null) => Some(0),
        Some(Value::Number(n)) => {
            let (code, message) = match n.as_i64() {
                Some(v) => match i32::try_from(v) {
                    Ok(score) => return Some(score),
                    Err(_) if v < 0 => (IssueCode::TooSmall, format!("{field} must be at least 0")),
                    Err(_) => (
                        IssueCode::TooLarge,
                        format!("{field} must be at most {}", i32::MAX),
                    ),
                },
                None if n.is_u64() => (
                    IssueCode::TooLarge,
                    format!("{field} must be at most {}", i32::MAX),
                ),
                None => (
                    IssueCode::InvalidType,
                    format!("Expected an integer, received {n}"),
                ),
            };
            issues.push(Issue::new(field, code, message));
            None
        }
        Some(other) => {
            issues.push(Issue::new(
                field,
                IssueCode::InvalidType,
                format!("Expected an integer, received {}", type_name(other)),
            ));
            None
        }
    }
}

fn issues_from(errors: &ValidationErrors) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (field, errs) in errors.field_errors() {
        let path = field_path(&field);
        for err in errs.iter() {
            issues.push(issue_from(path, err));
        }
    }
    issues
}

fn issue_from(field: &str, err: &ValidationError) -> Issue {
    let code = match err.code.as_ref() {
        "range" => IssueCode::TooSmall,
        "invalid_interval" => IssueCode::InvalidInterval,
        _ => IssueCode::InvalidType,
    };
    let message = match (&err.message, err.params.get("min")) {
        (Some(message), _) => message.to_string(),
        (None, Some(min)) => format!("{field} must be at least {min}"),
        (None, None) => format!("{field} is invalid"),
    };
    Issue::new(field, code, message)
}

// validator reports struct fields by their Rust name; the only struct-level
// rule is the interval check, which belongs to endTime
fn field_path(field: &str) -> &str {
    match field {
        "start_time" => "startTime",
        "end_time" | "__all__" => "endTime",
        "home_score" => "homeScore",
        "away_score" => "awayScore",
        other => other,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn finish<T>(value: T, issues: Vec<Issue>) -> Validated<T> {
    if issues.is_empty() {
        Ok(value)
    } else {
        Err(sorted(issues))
    }
}

fn sorted(mut issues: Vec<Issue>) -> Vec<Issue> {
    issues.sort_by(|a, b| a.path.cmp(&b.path));
    issues
}
