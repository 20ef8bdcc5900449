//! Boundary between raw user values and the engine.
//!
//! [`RawInput`] is the nine-key mapping handed over by a form collector. It is
//! deliberately loose (signed integers, unchecked floats) so that every value a
//! user can type reaches [`InputRecord::from_raw`] and gets a field-specific
//! answer instead of a deserializer error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Practical upper bound for daily hours.
pub const MAX_DAILY_HOURS: f64 = 16.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("malformed input: {0}")]
    Malformed(String),

    #[error("{field} = {value} is out of range (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

impl InputError {
    /// Name of the offending field, when the error is about a single field.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            InputError::OutOfRange { field, .. } | InputError::NotFinite { field } => Some(field),
            InputError::Malformed(_) => None,
        }
    }
}

/// What to do with a value outside its declared domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    #[default]
    Reject,
    Clamp,
}

/// Unvalidated form values. Unknown keys are ignored, missing keys are an error.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawInput {
    pub daily_hours: f64,
    pub production_ratio: f64,
    pub completed_projects: i64,
    pub quality_score: i64,
    pub original_posts: i64,
    pub replies: i64,
    pub emotional_stability: i64,
    pub task_alignment: i64,
    pub is_team: bool,
}

impl Default for RawInput {
    /// Starting values of the dashboard form.
    fn default() -> Self {
        Self {
            daily_hours: 4.0,
            production_ratio: 0.1,
            completed_projects: 0,
            quality_score: 3,
            original_posts: 1,
            replies: 10,
            emotional_stability: 5,
            task_alignment: 5,
            is_team: false,
        }
    }
}

impl RawInput {
    /// Build from a JSON mapping.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, InputError> {
        serde_json::from_value(value).map_err(|e| InputError::Malformed(e.to_string()))
    }

    /// Parse a JSON document holding the mapping.
    pub fn from_json_str(s: &str) -> Result<Self, InputError> {
        serde_json::from_str(s).map_err(|e| InputError::Malformed(e.to_string()))
    }
}

/// A validated analysis request. Only obtainable through [`InputRecord::from_raw`].
#[derive(Debug, Clone, PartialEq)]
pub struct InputRecord {
    daily_hours: f64,
    production_ratio: f64,
    completed_projects: u32,
    quality_score: u8,
    original_posts: u32,
    replies: u32,
    emotional_stability: u8,
    task_alignment: u8,
    is_team: bool,
}

impl InputRecord {
    /// Validate raw values. Total: every input yields a record or an error.
    pub fn from_raw(raw: &RawInput, policy: ValidationPolicy) -> Result<Self, InputError> {
        Ok(Self {
            daily_hours: check_float(
                "daily_hours",
                raw.daily_hours,
                0.0,
                MAX_DAILY_HOURS,
                "0-16",
                policy,
            )?,
            production_ratio: check_float(
                "production_ratio",
                raw.production_ratio,
                0.0,
                1.0,
                "0-1",
                policy,
            )?,
            completed_projects: check_count("completed_projects", raw.completed_projects, policy)?,
            quality_score: check_scale("quality_score", raw.quality_score, 1, 5, "1-5", policy)?,
            original_posts: check_count("original_posts", raw.original_posts, policy)?,
            replies: check_count("replies", raw.replies, policy)?,
            emotional_stability: check_scale(
                "emotional_stability",
                raw.emotional_stability,
                0,
                10,
                "0-10",
                policy,
            )?,
            task_alignment: check_scale(
                "task_alignment",
                raw.task_alignment,
                0,
                10,
                "0-10",
                policy,
            )?,
            is_team: raw.is_team,
        })
    }

    pub fn daily_hours(&self) -> f64 {
        self.daily_hours
    }

    pub fn production_ratio(&self) -> f64 {
        self.production_ratio
    }

    pub fn completed_projects(&self) -> u32 {
        self.completed_projects
    }

    pub fn quality_score(&self) -> u8 {
        self.quality_score
    }

    pub fn original_posts(&self) -> u32 {
        self.original_posts
    }

    pub fn replies(&self) -> u32 {
        self.replies
    }

    pub fn emotional_stability(&self) -> u8 {
        self.emotional_stability
    }

    pub fn task_alignment(&self) -> u8 {
        self.task_alignment
    }

    pub fn is_team(&self) -> bool {
        self.is_team
    }

    /// Back to the loose form representation (always re-validates cleanly).
    pub fn to_raw(&self) -> RawInput {
        RawInput {
            daily_hours: self.daily_hours,
            production_ratio: self.production_ratio,
            completed_projects: self.completed_projects as i64,
            quality_score: self.quality_score as i64,
            original_posts: self.original_posts as i64,
            replies: self.replies as i64,
            emotional_stability: self.emotional_stability as i64,
            task_alignment: self.task_alignment as i64,
            is_team: self.is_team,
        }
    }
}

impl TryFrom<RawInput> for InputRecord {
    type Error = InputError;

    fn try_from(raw: RawInput) -> Result<Self, Self::Error> {
        InputRecord::from_raw(&raw, ValidationPolicy::Reject)
    }
}

fn check_float(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
    expected: &'static str,
    policy: ValidationPolicy,
) -> Result<f64, InputError> {
    // NaN cannot be clamped meaningfully, so it is rejected under both policies
    if !value.is_finite() {
        return Err(InputError::NotFinite { field });
    }
    if (min..=max).contains(&value) {
        return Ok(value);
    }
    match policy {
        ValidationPolicy::Clamp => Ok(value.clamp(min, max)),
        ValidationPolicy::Reject => Err(InputError::OutOfRange {
            field,
            value: value.to_string(),
            expected,
        }),
    }
}

fn check_int(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
    expected: &'static str,
    policy: ValidationPolicy,
) -> Result<i64, InputError> {
    if (min..=max).contains(&value) {
        return Ok(value);
    }
    match policy {
        ValidationPolicy::Clamp => Ok(value.clamp(min, max)),
        ValidationPolicy::Reject => Err(InputError::OutOfRange {
            field,
            value: value.to_string(),
            expected,
        }),
    }
}

fn check_count(field: &'static str, value: i64, policy: ValidationPolicy) -> Result<u32, InputError> {
    check_int(field, value, 0, u32::MAX as i64, ">= 0", policy).map(|v| v as u32)
}

fn check_scale(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
    expected: &'static str,
    policy: ValidationPolicy,
) -> Result<u8, InputError> {
    check_int(field, value, min, max, expected, policy).map(|v| v as u8)
}
