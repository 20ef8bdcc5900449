pub mod config;
pub mod diagnosis;
pub mod engine;
pub mod input;
pub mod validation;

pub use config::ScoringConfig;
pub use diagnosis::{diagnose, Diagnosis};
pub use engine::{compute, ScoreBreakdown, ScoreEngine, ScoreResult, AXIS_LABELS, SCORE_MAX};
pub use input::{InputError, InputRecord, RawInput, ValidationPolicy, MAX_DAILY_HOURS};
pub use validation::validate_scoring;
