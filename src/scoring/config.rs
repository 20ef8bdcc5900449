use serde::{Deserialize, Serialize};

/// Scoring constants.
///
/// Every weight, clamp and threshold used by the engine lives here. The
/// defaults are the canonical deduction-based revision; any subset can be
/// overridden from the config file.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   hour_tax: 2.5
///   threshold: 40
///   balanced_guidance: false
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Points per unit of production ratio (ratio is in [0, 1])
    pub production_weight: f64,

    /// Points per completed project
    pub project_weight: f64,

    /// Divisor turning the 1-5 quality score into a factor
    pub quality_scale: f64,

    /// Points deducted per daily hour
    pub hour_tax: f64,

    /// Credit added so that zero activity does not score zero
    pub baseline_credit: f64,

    /// Lower clamp for effectiveness (upper clamp is always 100)
    pub effectiveness_floor: f64,

    /// Weight of the independence ratio in immunity
    pub independence_weight: f64,

    /// Weight of emotional stability (as a fraction of 10) in immunity
    pub stability_weight: f64,

    /// Added to the engagement total so zero posts and replies never divide by zero
    pub engagement_epsilon: f64,

    /// Cohesion points per task alignment step
    pub alignment_scale: f64,

    /// Cohesion multiplier applied when working in a team
    pub team_multiplier: f64,

    /// Diagnosis threshold; a score strictly below it triggers its verdict
    pub threshold: f64,

    /// When false, a balanced verdict carries no actions
    pub balanced_guidance: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            production_weight: 80.0,
            project_weight: 20.0,
            quality_scale: 5.0,
            hour_tax: 3.0,
            baseline_credit: 15.0,
            effectiveness_floor: 5.0,
            independence_weight: 60.0,
            stability_weight: 40.0,
            engagement_epsilon: 0.1,
            alignment_scale: 10.0,
            team_multiplier: 1.2,
            threshold: 45.0,
            balanced_guidance: true,
        }
    }
}
