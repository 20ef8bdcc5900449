use super::config::ScoringConfig;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let non_negative = [
        ("production_weight", config.production_weight),
        ("project_weight", config.project_weight),
        ("hour_tax", config.hour_tax),
        ("baseline_credit", config.baseline_credit),
        ("independence_weight", config.independence_weight),
        ("stability_weight", config.stability_weight),
        ("alignment_scale", config.alignment_scale),
    ];
    for (name, value) in non_negative {
        if !value.is_finite() {
            errors.push(format!("scoring.{}: must be a finite number", name));
        } else if value < 0.0 {
            errors.push(format!("scoring.{}: must be non-negative", name));
        }
    }

    if !(config.quality_scale.is_finite() && config.quality_scale > 0.0) {
        errors.push("scoring.quality_scale: must be greater than zero".to_string());
    }

    if !(config.engagement_epsilon.is_finite() && config.engagement_epsilon > 0.0) {
        errors.push("scoring.engagement_epsilon: must be greater than zero".to_string());
    }

    if !(0.0..=100.0).contains(&config.effectiveness_floor) {
        errors.push(format!(
            "scoring.effectiveness_floor: {} is outside 0-100",
            config.effectiveness_floor
        ));
    }

    if !(0.0..=100.0).contains(&config.threshold) {
        errors.push(format!(
            "scoring.threshold: {} is outside 0-100",
            config.threshold
        ));
    }

    if !(config.team_multiplier.is_finite() && config.team_multiplier >= 1.0) {
        errors.push("scoring.team_multiplier: must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
