use serde::{Deserialize, Serialize};

use super::config::ScoringConfig;
use super::diagnosis::{actions_for, diagnose, Diagnosis};
use super::input::InputRecord;
use super::validation::validate_scoring;

/// Upper bound shared by all three scores (radar axis range).
pub const SCORE_MAX: f64 = 100.0;

/// Fixed axis labels, in chart order.
pub const AXIS_LABELS: [&str; 3] = ["effectiveness", "immunity", "cohesion"];

/// Outcome of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub effectiveness: f64,
    pub immunity: f64,
    pub cohesion: f64,
    pub diagnosis: Diagnosis,
    pub actions: Vec<String>,
}

impl ScoreResult {
    /// Scores keyed by axis label, in chart order.
    pub fn axes(&self) -> [(&'static str, f64); 3] {
        [
            (AXIS_LABELS[0], self.effectiveness),
            (AXIS_LABELS[1], self.immunity),
            (AXIS_LABELS[2], self.cohesion),
        ]
    }

    pub fn diagnosis_text(&self) -> &'static str {
        self.diagnosis.headline()
    }
}

/// Intermediate values behind a result, for the breakdown views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub raw_points: f64,
    pub quality_factor: f64,
    pub gained: f64,
    pub time_tax: f64,
    pub engagement_total: f64,
    pub independence_ratio: f64,
    pub team_multiplier: f64,
}

/// Pure scorer. Holds constants only, so it is freely shareable across threads.
#[derive(Debug, Clone, Default)]
pub struct ScoreEngine {
    config: ScoringConfig,
}

impl ScoreEngine {
    /// Build an engine from validated constants; returns every problem
    /// `validate_scoring` finds otherwise.
    pub fn new(config: ScoringConfig) -> Result<Self, Vec<String>> {
        validate_scoring(&config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn compute(&self, input: &InputRecord) -> ScoreResult {
        let b = self.explain(input);
        let c = &self.config;

        let effectiveness = round2(b.gained - b.time_tax + c.baseline_credit)
            .clamp(c.effectiveness_floor, SCORE_MAX);

        let stability = input.emotional_stability() as f64 / 10.0;
        let immunity = round2(b.independence_ratio * c.independence_weight + stability * c.stability_weight)
            .clamp(0.0, SCORE_MAX);

        let cohesion = round2(input.task_alignment() as f64 * c.alignment_scale * b.team_multiplier)
            .clamp(0.0, SCORE_MAX);

        let diagnosis = diagnose(effectiveness, immunity, cohesion, c);

        ScoreResult {
            effectiveness,
            immunity,
            cohesion,
            diagnosis,
            actions: actions_for(diagnosis, c),
        }
    }

    pub fn explain(&self, input: &InputRecord) -> ScoreBreakdown {
        let c = &self.config;

        let raw_points = input.production_ratio() * c.production_weight
            + input.completed_projects() as f64 * c.project_weight;
        let quality_factor = input.quality_score() as f64 / c.quality_scale;

        let engagement_total =
            input.original_posts() as f64 + input.replies() as f64 + c.engagement_epsilon;

        ScoreBreakdown {
            raw_points,
            quality_factor,
            gained: raw_points * quality_factor,
            time_tax: input.daily_hours() * c.hour_tax,
            engagement_total,
            independence_ratio: input.original_posts() as f64 / engagement_total,
            team_multiplier: if input.is_team() { c.team_multiplier } else { 1.0 },
        }
    }
}

/// Score with the canonical constants.
pub fn compute(input: &InputRecord) -> ScoreResult {
    ScoreEngine::default().compute(input)
}

/// Round half away from zero to two decimals.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::input::{RawInput, ValidationPolicy};

    #[allow(clippy::too_many_arguments)]
    fn record(
        daily_hours: f64,
        production_ratio: f64,
        completed_projects: i64,
        quality_score: i64,
        original_posts: i64,
        replies: i64,
        emotional_stability: i64,
        task_alignment: i64,
        is_team: bool,
    ) -> InputRecord {
        let raw = RawInput {
            daily_hours,
            production_ratio,
            completed_projects,
            quality_score,
            original_posts,
            replies,
            emotional_stability,
            task_alignment,
            is_team,
        };
        InputRecord::from_raw(&raw, ValidationPolicy::Reject).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_low_production_scenario() {
        let input = record(4.0, 0.1, 0, 3, 1, 10, 5, 5, false);
        let result = compute(&input);

        // gained = 8 * 0.6 = 4.8, tax = 12, 4.8 - 12 + 15 = 7.8
        assert!(approx(result.effectiveness, 7.8), "got {}", result.effectiveness);
        // 1 / 11.1 * 60 + 0.5 * 40 = 25.405...
        assert!(approx(result.immunity, 25.41), "got {}", result.immunity);
        assert!(approx(result.cohesion, 50.0));
        assert_eq!(result.diagnosis, Diagnosis::Stagnation);
        assert_eq!(result.actions.len(), 2);
    }

    #[test]
    fn test_effectiveness_clamped_at_100() {
        let input = record(0.0, 1.0, 10, 5, 5, 0, 10, 10, false);
        let result = compute(&input);
        // 280 + 15 would be 295
        assert_eq!(result.effectiveness, 100.0);
    }

    #[test]
    fn test_effectiveness_floor() {
        let input = record(16.0, 0.0, 0, 1, 0, 0, 0, 0, false);
        let result = compute(&input);
        // 0 - 48 + 15 is well below the floor
        assert_eq!(result.effectiveness, 5.0);
    }

    #[test]
    fn test_zero_engagement_does_not_divide_by_zero() {
        let input = record(2.0, 0.5, 1, 3, 0, 0, 7, 5, false);
        let breakdown = ScoreEngine::default().explain(&input);
        assert!(approx(breakdown.engagement_total, 0.1));
        assert_eq!(breakdown.independence_ratio, 0.0);

        let result = compute(&input);
        assert!(approx(result.immunity, 28.0));
    }

    #[test]
    fn test_team_cohesion_clamped() {
        let input = record(2.0, 0.5, 1, 3, 1, 1, 5, 10, true);
        let result = compute(&input);
        // 10 * 10 * 1.2 = 120 -> 100
        assert_eq!(result.cohesion, 100.0);
    }

    #[test]
    fn test_effectiveness_exactly_at_threshold_is_not_stagnation() {
        // 3 projects at quality 5 = 60 gained, 10h * 3 = 30 tax, 60 - 30 + 15 = 45
        let input = record(10.0, 0.0, 3, 5, 1, 5, 5, 5, false);
        let result = compute(&input);
        assert_eq!(result.effectiveness, 45.0);
        assert!(result.immunity < 45.0);
        assert_eq!(result.diagnosis, Diagnosis::ExposedEffort);
    }

    #[test]
    fn test_balanced_profile() {
        let input = record(2.0, 0.8, 2, 5, 8, 2, 8, 8, true);
        let result = compute(&input);
        assert!(result.effectiveness >= 45.0);
        assert!(result.immunity >= 45.0);
        assert!(result.cohesion >= 45.0);
        assert_eq!(result.diagnosis, Diagnosis::Balanced);
        assert_eq!(result.actions.len(), 2);
    }

    #[test]
    fn test_balanced_without_guidance() {
        let engine = ScoreEngine::new(ScoringConfig {
            balanced_guidance: false,
            ..ScoringConfig::default()
        })
        .unwrap();
        let input = record(2.0, 0.8, 2, 5, 8, 2, 8, 8, true);
        let result = engine.compute(&input);
        assert_eq!(result.diagnosis, Diagnosis::Balanced);
        assert!(result.actions.is_empty());
    }

    #[test]
    fn test_fragmentation_profile() {
        let input = record(2.0, 0.8, 2, 5, 8, 2, 8, 2, false);
        let result = compute(&input);
        assert_eq!(result.diagnosis, Diagnosis::Fragmentation);
    }

    #[test]
    fn test_compute_is_pure() {
        let input = record(3.5, 0.35, 2, 4, 3, 7, 6, 7, true);
        let a = compute(&input);
        let b = compute(&input);
        assert_eq!(a, b);
        assert_eq!(a.effectiveness.to_bits(), b.effectiveness.to_bits());
        assert_eq!(a.immunity.to_bits(), b.immunity.to_bits());
        assert_eq!(a.cohesion.to_bits(), b.cohesion.to_bits());
    }

    #[test]
    fn test_scores_stay_in_bounds_across_grid() {
        let engine = ScoreEngine::default();
        for hours in [0.0, 4.0, 8.0, 16.0] {
            for ratio in [0.0, 0.5, 1.0] {
                for projects in [0, 3, 50] {
                    for quality in 1..=5 {
                        for posts in [0, 1, 50] {
                            for replies in [0, 10] {
                                for stability in [0, 10] {
                                    for alignment in [0, 5, 10] {
                                        for team in [false, true] {
                                            let input = record(
                                                hours, ratio, projects, quality, posts, replies,
                                                stability, alignment, team,
                                            );
                                            let r = engine.compute(&input);
                                            assert!((5.0..=100.0).contains(&r.effectiveness));
                                            assert!((0.0..=100.0).contains(&r.immunity));
                                            assert!((0.0..=100.0).contains(&r.cohesion));
                                            if r.effectiveness < 45.0 {
                                                assert_eq!(r.diagnosis, Diagnosis::Stagnation);
                                            }
                                            assert!(r.actions.len() <= 2);
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_immunity_invariant_under_scaling() {
        let small = compute(&record(2.0, 0.5, 1, 3, 100, 400, 6, 5, false));
        let large = compute(&record(2.0, 0.5, 1, 3, 1000, 4000, 6, 5, false));
        assert!((small.immunity - large.immunity).abs() < 0.05);
    }

    #[test]
    fn test_team_multiplier_is_exact_below_clamp() {
        for alignment in 0..=8 {
            let solo = compute(&record(2.0, 0.5, 1, 3, 1, 1, 5, alignment, false));
            let team = compute(&record(2.0, 0.5, 1, 3, 1, 1, 5, alignment, true));
            assert!(
                approx(team.cohesion, solo.cohesion * 1.2),
                "alignment {}: {} vs {}",
                alignment,
                team.cohesion,
                solo.cohesion
            );
        }
    }

    #[test]
    fn test_axes_order_and_labels() {
        let result = compute(&record(4.0, 0.1, 0, 3, 1, 10, 5, 5, false));
        let axes = result.axes();
        assert_eq!(axes[0].0, "effectiveness");
        assert_eq!(axes[1].0, "immunity");
        assert_eq!(axes[2].0, "cohesion");
        assert_eq!(axes[2].1, result.cohesion);
    }

    #[test]
    fn test_invalid_constants_rejected_at_construction() {
        let errors = ScoreEngine::new(ScoringConfig {
            effectiveness_floor: 150.0,
            ..ScoringConfig::default()
        })
        .unwrap_err();
        assert!(errors.iter().any(|e| e.contains("effectiveness_floor")));

        let errors = ScoreEngine::new(ScoringConfig {
            effectiveness_floor: f64::NAN,
            quality_scale: 0.0,
            ..ScoringConfig::default()
        })
        .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_custom_constants() {
        let engine = ScoreEngine::new(ScoringConfig {
            hour_tax: 0.0,
            ..ScoringConfig::default()
        })
        .unwrap();
        let result = engine.compute(&record(4.0, 0.1, 0, 3, 1, 10, 5, 5, false));
        // 4.8 + 15, no deduction
        assert!(approx(result.effectiveness, 19.8));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(25.405405), 25.41);
        assert_eq!(round2(7.8), 7.8);
        assert_eq!(round2(-0.004), -0.0);
    }
}
