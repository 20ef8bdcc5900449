use serde::{Deserialize, Serialize};
use std::fmt;

use super::config::ScoringConfig;

/// Categorical verdict. Variants are listed in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagnosis {
    /// Consumption outweighs production
    Stagnation,
    /// Energy drained in reactive engagement
    ExposedEffort,
    /// Individual effort not channeled into a larger goal
    Fragmentation,
    Balanced,
}

impl Diagnosis {
    pub fn label(&self) -> &'static str {
        match self {
            Diagnosis::Stagnation => "Stagnation",
            Diagnosis::ExposedEffort => "Exposed effort",
            Diagnosis::Fragmentation => "Fragmentation",
            Diagnosis::Balanced => "Balanced",
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Diagnosis::Stagnation => {
                "Warning: stagnation. Your consumption of content outweighs what you produce."
            }
            Diagnosis::ExposedEffort => {
                "Warning: exposed effort. Your energy is drained by reacting to others."
            }
            Diagnosis::Fragmentation => {
                "Warning: fragmentation. Your effort is individual and does not serve a larger goal."
            }
            Diagnosis::Balanced => "Balanced: keep to your current course.",
        }
    }

    /// Recommended actions, in the order they should be presented.
    pub fn actions(&self) -> &'static [&'static str] {
        match self {
            Diagnosis::Stagnation => &[
                "Block out one focused deep-work session today and finish a postponed task.",
                "Cut passive browsing: no feeds for the next 24 hours.",
            ],
            Diagnosis::ExposedEffort => &[
                "Stop replying to arguments and comment threads.",
                "Write one original piece that states your own idea.",
            ],
            Diagnosis::Fragmentation => &[
                "Find a collaborator to share the work with.",
                "Re-anchor your tasks to one stated objective.",
            ],
            Diagnosis::Balanced => &[
                "Mentor someone who is still finding their rhythm.",
                "Write down the approach that worked so you can repeat it.",
            ],
        }
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered decision chain: effectiveness problems dominate immunity problems,
/// which dominate cohesion problems. Comparisons are strict.
pub fn diagnose(effectiveness: f64, immunity: f64, cohesion: f64, config: &ScoringConfig) -> Diagnosis {
    let threshold = config.threshold;
    if effectiveness < threshold {
        Diagnosis::Stagnation
    } else if immunity < threshold {
        Diagnosis::ExposedEffort
    } else if cohesion < threshold {
        Diagnosis::Fragmentation
    } else {
        Diagnosis::Balanced
    }
}

/// Actions attached to a verdict under the given config.
pub fn actions_for(diagnosis: Diagnosis, config: &ScoringConfig) -> Vec<String> {
    if diagnosis == Diagnosis::Balanced && !config.balanced_guidance {
        return Vec::new();
    }
    diagnosis.actions().iter().map(|a| a.to_string()).collect()
}
