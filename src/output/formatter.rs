use std::io::IsTerminal;
use chrono::{Duration, NaiveDateTime};
use owo_colors::OwoColorize;
use serde::Serialize;
use terminal_size::{Width, terminal_size};

use crate::history::{HistoryRecord, LeaderboardEntry};
use crate::scoring::{Diagnosis, ScoreBreakdown, ScoreResult, SCORE_MAX};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score with at most two decimals and no trailing zeros
/// ("86.2", "45", "57.33").
pub fn format_score(score: f64) -> String {
    let formatted = format!("{:.2}", score);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Horizontal gauge for a 0-100 score, `width` cells wide.
pub fn score_bar(score: f64, width: usize) -> String {
    let ratio = (score / SCORE_MAX).clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

const BAR_WIDTH: usize = 20;

/// Multi-line report: one gauge per axis, then the verdict and its actions.
pub fn format_result(result: &ScoreResult, threshold: f64, use_colors: bool) -> String {
    let mut lines = Vec::new();

    for (label, score) in result.axes() {
        let bar = score_bar(score, BAR_WIDTH);
        let value = format!("{:>6}", format_score(score));
        let line = if use_colors {
            let bar = if score < threshold {
                bar.red().to_string()
            } else {
                bar.green().to_string()
            };
            format!("{:<14}{}  {}", label, value.bold(), bar)
        } else {
            format!("{:<14}{}  {}", label, value, bar)
        };
        lines.push(line);
    }

    lines.push(String::new());
    let headline = result.diagnosis_text();
    if use_colors {
        match result.diagnosis {
            Diagnosis::Balanced => lines.push(headline.green().bold().to_string()),
            _ => lines.push(headline.yellow().bold().to_string()),
        }
    } else {
        lines.push(headline.to_string());
    }

    for action in &result.actions {
        lines.push(format!("  - {}", action));
    }

    lines.join("\n")
}

/// The intermediate values behind a result, one per line.
pub fn format_breakdown(breakdown: &ScoreBreakdown) -> String {
    [
        ("raw points", breakdown.raw_points),
        ("quality factor", breakdown.quality_factor),
        ("gained", breakdown.gained),
        ("time tax", breakdown.time_tax),
        ("engagement", breakdown.engagement_total),
        ("independence", breakdown.independence_ratio),
        ("team multiplier", breakdown.team_multiplier),
    ]
    .iter()
    .map(|(name, value)| format!("  {:<16}{}", name, format_score(*value)))
    .collect::<Vec<_>>()
    .join("\n")
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    result: &'a ScoreResult,
    diagnosis_text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    breakdown: Option<&'a ScoreBreakdown>,
}

/// Pretty JSON for `analyze --json`.
pub fn format_result_json(
    result: &ScoreResult,
    breakdown: Option<&ScoreBreakdown>,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        result,
        diagnosis_text: result.diagnosis_text(),
        breakdown,
    })
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
pub fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Stored rows, newest last, one per line:
/// "{age}  {name}  {eff}  {imm}  {coh}  {diagnosis}"
pub fn format_history_table(
    records: &[HistoryRecord],
    now: NaiveDateTime,
    use_colors: bool,
) -> String {
    if records.is_empty() {
        return "No saved results.".to_string();
    }

    let name_width = records
        .iter()
        .map(|r| r.display_name.chars().count())
        .max()
        .unwrap_or(0)
        .min(20);
    let term_width = get_terminal_width();

    records
        .iter()
        .map(|record| {
            let age = format!("{:>4}", format_age(now - record.timestamp));
            let name = format!(
                "{:<width$}",
                truncate_name(&record.display_name, name_width),
                width = name_width
            );
            let scores = format!(
                "{:>6} {:>6} {:>6}",
                format_score(record.effectiveness),
                format_score(record.immunity),
                format_score(record.cohesion)
            );

            let fixed = age.len() + name_width + scores.len() + 6;
            let diagnosis = match term_width {
                Some(width) if width > fixed + 10 => {
                    truncate_name(&record.diagnosis_text, width - fixed)
                }
                Some(_) => truncate_name(&record.diagnosis_text, 20),
                None => record.diagnosis_text.clone(),
            };

            if use_colors {
                format!("{}  {}  {}  {}", age.dimmed(), name.cyan(), scores.bold(), diagnosis)
            } else {
                format!("{}  {}  {}  {}", age, name, scores, diagnosis)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Stored rows as tab-separated values, in the persisted six-column order
/// (no headers, no colors).
pub fn format_tsv(records: &[HistoryRecord]) -> String {
    records
        .iter()
        .map(|record| record.to_row().join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ranked list: " 1.  amina   86.2  (4 saved)"
pub fn format_leaderboard(entries: &[LeaderboardEntry], use_colors: bool) -> String {
    if entries.is_empty() {
        return "No saved results.".to_string();
    }

    let name_width = entries
        .iter()
        .map(|e| e.display_name.chars().count())
        .max()
        .unwrap_or(0)
        .min(24);

    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let index = format!("{:>2}.", idx + 1);
            let name = format!(
                "{:<width$}",
                truncate_name(&entry.display_name, name_width),
                width = name_width
            );
            let score = format!("{:>6}", format_score(entry.best_effectiveness));
            let saved = format!("({} saved)", entry.submissions);
            if use_colors {
                format!("{} {}  {}  {}", index.dimmed(), name, score.bold(), saved.dimmed())
            } else {
                format!("{} {}  {}  {}", index, name, score, saved)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}
