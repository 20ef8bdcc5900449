pub mod formatter;

pub use formatter::{
    format_age, format_breakdown, format_history_table, format_leaderboard, format_result,
    format_result_json, format_score, format_tsv, score_bar, should_use_colors, truncate_name,
};
