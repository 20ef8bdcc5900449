pub mod error;
pub mod leaderboard;
pub mod local;
pub mod remote;
pub mod store;
pub mod types;

pub use error::HistoryError;
pub use leaderboard::{leaderboard, LeaderboardEntry, DEFAULT_TOP};
pub use local::{append_record, default_history_path, load_history, save_history};
pub use remote::RemoteStore;
pub use store::HistoryStore;
pub use types::{check_display_name, HistoryLog, HistoryRecord, ROW_HEADER, TIMESTAMP_FORMAT};
