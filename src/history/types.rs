use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::error::HistoryError;
use crate::scoring::ScoreResult;

/// Row timestamp layout, local wall-clock time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column names of a persisted row, in order.
pub const ROW_HEADER: [&str; 6] = [
    "display_name",
    "timestamp",
    "effectiveness",
    "immunity",
    "cohesion",
    "diagnosis_text",
];

/// Check a display name before it becomes the first cell of a row.
/// Control characters (tabs, newlines) would split TSV output and tabular rows.
pub fn check_display_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("must not be blank".to_string());
    }
    if name.chars().any(char::is_control) {
        return Err("must not contain control characters such as tabs or newlines".to_string());
    }
    Ok(())
}

/// One persisted analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub display_name: String,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub effectiveness: f64,
    pub immunity: f64,
    pub cohesion: f64,
    pub diagnosis_text: String,
}

impl HistoryRecord {
    pub fn from_result(display_name: &str, result: &ScoreResult, at: NaiveDateTime) -> Self {
        Self {
            display_name: display_name.to_string(),
            // Rows carry whole seconds only
            timestamp: at.with_nanosecond(0).unwrap_or(at),
            effectiveness: result.effectiveness,
            immunity: result.immunity,
            cohesion: result.cohesion,
            diagnosis_text: result.diagnosis_text().to_string(),
        }
    }

    /// Stamp a result with the current local time.
    pub fn now(display_name: &str, result: &ScoreResult) -> Self {
        Self::from_result(display_name, result, Local::now().naive_local())
    }

    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Six ordered text cells. `f64` Display is locale independent, so the
    /// decimal separator is always `.`.
    pub fn to_row(&self) -> [String; 6] {
        [
            self.display_name.clone(),
            self.formatted_timestamp(),
            self.effectiveness.to_string(),
            self.immunity.to_string(),
            self.cohesion.to_string(),
            self.diagnosis_text.clone(),
        ]
    }

    /// Parse six text cells. Anything off-format is rejected as-is.
    pub fn from_row(row: &[String]) -> Result<Self, HistoryError> {
        if row.len() != ROW_HEADER.len() {
            return Err(HistoryError::MalformedRow(format!(
                "expected {} cells, got {}",
                ROW_HEADER.len(),
                row.len()
            )));
        }

        let display_name = row[0].trim();
        if display_name.is_empty() {
            return Err(HistoryError::MalformedRow("empty display_name".to_string()));
        }

        let timestamp = NaiveDateTime::parse_from_str(row[1].trim(), TIMESTAMP_FORMAT)
            .map_err(|e| HistoryError::MalformedRow(format!("timestamp '{}': {}", row[1], e)))?;

        Ok(Self {
            display_name: display_name.to_string(),
            timestamp,
            effectiveness: parse_decimal("effectiveness", &row[2])?,
            immunity: parse_decimal("immunity", &row[3])?,
            cohesion: parse_decimal("cohesion", &row[4])?,
            diagnosis_text: row[5].clone(),
        })
    }

    /// True for a header row a spreadsheet may return ahead of the data.
    pub fn is_header_row(row: &[String]) -> bool {
        row.first().map(|c| c.trim()) == Some(ROW_HEADER[0])
    }
}

fn parse_decimal(column: &str, cell: &str) -> Result<f64, HistoryError> {
    let value: f64 = cell
        .trim()
        .parse()
        .map_err(|_| HistoryError::MalformedRow(format!("{} '{}' is not a decimal number", column, cell)))?;
    if !value.is_finite() {
        return Err(HistoryError::MalformedRow(format!("{} '{}' is not finite", column, cell)));
    }
    Ok(value)
}

/// On-disk document of the local backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryLog {
    pub version: u32,
    #[serde(default)]
    pub records: Vec<HistoryRecord>,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryLog {
    pub const VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            records: Vec::new(),
        }
    }

    pub fn append(&mut self, record: HistoryRecord) {
        self.records.push(record);
    }
}

mod timestamp_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Diagnosis;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn sample_result() -> ScoreResult {
        ScoreResult {
            effectiveness: 86.2,
            immunity: 25.41,
            cohesion: 100.0,
            diagnosis: Diagnosis::ExposedEffort,
            actions: vec![],
        }
    }

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_display_name_check() {
        assert!(check_display_name("amina").is_ok());
        assert!(check_display_name("Amina Y.").is_ok());
        assert!(check_display_name("  ").is_err());
        assert!(check_display_name("ami\tna").is_err());
        assert!(check_display_name("amina\n").is_err());
        assert!(check_display_name("a\u{1b}[31m").is_err());
    }

    #[test]
    fn test_to_row_layout() {
        let record = HistoryRecord::from_result("amina", &sample_result(), at(8, 5, 3));
        let row = record.to_row();
        assert_eq!(row[0], "amina");
        assert_eq!(row[1], "2024-03-09 08:05:03");
        assert_eq!(row[2], "86.2");
        assert_eq!(row[3], "25.41");
        assert_eq!(row[4], "100");
        assert_eq!(row[5], Diagnosis::ExposedEffort.headline());
    }

    #[test]
    fn test_from_row_parses_decimal_point() {
        let row = cells(&["amina", "2024-03-09 08:05:03", "86.2", "25.41", "100", "ok"]);
        let record = HistoryRecord::from_row(&row).unwrap();
        assert_eq!(record.effectiveness, 86.2);
        assert_eq!(record.timestamp, at(8, 5, 3));
    }

    #[test]
    fn test_from_row_rejects_decimal_comma() {
        let row = cells(&["amina", "2024-03-09 08:05:03", "86,2", "25.41", "100", "ok"]);
        let err = HistoryRecord::from_row(&row).unwrap_err();
        assert!(err.to_string().contains("effectiveness"));
    }

    #[test]
    fn test_from_row_rejects_wrong_arity() {
        let row = cells(&["amina", "2024-03-09 08:05:03", "86.2"]);
        assert!(HistoryRecord::from_row(&row).is_err());
    }

    #[test]
    fn test_from_row_rejects_bad_timestamp() {
        let row = cells(&["amina", "09/03/2024 08:05", "86.2", "25.41", "100", "ok"]);
        assert!(HistoryRecord::from_row(&row).is_err());
    }

    #[test]
    fn test_header_row_detection() {
        let header: Vec<String> = ROW_HEADER.iter().map(|s| s.to_string()).collect();
        assert!(HistoryRecord::is_header_row(&header));
        assert!(!HistoryRecord::is_header_row(&cells(&["amina"])));
    }

    #[test]
    fn test_json_uses_row_timestamp_format() {
        let record = HistoryRecord::from_result("amina", &sample_result(), at(23, 59, 1));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["timestamp"], "2024-03-09 23:59:01");
        let back: HistoryRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_sub_second_precision_dropped() {
        let precise = at(8, 5, 3).with_nanosecond(750_000_000).unwrap();
        let record = HistoryRecord::from_result("amina", &sample_result(), precise);
        assert_eq!(record.timestamp, at(8, 5, 3));
    }

    #[test]
    fn test_new_log_empty() {
        let log = HistoryLog::new();
        assert_eq!(log.version, 1);
        assert!(log.records.is_empty());
    }
}
