use chrono::{Local, NaiveDateTime};

use crate::scoring::{InputRecord, ScoreResult};

/// One computed analysis together with the input it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub input: InputRecord,
    pub result: ScoreResult,
    pub computed_at: NaiveDateTime,
}

/// Per-user interaction state. Each transition returns a new value.
///
/// Recording a fresh analysis resets the saved flag, so an old save never
/// stands in for a newer result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    last: Option<Analysis>,
    saved: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, input: InputRecord, result: ScoreResult) -> Session {
        self.record_at(input, result, Local::now().naive_local())
    }

    pub fn record_at(
        &self,
        input: InputRecord,
        result: ScoreResult,
        computed_at: NaiveDateTime,
    ) -> Session {
        Session {
            last: Some(Analysis {
                input,
                result,
                computed_at,
            }),
            saved: false,
        }
    }

    pub fn last(&self) -> Option<&Analysis> {
        self.last.as_ref()
    }

    pub fn last_result(&self) -> Option<&ScoreResult> {
        self.last.as_ref().map(|a| &a.result)
    }

    /// No-op when there is nothing to save.
    pub fn mark_saved(&self) -> Session {
        Session {
            last: self.last.clone(),
            saved: self.last.is_some(),
        }
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }
}
