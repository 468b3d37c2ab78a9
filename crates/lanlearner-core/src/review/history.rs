//! Append-only review ledger kept on every card.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// What happened at a review event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Remembered,
    Forgot,
    /// Manual "reset progress"; never produced by a review outcome.
    Reset,
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewAction::Remembered => "remembered",
            ReviewAction::Forgot => "forgot",
            ReviewAction::Reset => "reset",
        }
    }
}

impl std::str::FromStr for ReviewAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remembered" => Ok(ReviewAction::Remembered),
            "forgot" => Ok(ReviewAction::Forgot),
            "reset" => Ok(ReviewAction::Reset),
            other => Err(format!("unknown review action: {other}")),
        }
    }
}

impl std::fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stage transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLog {
    pub date: Timestamp,
    pub action: ReviewAction,
    pub stage_before: i64,
    pub stage_after: i64,
}

/// Ordered review ledger. Insertion order is chronological order.
///
/// Callers outside the crate can read it but not change it; entries are only
/// appended by the review state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewHistory(Vec<ReviewLog>);

/// Aggregate counts over a card's history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub total: usize,
    pub remembered: usize,
    pub forgot: usize,
    pub resets: usize,
    pub last_reviewed_at: Option<Timestamp>,
}

impl HistorySummary {
    /// Share of remembered outcomes among remembered/forgot events.
    pub fn retention(&self) -> Option<f64> {
        let judged = self.remembered + self.forgot;
        if judged == 0 {
            None
        } else {
            Some(self.remembered as f64 / judged as f64)
        }
    }
}

impl ReviewHistory {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub(crate) fn append(&mut self, entry: ReviewLog) {
        self.0.push(entry);
    }

    pub fn entries(&self) -> &[ReviewLog] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReviewLog> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&ReviewLog> {
        self.0.last()
    }

    pub fn summary(&self) -> HistorySummary {
        let mut summary = HistorySummary {
            total: self.0.len(),
            last_reviewed_at: self.0.last().map(|e| e.date),
            ..HistorySummary::default()
        };
        for entry in &self.0 {
            match entry.action {
                ReviewAction::Remembered => summary.remembered += 1,
                ReviewAction::Forgot => summary.forgot += 1,
                ReviewAction::Reset => summary.resets += 1,
            }
        }
        summary
    }
}

impl From<Vec<ReviewLog>> for ReviewHistory {
    /// Rebuild a ledger read back from storage.
    fn from(entries: Vec<ReviewLog>) -> Self {
        Self(entries)
    }
}

impl<'a> IntoIterator for &'a ReviewHistory {
    type Item = &'a ReviewLog;
    type IntoIter = std::slice::Iter<'a, ReviewLog>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(date: Timestamp, action: ReviewAction, before: i64, after: i64) -> ReviewLog {
        ReviewLog {
            date,
            action,
            stage_before: before,
            stage_after: after,
        }
    }

    #[test]
    fn serializes_as_plain_array() {
        let mut history = ReviewHistory::new();
        history.append(log(5, ReviewAction::Remembered, 0, 1));
        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "date": 5,
                "action": "remembered",
                "stageBefore": 0,
                "stageAfter": 1
            }])
        );
    }

    #[test]
    fn summary_counts_actions() {
        let mut history = ReviewHistory::new();
        history.append(log(1, ReviewAction::Remembered, 0, 1));
        history.append(log(2, ReviewAction::Remembered, 1, 2));
        history.append(log(3, ReviewAction::Forgot, 2, 0));
        history.append(log(4, ReviewAction::Reset, 0, 0));

        let summary = history.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.remembered, 2);
        assert_eq!(summary.forgot, 1);
        assert_eq!(summary.resets, 1);
        assert_eq!(summary.last_reviewed_at, Some(4));
        let retention = summary.retention().unwrap();
        assert!((retention - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_history_has_no_retention() {
        assert_eq!(ReviewHistory::new().summary().retention(), None);
    }

    #[test]
    fn action_parses_from_wire_names() {
        assert_eq!("forgot".parse::<ReviewAction>(), Ok(ReviewAction::Forgot));
        assert!("maybe".parse::<ReviewAction>().is_err());
        assert_eq!(ReviewAction::Reset.to_string(), "reset");
    }
}
