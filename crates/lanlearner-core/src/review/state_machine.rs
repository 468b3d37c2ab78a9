//! Per-card review transitions.
//!
//! Every transition builds a complete new [`Card`] value (stage, due date,
//! count and history together) and hands it back; nothing is observable until
//! the caller swaps it into the collection.

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::time::Timestamp;

use super::history::{ReviewAction, ReviewLog};
use super::intervals::MAX_STAGE;
use super::scheduler::calculate_next_review;

/// The user's judgement on one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOutcome {
    Remembered,
    Forgot,
}

impl ReviewOutcome {
    /// Stage reached from `stage_before`. Forgetting is a full reset.
    pub fn next_stage(&self, stage_before: i64) -> i64 {
        match self {
            ReviewOutcome::Remembered => (stage_before + 1).min(MAX_STAGE),
            ReviewOutcome::Forgot => 0,
        }
    }
}

impl From<ReviewOutcome> for ReviewAction {
    fn from(outcome: ReviewOutcome) -> Self {
        match outcome {
            ReviewOutcome::Remembered => ReviewAction::Remembered,
            ReviewOutcome::Forgot => ReviewAction::Forgot,
        }
    }
}

/// Apply one review event to `card` at `event_time`.
///
/// `event_time` is not checked against earlier history entries. A persisted
/// stage outside `0..=MAX_STAGE` is clamped first so the result is always in
/// range.
pub fn record_review(card: &Card, outcome: ReviewOutcome, event_time: Timestamp) -> Card {
    let stage_before = card.stage.clamp(0, MAX_STAGE);
    let stage_after = outcome.next_stage(stage_before);
    tracing::debug!(
        card_id = %card.id,
        ?outcome,
        stage_before,
        stage_after,
        "recording review"
    );
    transition(card, ReviewAction::from(outcome), stage_before, stage_after, event_time)
}

/// Manual "reset progress": back to stage 0 with a `reset` ledger entry.
///
/// Counts as a review event so `history.len() == review_count` still holds.
pub fn reset_progress(card: &Card, event_time: Timestamp) -> Card {
    let stage_before = card.stage.clamp(0, MAX_STAGE);
    tracing::debug!(card_id = %card.id, stage_before, "resetting progress");
    transition(card, ReviewAction::Reset, stage_before, 0, event_time)
}

fn transition(
    card: &Card,
    action: ReviewAction,
    stage_before: i64,
    stage_after: i64,
    event_time: Timestamp,
) -> Card {
    let mut next = card.clone();
    next.stage = stage_after;
    next.next_review_date = calculate_next_review(stage_after, event_time);
    next.review_count = card.review_count + 1;
    next.history.append(ReviewLog {
        date: event_time,
        action,
        stage_before,
        stage_after,
    });
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembered_advances_one_stage() {
        let card = Card::new("t", 0);
        let next = record_review(&card, ReviewOutcome::Remembered, 86_400_000);
        assert_eq!(next.stage(), 1);
        assert_eq!(next.next_review_date(), 259_200_000);
        assert_eq!(next.review_count(), 1);
        let entry = next.history().last().unwrap();
        assert_eq!(entry.action, ReviewAction::Remembered);
        assert_eq!((entry.stage_before, entry.stage_after), (0, 1));
        assert_eq!(entry.date, 86_400_000);
    }

    #[test]
    fn input_card_is_untouched() {
        let card = Card::new("t", 0);
        let _ = record_review(&card, ReviewOutcome::Remembered, 5);
        assert_eq!(card.stage(), 0);
        assert_eq!(card.review_count(), 0);
        assert!(card.history().is_empty());
    }

    #[test]
    fn forgot_resets_to_zero() {
        let card = Card::new("t", 0).with_persisted_schedule(4, 0, 0, Vec::new());
        let next = record_review(&card, ReviewOutcome::Forgot, 1_000);
        assert_eq!(next.stage(), 0);
        assert_eq!(next.next_review_date(), 1_000 + 86_400_000);
        assert_eq!(next.history().last().unwrap().stage_before, 4);
    }

    #[test]
    fn remembered_at_max_stays_at_max() {
        let card = Card::new("t", 0).with_persisted_schedule(5, 0, 0, Vec::new());
        let next = record_review(&card, ReviewOutcome::Remembered, 0);
        assert_eq!(next.stage(), 5);
        assert_eq!(next.next_review_date(), 31_536_000_000);
    }

    #[test]
    fn corrupt_stage_is_clamped() {
        let card = Card::new("t", 0).with_persisted_schedule(-4, 0, 0, Vec::new());
        let next = record_review(&card, ReviewOutcome::Remembered, 0);
        assert_eq!(next.stage(), 1);
        assert_eq!(next.history().last().unwrap().stage_before, 0);

        let card = Card::new("t", 0).with_persisted_schedule(99, 0, 0, Vec::new());
        let next = record_review(&card, ReviewOutcome::Remembered, 0);
        assert_eq!(next.stage(), 5);
    }

    #[test]
    fn earlier_event_time_is_accepted() {
        let card = Card::new("t", 0);
        let a = record_review(&card, ReviewOutcome::Remembered, 1_000_000);
        let b = record_review(&a, ReviewOutcome::Remembered, 10);
        assert_eq!(b.next_review_date(), 10 + 168 * 3_600_000);
        assert_eq!(b.history().len(), 2);
    }

    #[test]
    fn reset_logs_reset_action() {
        let card = Card::new("t", 0);
        let card = record_review(&card, ReviewOutcome::Remembered, 0);
        let card = record_review(&card, ReviewOutcome::Remembered, 0);
        let reset = reset_progress(&card, 500);
        assert_eq!(reset.stage(), 0);
        assert_eq!(reset.review_count(), 3);
        assert_eq!(reset.history().len(), 3);
        assert_eq!(reset.next_review_date(), 500 + 86_400_000);
        let entry = reset.history().last().unwrap();
        assert_eq!(entry.action, ReviewAction::Reset);
        assert_eq!((entry.stage_before, entry.stage_after), (2, 0));
    }

    #[test]
    fn payload_survives_transition() {
        let card = Card::new("title", 0).with_text("body").with_tags(["x"]);
        let next = record_review(&card, ReviewOutcome::Forgot, 9);
        assert_eq!(next.id, card.id);
        assert_eq!(next.title, "title");
        assert_eq!(next.blocks, card.blocks);
        assert_eq!(next.tags, card.tags);
        assert_eq!(next.updated_at, card.updated_at);
    }

    #[test]
    fn review_count_has_no_u32_ceiling() {
        let start = u64::from(u32::MAX);
        let card = Card::new("t", 0).with_persisted_schedule(1, 0, start, Vec::new());
        let next = record_review(&card, ReviewOutcome::Remembered, 1);
        assert_eq!(next.review_count(), start + 1);
        let next = reset_progress(&next, 2);
        assert_eq!(next.review_count(), start + 2);
    }
}
