//! Next-due computation.

use crate::time::{Timestamp, MILLIS_PER_DAY, MILLIS_PER_HOUR};

use super::intervals::{interval_hours_for_stage, MAX_STAGE};

/// How far a mastered card is pushed out. A concrete date rather than a
/// sentinel keeps every `next_review_date` orderable.
pub const MASTERED_DEFER_DAYS: i64 = 365;

/// Timestamp at which a card at `stage` becomes due, counting from
/// `reference` (the moment of the triggering event).
///
/// Pure and total: mastered stages defer by [`MASTERED_DEFER_DAYS`], every
/// other stage (including out-of-range ones) reads the interval table.
pub fn calculate_next_review(stage: i64, reference: Timestamp) -> Timestamp {
    let wait = if stage >= MAX_STAGE {
        MASTERED_DEFER_DAYS * MILLIS_PER_DAY
    } else {
        interval_hours_for_stage(stage) * MILLIS_PER_HOUR
    };
    reference.saturating_add(wait)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_card_is_due_after_a_day() {
        assert_eq!(calculate_next_review(0, 0), 86_400_000);
    }

    #[test]
    fn stage_one_waits_two_days() {
        assert_eq!(calculate_next_review(1, 86_400_000), 259_200_000);
    }

    #[test]
    fn week_and_month_intervals() {
        assert_eq!(calculate_next_review(2, 0), 168 * MILLIS_PER_HOUR);
        assert_eq!(calculate_next_review(3, 0), 30 * MILLIS_PER_DAY);
        assert_eq!(calculate_next_review(4, 0), 165 * MILLIS_PER_DAY);
    }

    #[test]
    fn mastered_defers_one_year() {
        assert_eq!(calculate_next_review(5, 1_000), 1_000 + 31_536_000_000);
        assert_eq!(calculate_next_review(42, 0), 31_536_000_000);
    }

    #[test]
    fn negative_stage_uses_fallback() {
        assert_eq!(calculate_next_review(-3, 10), 10 + 86_400_000);
    }

    #[test]
    fn saturates_at_far_future() {
        assert_eq!(calculate_next_review(5, i64::MAX - 1), i64::MAX);
    }

    #[test]
    fn deterministic() {
        assert_eq!(calculate_next_review(3, 77), calculate_next_review(3, 77));
    }
}
