//! Fixed Ebbinghaus interval table.
//!
//! Index `i` is the wait, in hours, after a card reaches stage `i` before it
//! comes due again: 1 day, 2 days, 1 week, 30 days, 165 days. Stage
//! [`MAX_STAGE`] is terminal and has no entry.

/// Hours to wait after reaching each stage below [`MAX_STAGE`].
pub const INTERVAL_HOURS: [i64; 5] = [24, 48, 168, 720, 3960];

/// Terminal ("mastered") stage.
pub const MAX_STAGE: i64 = INTERVAL_HOURS.len() as i64;

/// Interval used for stages the table does not cover.
pub const FALLBACK_INTERVAL_HOURS: i64 = 24;

/// Wait time in hours for a card sitting at `stage`.
///
/// Never fails: stages outside `0..MAX_STAGE` (only reachable through
/// corrupted records) get [`FALLBACK_INTERVAL_HOURS`].
pub fn interval_hours_for_stage(stage: i64) -> i64 {
    usize::try_from(stage)
        .ok()
        .and_then(|idx| INTERVAL_HOURS.get(idx))
        .copied()
        .unwrap_or_else(|| {
            tracing::warn!(stage, "stage outside interval table, using fallback interval");
            FALLBACK_INTERVAL_HOURS
        })
}

/// Whether `stage` is a legal persisted value.
pub fn is_valid_stage(stage: i64) -> bool {
    (0..=MAX_STAGE).contains(&stage)
}
