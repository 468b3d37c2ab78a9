//! Spaced-repetition scheduling core.
//!
//! Pure functions over explicit [`Card`](crate::card::Card) values: no I/O, no
//! clock reads, no shared state.

pub mod history;
pub mod intervals;
pub mod scheduler;
pub mod selector;
pub mod state_machine;

pub use history::{HistorySummary, ReviewAction, ReviewHistory, ReviewLog};
pub use intervals::{interval_hours_for_stage, INTERVAL_HOURS, MAX_STAGE};
pub use scheduler::{calculate_next_review, MASTERED_DEFER_DAYS};
pub use selector::{next_due, select_daily_sample, select_due, DEFAULT_DAILY_SAMPLE};
pub use state_machine::{record_review, reset_progress, ReviewOutcome};
