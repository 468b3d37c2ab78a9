//! # Lanlearner Core Library
//!
//! This library provides the core logic for Lanlearner, a personal flashcard
//! application with fixed-interval ("Ebbinghaus") spaced repetition. All
//! operations are available through the standalone CLI binary; any other
//! front end is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Review**: pure scheduling core. Interval table, next-due computation,
//!   per-card review transitions, due-set and daily-sample selection, and the
//!   append-only review ledger
//! - **Collection**: keyed, order-preserving card store with replace-by-id
//!   updates
//! - **Storage**: SQLite card repository and TOML-based configuration
//! - **Transfer**: lossless backup import/export and readable CSV export
//!
//! ## Key Components
//!
//! - [`record_review`]: the review state machine
//! - [`calculate_next_review`]: next-due computation
//! - [`CardCollection`]: where reviews are applied
//! - [`Database`]: the [`CardRepository`] implementation
//! - [`Config`]: application configuration management

pub mod card;
pub mod collection;
pub mod error;
pub mod review;
pub mod storage;
pub mod time;
pub mod transfer;

pub use card::{BlockType, Card, ContentBlock, TableData, TagData};
pub use collection::{CardCollection, CardEdit, CollectionStats, Library};
pub use error::{ConfigError, CoreError, DatabaseError, TransferError, ValidationError};
pub use review::{
    calculate_next_review, interval_hours_for_stage, record_review, reset_progress,
    select_daily_sample, select_due, HistorySummary, ReviewAction, ReviewHistory, ReviewLog,
    ReviewOutcome, DEFAULT_DAILY_SAMPLE, MAX_STAGE,
};
pub use storage::{CardRepository, Config, Database};
pub use time::Timestamp;
