//! Persistence seam between the application and its storage backend.

use crate::card::{Card, TagData};
use crate::collection::Library;
use crate::error::Result;

/// Load/save at explicit lifecycle points. The scheduling core never calls
/// this; callers load once, mutate a [`Library`] in memory, then persist.
pub trait CardRepository {
    /// Read the whole library in stored order.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be read.
    fn load_library(&self) -> Result<Library>;

    /// Replace everything stored with `library`, atomically.
    ///
    /// # Errors
    /// Returns an error if the write fails; nothing is changed in that case.
    fn save_library(&self, library: &Library) -> Result<()>;

    /// Upsert one card. A new card is stored at `position`; an existing card
    /// keeps its place.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    fn save_card(&self, card: &Card, position: usize) -> Result<()>;

    /// # Errors
    /// Returns an error if the write fails.
    fn delete_card(&self, id: &str) -> Result<()>;

    /// # Errors
    /// Returns an error if the write fails.
    fn save_tags(&self, tags: &[TagData]) -> Result<()>;
}
