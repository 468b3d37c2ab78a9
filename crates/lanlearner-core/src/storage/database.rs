//! SQLite-based card storage.
//!
//! Provides persistent storage for:
//! - Cards, in collection order, with their scheduling fields as columns
//! - The append-only review ledger of every card
//! - The tag registry
//! - Key-value store for application state

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use super::migrations;
use super::repository::CardRepository;
use crate::card::{Card, ContentBlock, TagData};
use crate::collection::{CardCollection, Library};
use crate::error::{DatabaseError, Result};
use crate::review::{ReviewAction, ReviewLog};

/// Card fields the database does not index, stored as one JSON column.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPayload {
    #[serde(default)]
    blocks: Vec<ContentBlock>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    remark: String,
    #[serde(default)]
    linked_card_ids: Vec<String>,
}

/// SQLite database holding the card library.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/lanlearner/lanlearner.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("lanlearner.db"))
    }

    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened card database");
        Self::init(conn)
    }

    /// Open an in-memory database (for tests).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(DatabaseError::from)?;
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    fn load_logs(&self) -> Result<HashMap<String, Vec<ReviewLog>>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT card_id, date, action, stage_before, stage_after
                 FROM review_logs
                 ORDER BY card_id, seq",
            )
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })
            .map_err(DatabaseError::from)?;

        let mut logs: HashMap<String, Vec<ReviewLog>> = HashMap::new();
        for row in rows {
            let (card_id, date, action, stage_before, stage_after) =
                row.map_err(DatabaseError::from)?;
            let action = action.parse::<ReviewAction>().map_err(|message| DatabaseError::CorruptRow {
                table: "review_logs".into(),
                message,
            })?;
            logs.entry(card_id).or_default().push(ReviewLog {
                date,
                action,
                stage_before,
                stage_after,
            });
        }
        Ok(logs)
    }

    fn load_tags(&self) -> Result<Vec<TagData>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, is_pinned FROM tags ORDER BY position")
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TagData {
                    name: row.get(0)?,
                    is_pinned: row.get::<_, i64>(1)? != 0,
                })
            })
            .map_err(DatabaseError::from)?;
        let tags = rows
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(DatabaseError::from)?;
        Ok(tags)
    }
}

fn write_card(conn: &Connection, card: &Card, position: usize) -> Result<()> {
    let payload = StoredPayload {
        blocks: card.blocks.clone(),
        tags: card.tags.clone(),
        remark: card.remark.clone(),
        linked_card_ids: card.linked_card_ids.clone(),
    };
    let payload = serde_json::to_string(&payload)?;
    conn.execute(
        "INSERT INTO cards
            (id, position, title, payload, stage, next_review_date, review_count, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            payload = excluded.payload,
            stage = excluded.stage,
            next_review_date = excluded.next_review_date,
            review_count = excluded.review_count,
            updated_at = excluded.updated_at",
        params![
            card.id,
            position as i64,
            card.title,
            payload,
            card.stage(),
            card.next_review_date(),
            card.review_count(),
            card.created_at,
            card.updated_at,
        ],
    )
    .map_err(DatabaseError::from)?;

    // Ledger entries never change once written, so only new ones land.
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO review_logs
                (card_id, seq, date, action, stage_before, stage_after)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(DatabaseError::from)?;
    for (seq, entry) in card.history().iter().enumerate() {
        stmt.execute(params![
            card.id,
            seq as i64,
            entry.date,
            entry.action.as_str(),
            entry.stage_before,
            entry.stage_after,
        ])
        .map_err(DatabaseError::from)?;
    }
    Ok(())
}

fn write_tags(conn: &Connection, tags: &[TagData]) -> Result<()> {
    conn.execute("DELETE FROM tags", []).map_err(DatabaseError::from)?;
    for (position, tag) in tags.iter().enumerate() {
        conn.execute(
            "INSERT INTO tags (name, position, is_pinned) VALUES (?1, ?2, ?3)",
            params![tag.name, position as i64, tag.is_pinned],
        )
        .map_err(DatabaseError::from)?;
    }
    Ok(())
}

impl CardRepository for Database {
    fn load_library(&self) -> Result<Library> {
        let mut logs = self.load_logs()?;
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, title, payload, stage, next_review_date, review_count, created_at, updated_at
                 FROM cards
                 ORDER BY position",
            )
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, u64>(5)?,
                    row.get::<_, i64>(6)?,
                    row.get::<_, i64>(7)?,
                ))
            })
            .map_err(DatabaseError::from)?;

        let mut cards = CardCollection::new();
        for row in rows {
            let (id, title, payload, stage, next_review_date, review_count, created_at, updated_at) =
                row.map_err(DatabaseError::from)?;
            let payload: StoredPayload =
                serde_json::from_str(&payload).map_err(|e| DatabaseError::CorruptRow {
                    table: "cards".into(),
                    message: format!("{id}: {e}"),
                })?;
            let history = logs.remove(&id).unwrap_or_default();

            let mut card = Card::new(title, created_at)
                .with_id(id)
                .with_persisted_schedule(stage, next_review_date, review_count, history);
            card.blocks = payload.blocks;
            card.tags = payload.tags;
            card.remark = payload.remark;
            card.linked_card_ids = payload.linked_card_ids;
            card.updated_at = updated_at;

            if let Err(e) = card.validate() {
                tracing::warn!(error = %e, "stored card violates invariants; scheduling defensively");
            }
            cards.push(card)?;
        }

        let tags = self.load_tags()?;
        tracing::info!(cards = cards.len(), tags = tags.len(), "loaded library");
        Ok(Library::new(cards, tags))
    }

    fn save_library(&self, library: &Library) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(DatabaseError::from)?;
        tx.execute_batch("DELETE FROM review_logs; DELETE FROM cards;")
            .map_err(DatabaseError::from)?;
        for (position, card) in library.cards.iter().enumerate() {
            write_card(&tx, card, position)?;
        }
        write_tags(&tx, &library.tags)?;
        tx.commit().map_err(DatabaseError::from)?;
        tracing::info!(cards = library.cards.len(), "saved library");
        Ok(())
    }

    fn save_card(&self, card: &Card, position: usize) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(DatabaseError::from)?;
        write_card(&tx, card, position)?;
        tx.commit().map_err(DatabaseError::from)?;
        tracing::debug!(card_id = %card.id, "saved card");
        Ok(())
    }

    fn delete_card(&self, id: &str) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(DatabaseError::from)?;
        tx.execute("DELETE FROM review_logs WHERE card_id = ?1", params![id])
            .map_err(DatabaseError::from)?;
        tx.execute("DELETE FROM cards WHERE id = ?1", params![id])
            .map_err(DatabaseError::from)?;
        tx.commit().map_err(DatabaseError::from)?;
        Ok(())
    }

    fn save_tags(&self, tags: &[TagData]) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(DatabaseError::from)?;
        write_tags(&tx, tags)?;
        tx.commit().map_err(DatabaseError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::ReviewOutcome;

    fn library() -> Library {
        let mut lib = Library::default();
        lib.add_card(Card::new("first", 0).with_id("a").with_text("#english hello"))
            .unwrap();
        lib.add_card(Card::new("second", 10).with_id("b").with_remark("note"))
            .unwrap();
        lib.cards.apply_review("a", ReviewOutcome::Remembered, 86_400_000).unwrap();
        lib.cards.apply_review("a", ReviewOutcome::Forgot, 90_000_000).unwrap();
        lib
    }

    #[test]
    fn save_and_load_roundtrip() {
        let db = Database::open_memory().unwrap();
        let lib = library();
        db.save_library(&lib).unwrap();
        let loaded = db.load_library().unwrap();
        assert_eq!(loaded, lib);
    }

    #[test]
    fn save_card_updates_in_place() {
        let db = Database::open_memory().unwrap();
        let mut lib = library();
        db.save_library(&lib).unwrap();

        let updated = lib
            .cards
            .apply_review("b", ReviewOutcome::Remembered, 100)
            .unwrap()
            .clone();
        db.save_card(&updated, 99).unwrap();

        let loaded = db.load_library().unwrap();
        assert_eq!(loaded, lib);
        let ids: Vec<&str> = loaded.cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn delete_card_removes_history() {
        let db = Database::open_memory().unwrap();
        db.save_library(&library()).unwrap();
        db.delete_card("a").unwrap();
        let loaded = db.load_library().unwrap();
        assert!(loaded.cards.get("a").is_none());
        let orphaned: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM review_logs WHERE card_id = 'a'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(orphaned, 0);
    }

    #[test]
    fn tags_keep_order_and_pins() {
        let db = Database::open_memory().unwrap();
        let tags = vec![
            TagData { name: "z".into(), is_pinned: true },
            TagData::new("a"),
        ];
        db.save_tags(&tags).unwrap();
        assert_eq!(db.load_library().unwrap().tags, tags);
    }

    #[test]
    fn duplicate_tag_names_fail_without_partial_write() {
        let db = Database::open_memory().unwrap();
        let tags = vec![TagData::new("a")];
        db.save_tags(&tags).unwrap();

        let dup = vec![TagData::new("b"), TagData { name: "b".into(), is_pinned: true }];
        assert!(db.save_tags(&dup).is_err());
        assert_eq!(db.load_library().unwrap().tags, tags);
    }

    #[test]
    fn corrupt_action_is_reported() {
        let db = Database::open_memory().unwrap();
        db.save_library(&library()).unwrap();
        db.conn()
            .execute("UPDATE review_logs SET action = 'shrug' WHERE seq = 0", [])
            .unwrap();
        assert!(db.load_library().is_err());
    }
}
