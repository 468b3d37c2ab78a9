//! Backup import/export.
//!
//! A backup is one JSON document with three sections: human-readable rows, the
//! lossless raw card records, and the tag registry. Import only trusts the raw
//! section, so every scheduling field survives a round trip exactly.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::card::{Card, TagData};
use crate::collection::{CardCollection, Library};
use crate::error::{Result, TransferError};
use crate::time::{self, Timestamp};

pub const BACKUP_FORMAT: &str = "lanlearner-backup";
pub const BACKUP_VERSION: u32 = 1;

/// Summary row for people reading the backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadableRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "ContentSummary")]
    pub content_summary: String,
    #[serde(rename = "Tags")]
    pub tags: String,
    #[serde(rename = "Created")]
    pub created: String,
    #[serde(rename = "ReviewStage")]
    pub review_stage: i64,
    #[serde(rename = "NextReview")]
    pub next_review: String,
}

impl From<&Card> for ReadableRow {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id.clone(),
            title: card.title.clone(),
            content_summary: card.content_summary(),
            tags: card.tags.join(", "),
            created: time::to_rfc3339(card.created_at),
            review_stage: card.stage(),
            next_review: time::to_rfc3339(card.next_review_date()),
        }
    }
}

/// Lossless card record: the full card as a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub id: String,
    pub json: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRow {
    pub tag: String,
    #[serde(default)]
    pub is_pinned: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub format: String,
    pub version: u32,
    pub exported_at: Timestamp,
    #[serde(default)]
    pub readable: Vec<ReadableRow>,
    #[serde(default)]
    pub raw: Option<Vec<RawRow>>,
    #[serde(default)]
    pub tags: Vec<TagRow>,
}

impl Backup {
    /// Snapshot `library` at `exported_at`.
    ///
    /// # Errors
    /// Returns an error if a card cannot be serialized.
    pub fn from_library(library: &Library, exported_at: Timestamp) -> Result<Self> {
        let readable = library.cards.iter().map(ReadableRow::from).collect();
        let raw = library
            .cards
            .iter()
            .map(|card| {
                Ok(RawRow {
                    id: card.id.clone(),
                    json: serde_json::to_string(card)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let tags = library
            .tags
            .iter()
            .map(|t| TagRow {
                tag: t.name.clone(),
                is_pinned: u8::from(t.is_pinned),
            })
            .collect();
        Ok(Self {
            format: BACKUP_FORMAT.to_string(),
            version: BACKUP_VERSION,
            exported_at,
            readable,
            raw: Some(raw),
            tags,
        })
    }

    /// Rebuild a library from the raw and tag sections.
    ///
    /// # Errors
    /// Fails on a foreign format, a missing raw section, an undecodable row,
    /// a card that violates the data-model invariants, duplicate card ids or
    /// duplicate tag names.
    pub fn into_library(self) -> Result<Library> {
        if self.format != BACKUP_FORMAT || self.version > BACKUP_VERSION {
            return Err(TransferError::UnsupportedFormat {
                format: self.format,
                version: self.version,
            }
            .into());
        }
        let raw = self.raw.ok_or(TransferError::MissingRawData)?;

        let mut cards = CardCollection::new();
        for row in raw {
            let card: Card =
                serde_json::from_str(&row.json).map_err(|e| TransferError::MalformedRow {
                    id: row.id.clone(),
                    message: e.to_string(),
                })?;
            cards.push(card)?;
        }
        let tags = self
            .tags
            .into_iter()
            .map(|t| TagData {
                name: t.tag,
                is_pinned: t.is_pinned == 1,
            })
            .collect();
        let library = Library::new(cards, tags);
        library.validate()?;
        Ok(library)
    }
}

/// Write a backup of `library` as pretty JSON.
///
/// # Errors
/// Returns an error if serialization or the write fails.
pub fn export_backup<W: Write>(library: &Library, exported_at: Timestamp, writer: W) -> Result<()> {
    let backup = Backup::from_library(library, exported_at)?;
    serde_json::to_writer_pretty(writer, &backup)?;
    tracing::info!(cards = library.cards.len(), "exported backup");
    Ok(())
}

/// Read a backup written by [`export_backup`].
///
/// # Errors
/// See [`Backup::into_library`]; also fails on invalid JSON.
pub fn import_backup<R: Read>(reader: R) -> Result<Library> {
    let backup: Backup = serde_json::from_reader(reader)?;
    let library = backup.into_library()?;
    tracing::info!(
        cards = library.cards.len(),
        tags = library.tags.len(),
        "imported backup"
    );
    Ok(library)
}

/// Write the readable rows as CSV (for spreadsheets; not importable).
///
/// # Errors
/// Returns an error if the CSV writer fails.
pub fn export_readable_csv<W: Write>(library: &Library, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for card in library.cards.iter() {
        csv_writer
            .serialize(ReadableRow::from(card))
            .map_err(TransferError::from)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// File name used for dated backups, e.g. `Lanlearner_Backup_2026-10-17.json`.
pub fn backup_file_name(exported_at: Timestamp) -> String {
    format!(
        "Lanlearner_Backup_{}.json",
        time::format(exported_at, "%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::ContentBlock;
    use crate::error::{CoreError, ValidationError};
    use crate::review::ReviewOutcome;

    fn library() -> Library {
        let mut lib = Library::default();
        lib.add_card(
            Card::new("Mitochondria", 0)
                .with_id("m")
                .with_text("powerhouse #biology")
                .with_block(ContentBlock::table(vec![vec!["a".into(), "b".into()]])),
        )
        .unwrap();
        lib.add_card(Card::new("Ser vs estar", 5).with_id("s")).unwrap();
        lib.cards.apply_review("m", ReviewOutcome::Remembered, 86_400_000).unwrap();
        lib.cards.apply_reset("m", 90_000_000).unwrap();
        lib.set_tag_pinned("biology", true).unwrap();
        lib
    }

    #[test]
    fn backup_roundtrip_is_exact() {
        let lib = library();
        let mut buf = Vec::new();
        export_backup(&lib, 1_000, &mut buf).unwrap();
        let restored = import_backup(buf.as_slice()).unwrap();
        assert_eq!(restored, lib);
    }

    #[test]
    fn readable_rows_summarize_cards() {
        let backup = Backup::from_library(&library(), 0).unwrap();
        let row = backup.readable.iter().find(|r| r.id == "m").unwrap();
        assert_eq!(row.content_summary, "powerhouse #biology [table]");
        assert_eq!(row.tags, "biology");
        assert_eq!(row.review_stage, 0);
        assert_eq!(row.created, "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn missing_raw_section_is_rejected() {
        let json = r#"{"format":"lanlearner-backup","version":1,"exportedAt":0,"readable":[],"tags":[]}"#;
        let err = import_backup(json.as_bytes()).unwrap_err();
        assert!(matches!(err, CoreError::Transfer(TransferError::MissingRawData)));
    }

    #[test]
    fn foreign_format_is_rejected() {
        let json = r#"{"format":"other","version":1,"exportedAt":0,"raw":[]}"#;
        assert!(matches!(
            import_backup(json.as_bytes()),
            Err(CoreError::Transfer(TransferError::UnsupportedFormat { .. }))
        ));
    }

    #[test]
    fn invalid_card_is_rejected() {
        let card = Card::new("bad", 0).with_persisted_schedule(9, 0, 0, Vec::new());
        let backup = Backup {
            format: BACKUP_FORMAT.into(),
            version: BACKUP_VERSION,
            exported_at: 0,
            readable: Vec::new(),
            raw: Some(vec![RawRow {
                id: card.id.clone(),
                json: serde_json::to_string(&card).unwrap(),
            }]),
            tags: Vec::new(),
        };
        assert!(matches!(
            backup.into_library(),
            Err(CoreError::Validation(ValidationError::StageOutOfRange { stage: 9, .. }))
        ));
    }

    #[test]
    fn duplicate_tag_names_are_rejected() {
        let json = r#"{"format":"lanlearner-backup","version":1,"exportedAt":0,"raw":[],
            "tags":[{"tag":"x","isPinned":1},{"tag":"y"},{"tag":"x","isPinned":0}]}"#;
        match import_backup(json.as_bytes()) {
            Err(CoreError::Validation(ValidationError::InvalidValue { field, message })) => {
                assert_eq!(field, "tags");
                assert!(message.contains("duplicate tag: x"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn malformed_row_names_card() {
        let json = r#"{"format":"lanlearner-backup","version":1,"exportedAt":0,
            "raw":[{"id":"x","json":"{not json"}]}"#;
        match import_backup(json.as_bytes()) {
            Err(CoreError::Transfer(TransferError::MalformedRow { id, .. })) => assert_eq!(id, "x"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn csv_has_header_and_rows() {
        let mut buf = Vec::new();
        export_readable_csv(&library(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("ID,Title,ContentSummary,Tags,Created,ReviewStage,NextReview")
        );
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn backup_file_name_is_dated() {
        assert_eq!(backup_file_name(0), "Lanlearner_Backup_1970-01-01.json");
    }
}
