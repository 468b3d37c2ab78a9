//! On-disk persistence and backup round trips.

use lanlearner_core::transfer::{export_backup, import_backup};
use lanlearner_core::{
    Card, CardEdit, CardRepository, ContentBlock, Database, Library, ReviewOutcome,
};
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;

const DAY_MS: i64 = 86_400_000;

fn populated_library() -> Library {
    let mut lib = Library::default();
    for i in 0..12 {
        lib.add_card(
            Card::new(format!("card {i}"), i * 1_000)
                .with_id(format!("id-{i}"))
                .with_text(format!("body {i} #deck{}", i % 3)),
        )
        .unwrap();
    }
    for i in 0..12 {
        let id = format!("id-{i}");
        for r in 0..(i % 7) {
            let outcome = if r == 3 { ReviewOutcome::Forgot } else { ReviewOutcome::Remembered };
            lib.cards.apply_review(&id, outcome, (r + 1) * DAY_MS).unwrap();
        }
    }
    lib
}

#[test]
fn database_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lanlearner.db");
    let lib = populated_library();
    {
        let db = Database::open_at(&path).unwrap();
        db.save_library(&lib).unwrap();
    }
    let db = Database::open_at(&path).unwrap();
    assert_eq!(db.load_library().unwrap(), lib);
}

#[test]
fn review_then_save_card_persists_only_that_card() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lanlearner.db");
    let db = Database::open_at(&path).unwrap();
    let mut lib = populated_library();
    db.save_library(&lib).unwrap();

    let position = lib.cards.position("id-4").unwrap();
    let card = lib
        .cards
        .apply_review("id-4", ReviewOutcome::Remembered, 50 * DAY_MS)
        .unwrap()
        .clone();
    db.save_card(&card, position).unwrap();

    let reloaded = db.load_library().unwrap();
    assert_eq!(reloaded, lib);
}

#[test]
fn edits_and_tags_roundtrip_through_backup_and_database() {
    let mut lib = populated_library();
    lib.edit_card(
        "id-0",
        CardEdit {
            blocks: Some(vec![
                ContentBlock::text("edited #fresh"),
                ContentBlock::image("data:image/png;base64,iVBORw0KGgo="),
            ]),
            remark: Some("remark".into()),
            ..CardEdit::default()
        },
        99 * DAY_MS,
    )
    .unwrap();
    lib.set_tag_pinned("fresh", true).unwrap();

    let mut buf = Vec::new();
    export_backup(&lib, 100 * DAY_MS, &mut buf).unwrap();
    let imported = import_backup(buf.as_slice()).unwrap();
    assert_eq!(imported, lib);

    let db = Database::open_memory().unwrap();
    db.save_library(&imported).unwrap();
    assert_eq!(db.load_library().unwrap(), lib);
}

#[test]
fn seeded_daily_sample_is_stable_after_reload() {
    let db = Database::open_memory().unwrap();
    let lib = populated_library();
    db.save_library(&lib).unwrap();
    let reloaded = db.load_library().unwrap();

    let pick = |l: &Library| -> Vec<String> {
        let mut rng = Mcg128Xsl64::seed_from_u64(2024);
        l.cards
            .daily_sample(10, &mut rng)
            .iter()
            .map(|c| c.id.clone())
            .collect()
    };
    assert_eq!(pick(&lib), pick(&reloaded));
    assert_eq!(pick(&lib).len(), 10);
}
