//! Statblock Store Tests
//!
//! Upsert-by-name, lookup, listing, duplication and deletion.

use crate::database::{
    get_current_version, SortField, SortOrder, StatblockFilter, StatblockOps, StoreError,
    UpsertAction, SCHEMA_VERSION, SEARCH_LIMIT,
};
use crate::statblock::ChallengeRating;
use crate::tests::common::{create_test_db, sample_statblock};

// =============================================================================
// Upsert
// =============================================================================

#[tokio::test]
async fn test_upsert_creates_then_updates_by_name() {
    let (db, _temp) = create_test_db().await;

    let mut first = sample_statblock("Owlbear", "monstrosity", 3);
    first.hp = 59;
    let created = db
        .upsert_statblock(&first)
        .await
        .expect("Failed to create statblock");
    assert_eq!(created.action, UpsertAction::Created);
    assert!(created.previous.is_none());

    let mut second = sample_statblock("owlbear", "monstrosity", 3);
    second.hp = 70;
    let updated = db
        .upsert_statblock(&second)
        .await
        .expect("Failed to update statblock");
    assert_eq!(updated.action, UpsertAction::Updated);
    assert_eq!(updated.record.id, created.record.id);
    assert_eq!(updated.record.created_at, created.record.created_at);

    let previous = updated.previous.expect("update should report the previous row");
    assert_eq!(previous.statblock().expect("Failed to decode").hp, 59);

    assert_eq!(db.count_statblocks().await.expect("Failed to count"), 1);
    let stored = db
        .get_statblock(&created.record.id)
        .await
        .expect("Failed to get statblock")
        .expect("statblock should exist");
    assert_eq!(stored.statblock().expect("Failed to decode").hp, 70);
    assert_eq!(stored.name, "owlbear");
}

#[tokio::test]
async fn test_upsert_rejects_blank_name() {
    let (db, _temp) = create_test_db().await;
    let mut statblock = sample_statblock("Ghost", "undead", 4);
    statblock.name = "   ".to_string();

    let err = db.upsert_statblock(&statblock).await.unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
    assert_eq!(db.count_statblocks().await.expect("Failed to count"), 0);
}

#[tokio::test]
async fn test_update_keeps_custom_type() {
    let (db, _temp) = create_test_db().await;
    let created = db
        .upsert_statblock(&sample_statblock("Wight", "undead", 3))
        .await
        .expect("Failed to create statblock");

    db.set_custom_type(&created.record.id, Some("Boss"))
        .await
        .expect("Failed to set custom type");

    let updated = db
        .upsert_statblock(&sample_statblock("Wight", "undead", 4))
        .await
        .expect("Failed to update statblock");
    assert_eq!(updated.record.custom_type.as_deref(), Some("Boss"));
    assert_eq!(updated.record.challenge_rating, 4.0);
}

// =============================================================================
// Lookup
// =============================================================================

#[tokio::test]
async fn test_find_by_name_is_case_insensitive() {
    let (db, _temp) = create_test_db().await;
    db.upsert_statblock(&sample_statblock("Young Red Dragon", "dragon", 10))
        .await
        .expect("Failed to create statblock");

    let found = db
        .find_statblock_by_name("YOUNG RED DRAGON")
        .await
        .expect("Failed to find statblock")
        .expect("statblock should match");
    assert_eq!(found.name, "Young Red Dragon");

    assert!(db
        .find_statblock_by_name("Young Red")
        .await
        .expect("Failed to find statblock")
        .is_none());
    assert!(db
        .get_statblock("missing-id")
        .await
        .expect("Failed to get statblock")
        .is_none());
}

// =============================================================================
// Listing and Search
// =============================================================================

#[tokio::test]
async fn test_list_filters_and_sorting() {
    let (db, _temp) = create_test_db().await;
    for (name, creature_type, cr) in [
        ("Zombie", "undead", 1),
        ("Ghoul", "undead", 1),
        ("Owlbear", "monstrosity", 3),
        ("Lich", "undead", 21),
    ] {
        db.upsert_statblock(&sample_statblock(name, creature_type, cr))
            .await
            .expect("Failed to create statblock");
    }

    let all = db
        .list_statblocks(&StatblockFilter::default())
        .await
        .expect("Failed to list statblocks");
    let names: Vec<_> = all.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Ghoul", "Lich", "Owlbear", "Zombie"]);

    let undead = db
        .list_statblocks(&StatblockFilter {
            creature_type: Some("UNDEAD".to_string()),
            sort_by: SortField::ChallengeRating,
            order: SortOrder::Desc,
            ..Default::default()
        })
        .await
        .expect("Failed to list statblocks");
    let names: Vec<_> = undead.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Lich", "Ghoul", "Zombie"]);

    let cr_one = db
        .list_statblocks(&StatblockFilter {
            challenge_rating: Some(ChallengeRating::from(1).value()),
            ..Default::default()
        })
        .await
        .expect("Failed to list statblocks");
    assert_eq!(cr_one.len(), 2);

    let query = db
        .list_statblocks(&StatblockFilter {
            query: Some("owl".to_string()),
            ..Default::default()
        })
        .await
        .expect("Failed to list statblocks");
    assert_eq!(query.len(), 1);
    assert_eq!(query[0].name, "Owlbear");
}

#[tokio::test]
async fn test_list_query_matches_tags() {
    let (db, _temp) = create_test_db().await;
    let mut tagged = sample_statblock("Bandit Captain", "humanoid", 2);
    tagged.tags = vec!["Homebrew".to_string()];
    db.upsert_statblock(&tagged)
        .await
        .expect("Failed to create statblock");
    db.upsert_statblock(&sample_statblock("Bandit", "humanoid", 1))
        .await
        .expect("Failed to create statblock");

    let found = db
        .list_statblocks(&StatblockFilter {
            query: Some("homebrew".to_string()),
            ..Default::default()
        })
        .await
        .expect("Failed to list statblocks");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Bandit Captain");
}

#[tokio::test]
async fn test_list_query_treats_wildcards_literally() {
    let (db, _temp) = create_test_db().await;
    db.upsert_statblock(&sample_statblock("Goblin", "humanoid", 1))
        .await
        .expect("Failed to create statblock");

    let found = db
        .list_statblocks(&StatblockFilter {
            query: Some("%".to_string()),
            ..Default::default()
        })
        .await
        .expect("Failed to list statblocks");
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_search_is_limited() {
    let (db, _temp) = create_test_db().await;
    for i in 0..(SEARCH_LIMIT + 3) {
        db.upsert_statblock(&sample_statblock(&format!("Skeleton {:02}", i), "undead", 1))
            .await
            .expect("Failed to create statblock");
    }

    let results = db
        .search_statblocks("skeleton")
        .await
        .expect("Failed to search statblocks");
    assert_eq!(results.len() as i64, SEARCH_LIMIT);
    assert_eq!(results[0].name, "Skeleton 00");
}

// =============================================================================
// Custom Type, Duplicate, Delete
// =============================================================================

#[tokio::test]
async fn test_set_custom_type() {
    let (db, _temp) = create_test_db().await;
    let created = db
        .upsert_statblock(&sample_statblock("Mimic", "monstrosity", 2))
        .await
        .expect("Failed to create statblock");

    let record = db
        .set_custom_type(&created.record.id, Some("  Trap  "))
        .await
        .expect("Failed to set custom type");
    assert_eq!(record.custom_type.as_deref(), Some("Trap"));

    let record = db
        .set_custom_type(&created.record.id, Some(""))
        .await
        .expect("Failed to clear custom type");
    assert!(record.custom_type.is_none());

    let err = db.set_custom_type("missing-id", Some("Trap")).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_duplicate_names_copies() {
    let (db, _temp) = create_test_db().await;
    let created = db
        .upsert_statblock(&sample_statblock("Orc", "humanoid", 1))
        .await
        .expect("Failed to create statblock");

    let first = db
        .duplicate_statblock(&created.record.id)
        .await
        .expect("Failed to duplicate statblock");
    assert_eq!(first.name, "Orc (Copy)");
    assert_ne!(first.id, created.record.id);
    assert_eq!(first.source, "custom");
    assert_eq!(first.statblock().expect("Failed to decode").name, "Orc (Copy)");

    let second = db
        .duplicate_statblock(&created.record.id)
        .await
        .expect("Failed to duplicate statblock");
    assert_eq!(second.name, "Orc (Copy 2)");

    assert_eq!(db.count_statblocks().await.expect("Failed to count"), 3);

    let err = db.duplicate_statblock("missing-id").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_statblock() {
    let (db, _temp) = create_test_db().await;
    let created = db
        .upsert_statblock(&sample_statblock("Kobold", "humanoid", 1))
        .await
        .expect("Failed to create statblock");

    assert!(db
        .delete_statblock(&created.record.id)
        .await
        .expect("Failed to delete statblock"));
    assert!(!db
        .delete_statblock(&created.record.id)
        .await
        .expect("Failed to delete statblock"));
    assert_eq!(db.count_statblocks().await.expect("Failed to count"), 0);
}

// =============================================================================
// Schema
// =============================================================================

#[tokio::test]
async fn test_migrations_reach_current_version() {
    let (db, temp) = create_test_db().await;
    let version = get_current_version(db.pool())
        .await
        .expect("Failed to read schema version");
    assert_eq!(version, SCHEMA_VERSION);
    assert!(db.path().starts_with(temp.path()));
}
