//! Behavioural Contract Test: Guest → User Migration
//!
//! Constraints verified:
//! - Empty guest collection is a no-op that touches nothing remote
//! - The user's existing word wins over the guest copy
//! - The guest collection is cleared even when some inserts fail
//! - Re-running a finished migration is a no-op
//!
//! If this test fails, signing in can lose or duplicate guest words.

mod common;

use common::*;
use mywords_core::migration::{MigrationEngine, MigrationOutcome};
use mywords_core::{GuestId, LocalWordStore, MemoryDeviceStorage, RemoteWords};
use std::sync::Arc;

struct Fixture {
    local: LocalWordStore,
    remote_store: InMemoryRemoteStore,
    engine: MigrationEngine,
    guest: GuestId,
}

fn fixture() -> Fixture {
    let local = LocalWordStore::new(Arc::new(MemoryDeviceStorage::new()));
    let remote_store = InMemoryRemoteStore::new();
    let engine = MigrationEngine::new(
        local.clone(),
        RemoteWords::new(Arc::new(remote_store.clone())),
    );
    Fixture {
        local,
        remote_store,
        engine,
        guest: GuestId::new("guest-1700000000000-abcdefghijklm"),
    }
}

#[tokio::test]
async fn empty_guest_collection_is_noop() {
    let f = fixture();
    f.remote_store.seed("u1", word_at("dog", "canine", 5));

    let report = f.engine.migrate(&f.guest, &session_for("u1")).await;

    assert!(report.is_noop());
    assert_eq!(f.remote_store.find_call_count(), 0);
    assert_eq!(f.remote_store.insert_call_count(), 0);
    assert_eq!(f.remote_store.rows_for("u1").len(), 1);
}

#[tokio::test]
async fn existing_user_word_wins_conflict() {
    let f = fixture();
    f.local
        .save(&f.guest, &word_at("cat", "guest meaning", 1))
        .await
        .unwrap();
    f.remote_store.seed("u1", word_at("cat", "X", 10));

    let report = f.engine.migrate(&f.guest, &session_for("u1")).await;

    assert_eq!(report.skipped(), 1);
    let rows = f.remote_store.rows_for("u1");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].meaning, "X");
    assert!(f.local.is_empty(&f.guest).await.unwrap());
}

#[tokio::test]
async fn guest_collection_cleared_despite_failed_insert() {
    let f = fixture();
    for (i, w) in ["alpha", "beta", "gamma"].iter().enumerate() {
        f.local
            .save(&f.guest, &word_at(w, "m", i as i64))
            .await
            .unwrap();
    }
    f.remote_store.reject_insert_of("beta");

    let report = f.engine.migrate(&f.guest, &session_for("u1")).await;

    assert_eq!(report.migrated(), 2);
    assert_eq!(report.failed(), 1);
    assert!(report.cleared);
    assert!(f.local.is_empty(&f.guest).await.unwrap());

    let mut remote: Vec<String> = f
        .remote_store
        .rows_for("u1")
        .into_iter()
        .map(|w| w.word)
        .collect();
    remote.sort();
    assert_eq!(remote, vec!["alpha", "gamma"]);
}

#[tokio::test]
async fn total_outage_still_clears_and_never_raises() {
    let f = fixture();
    f.local.save(&f.guest, &word_at("cat", "m", 0)).await.unwrap();
    f.remote_store.fail_everything(true);

    let report = f.engine.migrate(&f.guest, &session_for("u1")).await;

    assert!(matches!(report.items[0].1, MigrationOutcome::Failed(_)));
    assert!(f.local.is_empty(&f.guest).await.unwrap());
}

#[tokio::test]
async fn rerun_after_migration_is_noop() {
    let f = fixture();
    f.local.save(&f.guest, &word_at("cat", "m", 0)).await.unwrap();

    let first = f.engine.migrate(&f.guest, &session_for("u1")).await;
    let inserts = f.remote_store.insert_call_count();
    let second = f.engine.migrate(&f.guest, &session_for("u1")).await;

    assert_eq!(first.migrated(), 1);
    assert!(second.is_noop());
    assert_eq!(f.remote_store.insert_call_count(), inserts);
    assert_eq!(f.remote_store.rows_for("u1").len(), 1);
}

#[tokio::test]
async fn migrated_words_keep_their_fields() {
    let f = fixture();
    let mut word = mywords_core::Word::new("cat", "feline")
        .with_created_at(at_millis(1_700_000_000_123))
        .with_phonetic("/kæt/");
    word.status = mywords_core::WordStatus::Learned;
    f.local.save(&f.guest, &word).await.unwrap();

    f.engine.migrate(&f.guest, &session_for("u1")).await;

    let rows = f.remote_store.rows_for("u1");
    assert_eq!(rows[0].phonetic.as_deref(), Some("/kæt/"));
    assert_eq!(rows[0].status, mywords_core::WordStatus::Learned);
    assert_eq!(rows[0].created_at, word.created_at);
}
