// # Migration Engine
//
// Moves a guest's words into an authenticated user's durable collection.
//
// ## Algorithm
//
// 1. Read the guest collection. Empty or absent → no-op.
// 2. For each word, in stored order, save it remotely through
//    `RemoteWords::save`: absent → inserted, present → skipped (the user's
//    copy wins).
// 3. Clear the guest collection once the loop completes, however many
//    inserts succeeded, so nothing is ever migrated twice.
// 4. Per-word failures are logged and recorded, never raised.
//
// ## Trigger Points
//
// Sign-in completing, sign-up completing with a confirmed identity, and
// every authenticated "page load" where a guest id is still present. Running
// on an empty guest collection is a cheap no-op, so duplicate triggers are
// harmless and no lock is taken.

use crate::local_store::LocalWordStore;
use crate::model::{GuestId, Session};
use crate::remote::RemoteWords;

/// What happened to one guest word
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Inserted into the user's collection
    Migrated,
    /// The user already had this word; the guest copy was discarded
    Skipped,
    /// The insert (or its existence check) failed
    Failed(String),
}

/// Per-item summary of one migration run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// `(lowercase word, outcome)` in processing order
    pub items: Vec<(String, MigrationOutcome)>,
    /// Whether the guest collection was cleared
    pub cleared: bool,
}

impl MigrationReport {
    pub fn migrated(&self) -> usize {
        self.count(|o| matches!(o, MigrationOutcome::Migrated))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, MigrationOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, MigrationOutcome::Failed(_)))
    }

    /// True when there was nothing to migrate
    pub fn is_noop(&self) -> bool {
        self.items.is_empty()
    }

    fn count(&self, pred: impl Fn(&MigrationOutcome) -> bool) -> usize {
        self.items.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Guest → user word migration
#[derive(Clone)]
pub struct MigrationEngine {
    local: LocalWordStore,
    remote: RemoteWords,
}

impl MigrationEngine {
    pub fn new(local: LocalWordStore, remote: RemoteWords) -> Self {
        Self { local, remote }
    }

    /// Migrate every word of `guest_id` into the session user's collection
    ///
    /// Never fails. The returned report describes each word; callers may
    /// ignore it.
    pub async fn migrate(&self, guest_id: &GuestId, session: &Session) -> MigrationReport {
        let words = match self.local.load(guest_id).await {
            Ok(words) => words,
            Err(e) => {
                tracing::warn!(guest_id = %guest_id, "Could not read guest words, migration skipped: {}", e);
                return MigrationReport::default();
            }
        };

        if words.is_empty() {
            tracing::debug!(guest_id = %guest_id, "No guest words to migrate");
            return MigrationReport::default();
        }

        let mut report = MigrationReport::default();
        for word in &words {
            let outcome = match self.remote.save(Some(session), word).await {
                Ok(true) => MigrationOutcome::Migrated,
                Ok(false) => MigrationOutcome::Skipped,
                Err(e) => {
                    tracing::warn!(word = %word.word, "Failed to migrate guest word: {}", e);
                    MigrationOutcome::Failed(e.to_string())
                }
            };
            report.items.push((word.key(), outcome));
        }

        match self.local.clear(guest_id).await {
            Ok(()) => report.cleared = true,
            Err(e) => tracing::warn!(guest_id = %guest_id, "Failed to clear guest words after migration: {}", e),
        }

        tracing::info!(
            user_id = %session.user_id(),
            migrated = report.migrated(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Guest migration finished"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counters() {
        let report = MigrationReport {
            items: vec![
                ("a".into(), MigrationOutcome::Migrated),
                ("b".into(), MigrationOutcome::Skipped),
                ("c".into(), MigrationOutcome::Failed("boom".into())),
                ("d".into(), MigrationOutcome::Migrated),
            ],
            cleared: true,
        };
        assert_eq!(report.migrated(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_noop());
        assert!(MigrationReport::default().is_noop());
    }
}
