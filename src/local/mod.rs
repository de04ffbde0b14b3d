pub mod bridge;
pub mod things;

use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::warn;

use crate::error::LocalStoreError;
use crate::identity::{self, KeyLookup};
use crate::model::local_task::LocalTask;

/// The local to-do list as seen by the reconciler. Every operation is scoped
/// to the one configured list.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether any task, in any state, carries the annotation for `key`.
    async fn find_task_by_key(&self, key: &str) -> Result<bool, LocalStoreError>;

    /// Append a task to the list. Not atomic with [`TaskStore::find_task_by_key`].
    async fn create_task(&self, title: &str, notes: &str) -> Result<(), LocalStoreError>;

    /// Keys parsed from every open task that carries a marker.
    async fn list_open_annotated_keys(&self) -> Result<BTreeSet<String>, LocalStoreError>;

    /// Keys parsed from every completed task that carries a marker.
    async fn list_completed_annotated_keys(&self) -> Result<Vec<String>, LocalStoreError>;

    /// Complete the first open task annotated with `key`. Returns whether one
    /// was found.
    async fn complete_task_by_key(&self, key: &str) -> Result<bool, LocalStoreError>;
}

/// Parse keys from task notes in order, dropping duplicates. Tasks with a
/// malformed marker are skipped with a warning.
pub fn annotated_keys<'a>(tasks: impl IntoIterator<Item = &'a LocalTask>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut keys = Vec::new();
    for task in tasks {
        match identity::extract_key(&task.notes) {
            KeyLookup::Absent => {}
            KeyLookup::Malformed(rest) => {
                warn!(task = %task.title, list = %task.list, marker = %rest, "ignoring task with malformed issue marker");
            }
            KeyLookup::Key(key) => {
                if seen.insert(key.clone()) {
                    keys.push(key);
                }
            }
        }
    }
    keys
}
