use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::{debug, info};

use super::bridge::{applescript_string, Bridge, OsaBridge};
use super::{annotated_keys, TaskStore};
use crate::config::AppConfig;
use crate::error::LocalStoreError;
use crate::identity;
use crate::model::local_task::{LocalTask, TaskStatus};

const RECORD_SEP: char = '\u{1e}';
const FIELD_SEP: char = '\u{1f}';

/// Things 3 project driven over AppleScript and the `things:///` URL scheme.
pub struct ThingsStore<B = OsaBridge> {
    project: String,
    bridge: B,
}

impl ThingsStore<OsaBridge> {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_bridge(
            config.things_project.clone(),
            OsaBridge::new(config.request_timeout),
        )
    }
}

impl<B: Bridge> ThingsStore<B> {
    pub fn with_bridge(project: String, bridge: B) -> Self {
        Self { project, bridge }
    }

    /// Every to-do in the project with its id, title, status and notes.
    pub async fn list_tasks(&self) -> Result<Vec<LocalTask>, LocalStoreError> {
        let output = self.bridge.run_script(&self.list_script()).await?;
        parse_listing(&output, &self.project)
    }

    async fn complete_task(&self, id: &str) -> Result<(), LocalStoreError> {
        let script = format!(
            r#"tell application "Things3"
    set status of to do id {} to completed
end tell"#,
            applescript_string(id)
        );
        self.bridge.run_script(&script).await.map(|_| ())
    }

    fn list_script(&self) -> String {
        format!(
            r#"tell application "Things3"
    set rs to character id 30
    set us to character id 31
    set out to ""
    repeat with t in to dos of project {}
        set st to status of t
        if st is completed then
            set s to "completed"
        else if st is canceled then
            set s to "canceled"
        else
            set s to "open"
        end if
        set n to notes of t
        if n is missing value then set n to ""
        set out to out & (id of t) & us & (name of t) & us & s & us & n & rs
    end repeat
    return out
end tell"#,
            applescript_string(&self.project)
        )
    }

    fn add_url(&self, title: &str, notes: &str) -> String {
        format!(
            "things:///add?title={}&notes={}&list={}",
            urlencoding::encode(title),
            urlencoding::encode(notes),
            urlencoding::encode(&self.project)
        )
    }
}

/// Parse the record/field separated output of the listing script.
fn parse_listing(output: &str, project: &str) -> Result<Vec<LocalTask>, LocalStoreError> {
    output
        .split(RECORD_SEP)
        .filter(|record| !record.trim().is_empty())
        .map(|record| {
            let fields: Vec<&str> = record.splitn(4, FIELD_SEP).collect();
            let [id, title, status, notes] = fields.as_slice() else {
                return Err(LocalStoreError::Bridge(format!(
                    "unexpected to-do record from Things: {record:?}"
                )));
            };
            let status = TaskStatus::parse(status).ok_or_else(|| {
                LocalStoreError::Bridge(format!("unknown to-do status {status:?}"))
            })?;
            Ok(LocalTask {
                id: id.trim().to_string(),
                title: title.to_string(),
                notes: notes.to_string(),
                status,
                list: project.to_string(),
            })
        })
        .collect()
}

#[async_trait]
impl<B: Bridge> TaskStore for ThingsStore<B> {
    async fn find_task_by_key(&self, key: &str) -> Result<bool, LocalStoreError> {
        let tasks = self.list_tasks().await?;
        Ok(tasks
            .iter()
            .any(|t| identity::contains_annotation(&t.notes, key)))
    }

    async fn create_task(&self, title: &str, notes: &str) -> Result<(), LocalStoreError> {
        let url = self.add_url(title, notes);
        self.bridge.open_url(&url).await?;
        info!(project = %self.project, "added to-do {title:?}");
        Ok(())
    }

    async fn list_open_annotated_keys(&self) -> Result<BTreeSet<String>, LocalStoreError> {
        let tasks = self.list_tasks().await?;
        Ok(annotated_keys(tasks.iter().filter(|t| t.is_open()))
            .into_iter()
            .collect())
    }

    async fn list_completed_annotated_keys(&self) -> Result<Vec<String>, LocalStoreError> {
        let tasks = self.list_tasks().await?;
        Ok(annotated_keys(tasks.iter().filter(|t| t.is_completed())))
    }

    async fn complete_task_by_key(&self, key: &str) -> Result<bool, LocalStoreError> {
        let tasks = self.list_tasks().await?;
        let Some(task) = tasks
            .iter()
            .find(|t| t.is_open() && identity::contains_annotation(&t.notes, key))
        else {
            debug!("no open to-do annotated with {key}");
            return Ok(false);
        };
        self.complete_task(&task.id).await?;
        Ok(true)
    }
}
