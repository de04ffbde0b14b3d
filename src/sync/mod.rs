//! Two one-way passes that converge Jira assignment and Things to-dos.
//!
//! Nothing is cached between runs. Each pass snapshots both sides, diffs the
//! key sets and applies the smallest set of mutations. Per-item failures are
//! logged and counted; only snapshot failures abort the run.
//!
//! Runs must not overlap: two concurrent pulls can both pass the existence
//! check and create the same to-do twice.

use std::collections::BTreeMap;

use clap::ValueEnum;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{RemoteError, SyncError};
use crate::identity;
use crate::local::TaskStore;
use crate::model::remote_issue::RemoteIssue;
use crate::model::report::SyncReport;
use crate::remote::IssueSource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    /// Pull, then push.
    #[default]
    Both,
    /// Jira to Things only.
    Pull,
    /// Things to Jira only.
    Push,
}

pub struct Reconciler<'a> {
    remote: &'a dyn IssueSource,
    local: &'a dyn TaskStore,
    config: &'a AppConfig,
    dry_run: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new(remote: &'a dyn IssueSource, local: &'a dyn TaskStore, config: &'a AppConfig) -> Self {
        Self {
            remote,
            local,
            config,
            dry_run: false,
        }
    }

    /// Log the mutations a run would make without applying them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self, direction: Direction) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();
        if matches!(direction, Direction::Both | Direction::Pull) {
            report.merge(self.pull().await?);
        }
        if matches!(direction, Direction::Both | Direction::Push) {
            report.merge(self.push().await?);
        }
        Ok(report)
    }

    /// Remote to local: create to-dos for newly assigned issues and complete
    /// to-dos whose issue is no longer assigned and open.
    pub async fn pull(&self) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();

        let local_open = self
            .local
            .list_open_annotated_keys()
            .await
            .map_err(SyncError::LocalSnapshot)?;

        let remote_open: BTreeMap<String, RemoteIssue> = self
            .remote
            .list_assigned_open_issues()
            .await?
            .into_iter()
            .filter(|issue| issue.is_open)
            .map(|issue| (issue.key.clone(), issue))
            .collect();

        info!(
            "pull: {} assigned issues, {} open to-dos",
            remote_open.len(),
            local_open.len()
        );

        for issue in remote_open.values() {
            if !local_open.contains(&issue.key) {
                self.create_for(issue, &mut report).await;
            }
        }

        for key in local_open.iter().filter(|k| !remote_open.contains_key(*k)) {
            self.complete_for(key, &mut report).await;
        }

        Ok(report)
    }

    /// Local to remote: unassign issues whose to-do was completed.
    pub async fn push(&self) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();

        let completed = self
            .local
            .list_completed_annotated_keys()
            .await
            .map_err(SyncError::LocalSnapshot)?;

        info!("push: {} completed to-dos", completed.len());

        for key in completed.iter().filter(|k| !k.is_empty()) {
            let issue = match self.remote.get_issue(key).await {
                Ok(issue) => issue,
                Err(RemoteError::NotFound(_)) => {
                    info!("issue {key} no longer exists, skipping");
                    continue;
                }
                Err(e) => {
                    warn!(key = %key, "failed to get issue: {e}");
                    report.failures += 1;
                    continue;
                }
            };

            if !issue.is_assigned_to(&self.config.jira_username) {
                debug!("issue {key} is not assigned to {}", self.config.jira_username);
                report.not_assigned_to_user += 1;
                continue;
            }

            if self.dry_run {
                info!("[dry-run] would unassign issue {key}");
                continue;
            }

            match self.remote.unassign(key).await {
                Ok(()) => {
                    info!("unassigned issue {key}");
                    report.unassigned += 1;
                }
                Err(e) => {
                    warn!(key = %key, "failed to unassign issue: {e}");
                    report.failures += 1;
                }
            }
        }

        Ok(report)
    }

    async fn create_for(&self, issue: &RemoteIssue, report: &mut SyncReport) {
        let key = &issue.key;
        match self.local.find_task_by_key(key).await {
            Ok(true) => {
                debug!("to-do for issue {key} already exists, skipping");
                report.already_present += 1;
                return;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(key = %key, "failed to check for existing to-do: {e}");
                report.failures += 1;
                return;
            }
        }

        let title = task_title(issue);
        if self.dry_run {
            info!("[dry-run] would create to-do {title:?}");
            return;
        }

        let notes = task_notes(&self.config.jira_url, issue);
        match self.local.create_task(&title, &notes).await {
            Ok(()) => {
                info!("created to-do for issue {key}");
                report.created += 1;
            }
            Err(e) => {
                warn!(key = %key, "failed to create to-do: {e}");
                report.failures += 1;
            }
        }
    }

    async fn complete_for(&self, key: &str, report: &mut SyncReport) {
        if self.dry_run {
            info!("[dry-run] would complete to-do for issue {key}");
            return;
        }

        match self.local.complete_task_by_key(key).await {
            Ok(true) => {
                info!("marked to-do for issue {key} as completed");
                report.completed += 1;
            }
            Ok(false) => debug!("no open to-do left for issue {key}"),
            Err(e) => {
                warn!(key = %key, "failed to complete to-do: {e}");
                report.failures += 1;
            }
        }
    }
}

/// Link to the issue in the Jira web UI.
pub fn browse_url(base_url: &str, key: &str) -> String {
    format!("{}/browse/{key}", base_url.trim_end_matches('/'))
}

pub fn task_title(issue: &RemoteIssue) -> String {
    format!("[{}] {}", issue.key, issue.title)
}

/// Longest description copied into a to-do. Things drops notes past 10,000
/// characters, which would cut off the marker at the end.
const MAX_DESCRIPTION_CHARS: usize = 4_000;

/// Deep link and description, annotated with the issue key.
pub fn task_notes(base_url: &str, issue: &RemoteIssue) -> String {
    let mut notes = format!("Jira Issue: {}", browse_url(base_url, &issue.key));
    let description = issue.description.trim();
    if !description.is_empty() {
        notes.push_str("\n\n");
        notes.extend(description.chars().take(MAX_DESCRIPTION_CHARS));
    }
    identity::annotate(&notes, &issue.key)
}
