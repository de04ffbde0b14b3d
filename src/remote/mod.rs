pub mod jira;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::model::remote_issue::RemoteIssue;

/// The issue tracker as seen by the reconciler.
#[async_trait]
pub trait IssueSource: Send + Sync {
    fn name(&self) -> &str;

    /// Every issue assigned to the configured user that is not done.
    /// Fails with [`RemoteError::Query`] when the listing cannot be read in full.
    async fn list_assigned_open_issues(&self) -> Result<Vec<RemoteIssue>, RemoteError>;

    /// Fails with [`RemoteError::NotFound`] for an unknown key.
    async fn get_issue(&self, key: &str) -> Result<RemoteIssue, RemoteError>;

    /// Clear the assignee. Unassigning an unassigned issue succeeds.
    async fn unassign(&self, key: &str) -> Result<(), RemoteError>;
}
