use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use super::IssueSource;
use crate::config::AppConfig;
use crate::error::RemoteError;
use crate::model::remote_issue::RemoteIssue;
use crate::util::adf::extract_text_from_adf;

const SEARCH_JQL: &str = "assignee = currentUser() AND status != Done";
const ISSUE_FIELDS: &str = "summary,description,status,assignee";
const PAGE_SIZE: usize = 50;

/// Jira Cloud REST v3 client authenticated with an email and API token.
pub struct JiraClient {
    base_url: String,
    auth_header: String,
    client: reqwest::Client,
}

impl JiraClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let creds = format!("{}:{}", config.jira_username, config.jira_token);
        let encoded = base64::engine::general_purpose::STANDARD.encode(creds);
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build Jira HTTP client")?;
        Ok(Self {
            base_url: config.jira_url.trim_end_matches('/').to_string(),
            auth_header: format!("Basic {encoded}"),
            client,
        })
    }

    fn search_url(&self, start_at: usize) -> String {
        format!(
            "{}/rest/api/3/search?jql={}&startAt={start_at}&maxResults={PAGE_SIZE}&fields={ISSUE_FIELDS}",
            self.base_url,
            urlencoding::encode(SEARCH_JQL)
        )
    }

    fn issue_url(&self, key: &str) -> String {
        format!(
            "{}/rest/api/3/issue/{}?fields={ISSUE_FIELDS}",
            self.base_url,
            urlencoding::encode(key)
        )
    }

    fn assignee_url(&self, key: &str) -> String {
        format!(
            "{}/rest/api/3/issue/{}/assignee",
            self.base_url,
            urlencoding::encode(key)
        )
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<JiraIssue>,
    #[serde(default)]
    start_at: usize,
    total: Option<usize>,
}

#[derive(Deserialize)]
struct JiraIssue {
    key: String,
    fields: IssueFields,
}

#[derive(Deserialize)]
struct IssueFields {
    summary: Option<String>,
    description: Option<serde_json::Value>,
    status: Option<StatusField>,
    assignee: Option<UserField>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusField {
    name: String,
    status_category: Option<StatusCategory>,
}

#[derive(Deserialize)]
struct StatusCategory {
    key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserField {
    email_address: Option<String>,
}

impl StatusField {
    fn is_terminal(&self) -> bool {
        match &self.status_category {
            Some(cat) => cat.key.eq_ignore_ascii_case("done"),
            None => self.name.eq_ignore_ascii_case("done"),
        }
    }
}

impl From<JiraIssue> for RemoteIssue {
    fn from(issue: JiraIssue) -> Self {
        let description = issue
            .fields
            .description
            .as_ref()
            .and_then(extract_text_from_adf)
            .unwrap_or_default();

        RemoteIssue {
            key: issue.key,
            title: issue.fields.summary.unwrap_or_default(),
            description,
            assignee_email: issue.fields.assignee.and_then(|a| a.email_address),
            is_open: !issue.fields.status.is_some_and(|s| s.is_terminal()),
        }
    }
}

async fn error_body(resp: reqwest::Response) -> String {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if body.trim().is_empty() {
        status.to_string()
    } else {
        format!("{status}: {}", body.trim())
    }
}

#[async_trait]
impl IssueSource for JiraClient {
    fn name(&self) -> &str {
        "Jira"
    }

    async fn list_assigned_open_issues(&self) -> Result<Vec<RemoteIssue>, RemoteError> {
        let mut issues = Vec::new();
        let mut start_at = 0;

        loop {
            let url = self.search_url(start_at);
            debug!("GET {url}");
            let resp = self
                .client
                .get(&url)
                .header("Authorization", &self.auth_header)
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(|e| RemoteError::Query(format!("request failed: {e}")))?;

            if !resp.status().is_success() {
                return Err(RemoteError::Query(error_body(resp).await));
            }

            let page: SearchResponse = resp
                .json()
                .await
                .map_err(|e| RemoteError::Query(format!("failed to parse response: {e}")))?;

            let fetched = page.issues.len();
            issues.extend(page.issues.into_iter().map(RemoteIssue::from));
            start_at = page.start_at + fetched;

            let exhausted = match page.total {
                Some(total) => start_at >= total,
                None => fetched < PAGE_SIZE,
            };
            if fetched == 0 || exhausted {
                break;
            }
        }

        Ok(issues)
    }

    async fn get_issue(&self, key: &str) -> Result<RemoteIssue, RemoteError> {
        let url = self.issue_url(key);
        debug!("GET {url}");
        let resp = self
            .client
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| RemoteError::Item {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        match resp.status() {
            StatusCode::NOT_FOUND => return Err(RemoteError::NotFound(key.to_string())),
            s if !s.is_success() => {
                return Err(RemoteError::Item {
                    key: key.to_string(),
                    reason: error_body(resp).await,
                })
            }
            _ => {}
        }

        let issue: JiraIssue = resp.json().await.map_err(|e| RemoteError::Item {
            key: key.to_string(),
            reason: format!("failed to parse response: {e}"),
        })?;
        Ok(issue.into())
    }

    async fn unassign(&self, key: &str) -> Result<(), RemoteError> {
        let url = self.assignee_url(key);
        debug!("PUT {url}");
        let resp = self
            .client
            .put(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .json(&serde_json::json!({ "accountId": null }))
            .send()
            .await
            .map_err(|e| RemoteError::Item {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        match resp.status() {
            StatusCode::NOT_FOUND => Err(RemoteError::NotFound(key.to_string())),
            s if s.is_success() => Ok(()),
            _ => Err(RemoteError::Item {
                key: key.to_string(),
                reason: error_body(resp).await,
            }),
        }
    }
}
