#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteIssue {
    /// Stable issue key, e.g. "PROJ-123".
    pub key: String,
    pub title: String,
    pub description: String,
    pub assignee_email: Option<String>,
    /// False once the workflow status reaches a terminal state.
    pub is_open: bool,
}

impl RemoteIssue {
    /// Whether the issue is assigned to `username`. Emails compare
    /// ASCII case-insensitively.
    pub fn is_assigned_to(&self, username: &str) -> bool {
        self.assignee_email
            .as_deref()
            .is_some_and(|email| email.trim().eq_ignore_ascii_case(username.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(assignee: Option<&str>) -> RemoteIssue {
        RemoteIssue {
            key: "PROJ-1".into(),
            title: "Fix it".into(),
            description: String::new(),
            assignee_email: assignee.map(String::from),
            is_open: true,
        }
    }

    #[test]
    fn assigned_ignores_email_case() {
        assert!(issue(Some("Me@Acme.io")).is_assigned_to("me@acme.io"));
    }

    #[test]
    fn unassigned_is_not_assigned_to_anyone() {
        assert!(!issue(None).is_assigned_to("me@acme.io"));
    }

    #[test]
    fn other_assignee_does_not_match() {
        assert!(!issue(Some("you@acme.io")).is_assigned_to("me@acme.io"));
    }
}
