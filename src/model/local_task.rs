#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Open,
    Completed,
    Canceled,
}

impl TaskStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "open" => Some(TaskStatus::Open),
            "completed" => Some(TaskStatus::Completed),
            "canceled" | "cancelled" => Some(TaskStatus::Canceled),
            _ => None,
        }
    }
}

/// A to-do in the configured local list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTask {
    /// Identifier assigned by the local store.
    pub id: String,
    pub title: String,
    pub notes: String,
    pub status: TaskStatus,
    /// The list (Things project) the task lives in.
    pub list: String,
}

impl LocalTask {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn is_open(&self) -> bool {
        self.status == TaskStatus::Open
    }
}
