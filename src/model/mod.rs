pub mod local_task;
pub mod remote_issue;
pub mod report;
