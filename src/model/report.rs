use std::fmt;

/// Counters for one run, logged once at the end.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub already_present: usize,
    pub completed: usize,
    pub unassigned: usize,
    pub not_assigned_to_user: usize,
    pub failures: usize,
}

impl SyncReport {
    pub fn merge(&mut self, other: SyncReport) {
        self.created += other.created;
        self.already_present += other.already_present;
        self.completed += other.completed;
        self.unassigned += other.unassigned;
        self.not_assigned_to_user += other.not_assigned_to_user;
        self.failures += other.failures;
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created={} already_present={} completed={} unassigned={} skipped_unassign={} failures={}",
            self.created,
            self.already_present,
            self.completed,
            self.unassigned,
            self.not_assigned_to_user,
            self.failures
        )
    }
}
