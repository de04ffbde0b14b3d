use std::path::PathBuf;

use clap::Parser;

use crate::sync::Direction;

/// Keep Jira issues assigned to you in step with a Things 3 project.
#[derive(Debug, Parser)]
#[command(name = "jira-things", version)]
pub struct Cli {
    /// Config file (defaults to ~/.jira-things/config.toml)
    #[arg(long, env = "JIRA_THINGS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Which passes to run
    #[arg(long, value_enum, default_value_t = Direction::Both)]
    pub direction: Direction,

    /// Log the changes a run would make without applying them
    #[arg(long)]
    pub dry_run: bool,

    /// Log requests and scripts
    #[arg(short, long)]
    pub verbose: bool,
}
