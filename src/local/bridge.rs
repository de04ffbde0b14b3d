use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::LocalStoreError;

/// Automation channel to the desktop application.
#[async_trait]
pub trait Bridge: Send + Sync {
    /// Run an AppleScript and return its stdout without the trailing newline.
    async fn run_script(&self, script: &str) -> Result<String, LocalStoreError>;

    /// Hand a URL to the OS, e.g. to trigger an app's URL scheme.
    async fn open_url(&self, url: &str) -> Result<(), LocalStoreError>;
}

/// macOS bridge: `osascript` for scripting and `open` for URL schemes.
pub struct OsaBridge {
    timeout: Duration,
}

impl OsaBridge {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn run(&self, program: &str, args: &[&str]) -> Result<String, LocalStoreError> {
        let output = tokio::time::timeout(
            self.timeout,
            Command::new(program).args(args).kill_on_drop(true).output(),
        )
        .await
        .map_err(|_| LocalStoreError::Timeout(self.timeout.as_secs()))?
        .map_err(|e| LocalStoreError::Bridge(format!("failed to run {program}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LocalStoreError::Bridge(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .trim_end_matches('\n')
            .to_string())
    }
}

#[async_trait]
impl Bridge for OsaBridge {
    async fn run_script(&self, script: &str) -> Result<String, LocalStoreError> {
        debug!("running AppleScript:\n{script}");
        let out = self.run("osascript", &["-e", script]).await?;
        debug!("AppleScript output: {out:?}");
        Ok(out)
    }

    async fn open_url(&self, url: &str) -> Result<(), LocalStoreError> {
        debug!("opening {url}");
        self.run("open", &["-g", url]).await.map(|_| ())
    }
}

/// Quote `s` as an AppleScript string literal.
pub fn applescript_string(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
