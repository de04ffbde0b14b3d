use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for one run. Built once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jira_url: String,
    pub jira_username: String,
    pub jira_token: String,
    pub things_project: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    jira: Option<JiraSection>,
    things: Option<ThingsSection>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct JiraSection {
    url: Option<String>,
    username: Option<String>,
    api_token: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ThingsSection {
    project: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".jira-things")
        .join("config.toml")
}

/// Read the TOML file (if any) and overlay the process environment.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    let file = read_file_config(&path)?;
    let config = resolve(file, |key| std::env::var(key).ok())?;
    Ok(config)
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: FileConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

fn resolve(
    file: FileConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, ConfigError> {
    let jira = file.jira.unwrap_or_default();
    let things = file.things.unwrap_or_default();

    let pick = |key: &str, from_file: Option<String>| {
        env(key)
            .or(from_file)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let jira_url = pick("JIRA_URL", jira.url);
    let jira_username = pick("JIRA_USERNAME", jira.username);
    let jira_token = pick("JIRA_TOKEN", jira.api_token);
    let things_project = pick("THINGS_PROJECT", things.project);

    let missing: Vec<&'static str> = [
        ("JIRA_URL", jira_url.is_none()),
        ("JIRA_USERNAME", jira_username.is_none()),
        ("JIRA_TOKEN", jira_token.is_none()),
        ("THINGS_PROJECT", things_project.is_none()),
    ]
    .into_iter()
    .filter_map(|(key, absent)| absent.then_some(key))
    .collect();

    let (Some(jira_url), Some(jira_username), Some(jira_token), Some(things_project)) =
        (jira_url, jira_username, jira_token, things_project)
    else {
        return Err(ConfigError::Missing(missing));
    };

    let timeout_secs = match env("JIRA_THINGS_TIMEOUT_SECS") {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::Invalid {
                key: "JIRA_THINGS_TIMEOUT_SECS",
                reason: e.to_string(),
            })?,
        None => file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
    };
    if timeout_secs == 0 {
        return Err(ConfigError::Invalid {
            key: "request_timeout_secs",
            reason: "must be greater than zero".into(),
        });
    }

    Ok(AppConfig {
        jira_url: jira_url.trim_end_matches('/').to_string(),
        jira_username,
        jira_token,
        things_project,
        request_timeout: Duration::from_secs(timeout_secs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("JIRA_URL", "https://acme.atlassian.net/"),
            ("JIRA_USERNAME", "me@acme.io"),
            ("JIRA_TOKEN", "secret"),
            ("THINGS_PROJECT", "Work"),
        ]
    }

    #[test]
    fn env_only_config_resolves() {
        let config = resolve(FileConfig::default(), env_of(&full_env())).unwrap();
        assert_eq!(config.jira_url, "https://acme.atlassian.net");
        assert_eq!(config.jira_username, "me@acme.io");
        assert_eq!(config.things_project, "Work");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn missing_values_are_all_reported() {
        let err = resolve(
            FileConfig::default(),
            env_of(&[("JIRA_URL", "https://x"), ("JIRA_TOKEN", "  ")]),
        )
        .unwrap_err();
        match err {
            ConfigError::Missing(keys) => {
                assert_eq!(keys, vec!["JIRA_USERNAME", "JIRA_TOKEN", "THINGS_PROJECT"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
request_timeout_secs = 5

[jira]
url = "https://file.atlassian.net"
username = "file@acme.io"
api_token = "file-token"

[things]
project = "From File"
"#
        )
        .unwrap();

        let parsed = read_file_config(file.path()).unwrap();
        let config = resolve(parsed, env_of(&[("THINGS_PROJECT", "From Env")])).unwrap();
        assert_eq!(config.jira_url, "https://file.atlassian.net");
        assert_eq!(config.jira_token, "file-token");
        assert_eq!(config.things_project, "From Env");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn absent_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let parsed = read_file_config(&dir.path().join("nope.toml")).unwrap();
        assert!(parsed.jira.is_none());
        assert!(parsed.things.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[jira\nurl = ").unwrap();
        assert!(read_file_config(file.path()).is_err());
    }

    #[test]
    fn bad_timeout_is_invalid() {
        let mut env = full_env();
        env.push(("JIRA_THINGS_TIMEOUT_SECS", "soon"));
        let err = resolve(FileConfig::default(), env_of(&env)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "JIRA_THINGS_TIMEOUT_SECS",
                ..
            }
        ));
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let mut env = full_env();
        env.push(("JIRA_THINGS_TIMEOUT_SECS", "0"));
        assert!(resolve(FileConfig::default(), env_of(&env)).is_err());
    }
}
