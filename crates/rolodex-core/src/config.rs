use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::Path;

/// Project-level settings from `.rolodex/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Permit operators to let a conflicting source value win per field.
    #[serde(default = "default_true")]
    pub allow_source_override: bool,
    /// How long a merge waits for the tenant store lock.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            allow_source_override: default_true(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    #[serde(default = "default_true")]
    pub group_by_title: bool,
    #[serde(default = "default_true")]
    pub group_by_email: bool,
    /// Property key holding the email address.
    #[serde(default = "default_email_key")]
    pub email_key: String,
    #[serde(default = "default_min_group_size")]
    pub min_group_size: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            group_by_title: default_true(),
            group_by_email: default_true(),
            email_key: default_email_key(),
            min_group_size: default_min_group_size(),
        }
    }
}

/// Per-user settings from `<config_dir>/rolodex/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    /// Default operator name recorded on audit events.
    #[serde(default)]
    pub user: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

/// Load project config, falling back to defaults when the file is absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(".rolodex/config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load user config, falling back to defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("rolodex/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve project, user and output settings in one pass.
///
/// # Errors
///
/// Propagates config read/parse failures.
pub fn resolve_config(project_root: &Path, cli_json: bool) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(
        cli_json,
        user.output.as_deref(),
        env_format.as_deref(),
        std::io::stdout().is_terminal(),
    );

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
    })
}

/// Output mode precedence: `--json` > `FORMAT` env > user config > TTY.
fn resolve_output(
    cli_json: bool,
    user_output: Option<&str>,
    env_format: Option<&str>,
    is_tty: bool,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if is_tty { "pretty" } else { "text" }.to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_lock_timeout_ms() -> u64 {
    5_000
}

fn default_email_key() -> String {
    "email".to_string()
}

const fn default_min_group_size() -> usize {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = tempfile::tempdir().expect("temp dir must be created");
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert!(cfg.merge.allow_source_override);
        assert_eq!(cfg.merge.lock_timeout_ms, 5_000);
        assert!(cfg.dedup.group_by_title);
        assert!(cfg.dedup.group_by_email);
        assert_eq!(cfg.dedup.email_key, "email");
        assert_eq!(cfg.dedup.min_group_size, 2);
    }

    #[test]
    fn partial_project_config_keeps_other_defaults() {
        let root = tempfile::tempdir().expect("temp dir must be created");
        std::fs::create_dir_all(root.path().join(".rolodex")).expect("create .rolodex");
        std::fs::write(
            root.path().join(".rolodex/config.toml"),
            "[merge]\nallow_source_override = false\n\n[dedup]\nemail_key = \"mail\"\n",
        )
        .expect("write config");

        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert!(!cfg.merge.allow_source_override);
        assert_eq!(cfg.merge.lock_timeout_ms, 5_000);
        assert_eq!(cfg.dedup.email_key, "mail");
        assert!(cfg.dedup.group_by_title);
    }

    #[test]
    fn malformed_project_config_is_an_error() {
        let root = tempfile::tempdir().expect("temp dir must be created");
        std::fs::create_dir_all(root.path().join(".rolodex")).expect("create .rolodex");
        std::fs::write(root.path().join(".rolodex/config.toml"), "[merge\n").expect("write");
        let err = load_project_config(root.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn cli_json_overrides_env_and_config() {
        assert_eq!(resolve_output(true, Some("pretty"), Some("text"), true), "json");
    }

    #[test]
    fn env_beats_user_config() {
        assert_eq!(resolve_output(false, Some("pretty"), Some("text"), true), "text");
    }

    #[test]
    fn legacy_aliases_are_normalized() {
        assert_eq!(resolve_output(false, Some("table"), Some("human"), false), "pretty");
        assert_eq!(resolve_output(false, Some("human"), Some("table"), false), "text");
    }

    #[test]
    fn tty_decides_when_nothing_is_set() {
        assert_eq!(resolve_output(false, None, None, true), "pretty");
        assert_eq!(resolve_output(false, None, Some("bogus"), false), "text");
    }

    #[test]
    fn user_config_parses_output_and_user() {
        let cfg: UserConfig = toml::from_str("output = \"json\"\nuser = \"maja\"\n").expect("parse");
        assert_eq!(cfg.output.as_deref(), Some("json"));
        assert_eq!(cfg.user.as_deref(), Some("maja"));
    }
}
