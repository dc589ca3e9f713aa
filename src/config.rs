use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ManifestPublishError, Result};

/// Stable configuration for manifest-publish.
///
/// Covers the inputs that rarely change between invocations: the target
/// manifest repository and branch, the message template and how publication
/// is routed. Per-release inputs (id, version, asset pattern, ...) come from
/// the command line and override these values.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Target manifest repository as `owner/name`
    #[serde(default = "default_repo")]
    pub repo: String,

    /// Target branch; the repository's default branch when unset
    #[serde(default)]
    pub branch: Option<String>,

    /// Commit/pull-request message template
    #[serde(default = "default_message")]
    pub message: String,

    /// Manifest file extension
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Publish through a pull request even when a direct commit is permitted
    #[serde(default)]
    pub always_use_pull_request: bool,

    /// Owner to fork into when the fork route is taken
    #[serde(default)]
    pub fork_owner: Option<String>,
}

/// Returns the default target manifest repository.
fn default_repo() -> String {
    "microsoft/winget-pkgs".to_string()
}

/// Returns the default commit/pull-request message template.
fn default_message() -> String {
    "Update {{id}} to version {{version}}".to_string()
}

/// Returns the default manifest file extension.
fn default_extension() -> String {
    "yaml".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            repo: default_repo(),
            branch: None,
            message: default_message(),
            extension: default_extension(),
            always_use_pull_request: false,
            fork_owner: None,
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `manifestpublish.toml` in current directory
/// 3. `.manifestpublish.toml` in the user config directory
/// 4. Default configuration if no file found
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./manifestpublish.toml").exists() {
        fs::read_to_string("./manifestpublish.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".manifestpublish.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| ManifestPublishError::config(format!("cannot parse config file: {}", e)))?;
    Ok(config)
}
