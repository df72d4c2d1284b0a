//! `.envlint.toml` configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::rules::RuleOptions;

pub const DEFAULT_CONFIG_FILE: &str = ".envlint.toml";
pub const DEFAULT_EXAMPLE_FILE: &str = ".env.example";
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Project configuration. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
  /// Template file the env files are checked against.
  pub example: PathBuf,
  /// Env files to check. Only the first one is linted.
  pub env_files: Vec<PathBuf>,
  pub rules: RulesConfig,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      example: PathBuf::from(DEFAULT_EXAMPLE_FILE),
      env_files: vec![PathBuf::from(DEFAULT_ENV_FILE)],
      rules: RulesConfig::default(),
    }
  }
}

/// The `[rules]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RulesConfig {
  /// Treat warnings as errors.
  pub require_all: bool,
  pub no_extra: bool,
  pub strict_urls: bool,
  pub strict_ports: bool,
  pub required: KeyList,
  pub ignore: KeyList,
}

impl Default for RulesConfig {
  fn default() -> Self {
    Self {
      require_all: false,
      no_extra: false,
      strict_urls: true,
      strict_ports: true,
      required: KeyList::default(),
      ignore: KeyList::default(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyList {
  pub keys: Vec<String>,
}

impl Config {
  /// Parse a configuration from TOML content.
  ///
  /// ```
  /// use envlint::config::Config;
  ///
  /// let config = Config::parse(r#"
  /// example = "config/.env.template"
  ///
  /// [rules]
  /// noExtra = true
  /// ignore = { keys = ["LEGACY"] }
  /// "#).unwrap();
  ///
  /// assert!(config.rules.no_extra);
  /// assert!(config.rules.strict_urls);
  /// assert_eq!(config.rules.ignore.keys, vec!["LEGACY"]);
  /// ```
  pub fn parse(content: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(content)?)
  }

  /// Loads the configuration at `path`. `Ok(None)` when the file does not exist.
  pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Option<Self>, ConfigError> {
    let path = path.as_ref();

    let content = match std::fs::read_to_string(path) {
      Ok(content) => content,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        #[cfg(feature = "tracing")]
        debug!(?path, "No config file, using defaults");
        return Ok(None);
      }
      Err(source) => {
        return Err(ConfigError::Read {
          path: path.to_path_buf(),
          source,
        });
      }
    };

    #[cfg(feature = "tracing")]
    debug!(?path, "Loaded config file");

    Self::parse(&content).map(Some)
  }

  /// The env file to lint: the first configured one, or `.env`.
  pub fn env_file(&self) -> PathBuf {
    self
      .env_files
      .first()
      .cloned()
      .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE))
  }

  pub fn rule_options(&self) -> RuleOptions {
    RuleOptions {
      strict: self.rules.require_all,
      no_extra: self.rules.no_extra,
      strict_urls: self.rules.strict_urls,
      strict_ports: self.rules.strict_ports,
      required_keys: self.rules.required.keys.clone(),
      ignore_keys: self.rules.ignore.keys.clone(),
    }
  }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("cannot read {}: {source}", .path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("invalid config: {0}")]
  Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_defaults() {
    let config = Config::default();

    assert_eq!(config.example, PathBuf::from(".env.example"));
    assert_eq!(config.env_file(), PathBuf::from(".env"));
    assert!(config.rules.strict_urls);
    assert!(config.rules.strict_ports);

    let options = config.rule_options();
    assert!(!options.strict);
    assert!(!options.no_extra);
    assert!(options.required_keys.is_empty());
    assert_eq!(options, RuleOptions::default());
  }

  #[test]
  fn test_empty_file_is_default() {
    assert_eq!(Config::parse("").unwrap(), Config::default());
  }

  #[test]
  fn test_parse_full() {
    let config = Config::parse(
      r#"
example = ".env.template"
envFiles = [".env.local", ".env"]

[rules]
requireAll = true
noExtra = true
strictUrls = false
strictPorts = false
required = { keys = ["API_KEY"] }

[rules.ignore]
keys = ["LEGACY", "OLD"]
"#,
    )
    .unwrap();

    assert_eq!(config.example, PathBuf::from(".env.template"));
    assert_eq!(config.env_file(), PathBuf::from(".env.local"));

    let options = config.rule_options();
    assert!(options.strict);
    assert!(options.no_extra);
    assert!(!options.strict_urls);
    assert!(!options.strict_ports);
    assert_eq!(options.required_keys, vec!["API_KEY"]);
    assert_eq!(options.ignore_keys, vec!["LEGACY", "OLD"]);
  }

  #[test]
  fn test_empty_env_files_falls_back() {
    let config = Config::parse("envFiles = []").unwrap();

    assert_eq!(config.env_file(), PathBuf::from(".env"));
  }

  #[test]
  fn test_parse_error() {
    let err = Config::parse("example = [").unwrap_err();

    assert!(matches!(err, ConfigError::Parse(_)));
  }

  #[test]
  fn test_load_from() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(DEFAULT_CONFIG_FILE);

    assert_eq!(Config::load_from(&path).unwrap(), None);

    std::fs::write(&path, "[rules]\nnoExtra = true\n").unwrap();
    let config = Config::load_from(&path).unwrap().unwrap();
    assert!(config.rules.no_extra);
  }
}
