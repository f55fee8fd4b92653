use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "chatmd.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Named command templates for `resolve --command`.
    pub commands: BTreeMap<String, String>,
    pub append: AppendConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppendConfig {
    /// Speaker used by `append` when `--speaker` is omitted.
    pub speaker: String,
}

impl Default for AppendConfig {
    fn default() -> Self {
        AppendConfig {
            speaker: "user".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Load `path`, or `chatmd.toml` when present. No file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Config::default());
                }
                default
            }
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config '{}'", path.display()))?;
        Config::from_toml(&text).with_context(|| format!("in '{}'", path.display()))
    }

    pub fn command(&self, name: &str) -> Option<&str> {
        self.commands.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_empty() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.append.speaker, "user");
        assert!(config.commands.is_empty());
    }

    #[test]
    fn reads_commands_and_append_speaker() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[commands]\nrun = \"python ${{file}} --message ${{messageIndex}}\"\n\n[append]\nspeaker = \"assistant\""
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(
            config.command("run"),
            Some("python ${file} --message ${messageIndex}")
        );
        assert_eq!(config.command("missing"), None);
        assert_eq!(config.append.speaker, "assistant");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(Config::from_toml("[commands\n").is_err());
    }
}
