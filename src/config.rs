//! Configuration relevant to AUTOEXEC.BAT generation.
//!
//! Loaded from one or more TOML files, later files taking precedence:
//!
//! ```toml
//! [dosbox]
//! automount = true
//! autoexec_section = "join"
//!
//! [autoexec]
//! text = """
//! @echo off
//! keen4e.exe
//! """
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// How `[autoexec]` sections from several config files are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AutoexecMode {
    /// Concatenate all sections, in load order (default)
    #[default]
    Join,
    /// Only the last non-empty section is used
    Overwrite,
}

/// `[autoexec]` content together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoexecSection {
    pub source: String,
    pub text: String,
}

/// Effective configuration after all files are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Mount `drives/<letter>` resource directories automatically.
    pub automount: bool,
    pub autoexec_section: AutoexecMode,
    /// Non-empty `[autoexec]` sections in load order.
    pub autoexec: Vec<AutoexecSection>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            automount: true,
            autoexec_section: AutoexecMode::default(),
            autoexec: Vec::new(),
        }
    }
}

/// On-disk layout of a single config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    dosbox: DosboxSection,
    autoexec: AutoexecTable,
}

/// Keys left unset do not override earlier files.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct DosboxSection {
    automount: Option<bool>,
    autoexec_section: Option<AutoexecMode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct AutoexecTable {
    text: String,
}

impl Config {
    /// Load and merge the given config files, in order.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut config = Self::default();
        for path in paths {
            let path = path.as_ref();
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            config
                .merge_str(&contents, &path.display().to_string())
                .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        }
        Ok(config)
    }

    /// Merge one config file's contents on top of the current values.
    pub fn merge_str(&mut self, contents: &str, source: &str) -> Result<()> {
        let file: ConfigFile = toml::from_str(contents)?;

        if let Some(automount) = file.dosbox.automount {
            self.automount = automount;
        }
        if let Some(mode) = file.dosbox.autoexec_section {
            self.autoexec_section = mode;
        }
        if !file.autoexec.text.is_empty() {
            debug!(source, "found [autoexec] section");
            self.autoexec.push(AutoexecSection {
                source: source.to_string(),
                text: file.autoexec.text,
            });
        }
        Ok(())
    }

    /// All `[autoexec]` sections joined, in load order.
    pub fn joined_autoexec(&self) -> String {
        let mut joined = String::new();
        for section in &self.autoexec {
            joined.push_str(&section.text);
            if !section.text.ends_with('\n') {
                joined.push('\n');
            }
        }
        joined
    }

    /// The section that survives in overwrite mode.
    pub fn overwritten_autoexec(&self) -> Option<&AutoexecSection> {
        self.autoexec.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let mut config = Config::default();
        config.merge_str("", "empty.toml").unwrap();

        assert!(config.automount);
        assert_eq!(config.autoexec_section, AutoexecMode::Join);
        assert!(config.autoexec.is_empty());
    }

    #[test]
    fn test_later_file_wins() {
        let mut config = Config::default();
        config
            .merge_str("[dosbox]\nautomount = false\nautoexec_section = \"overwrite\"\n", "a.toml")
            .unwrap();
        config.merge_str("[dosbox]\nautomount = true\n", "b.toml").unwrap();

        assert!(config.automount);
        assert_eq!(config.autoexec_section, AutoexecMode::Overwrite);
    }

    #[test]
    fn test_join_and_overwrite() {
        let mut config = Config::default();
        config.merge_str("[autoexec]\ntext = \"mount c .\"\n", "a.toml").unwrap();
        config.merge_str("[autoexec]\ntext = \"c:\\ndir\\n\"\n", "b.toml").unwrap();

        assert_eq!(config.joined_autoexec(), "mount c .\nc:\ndir\n");
        let last = config.overwritten_autoexec().unwrap();
        assert_eq!(last.source, "b.toml");
        assert_eq!(last.text, "c:\ndir\n");
    }

    #[test]
    fn test_invalid_mode_is_error() {
        let mut config = Config::default();
        assert!(config
            .merge_str("[dosbox]\nautoexec_section = \"append\"\n", "bad.toml")
            .is_err());
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dosbox.toml");
        fs::write(&path, "[dosbox]\nautomount = false\n[autoexec]\ntext = \"ver\"\n").unwrap();

        let config = Config::load(&[&path]).unwrap();
        assert!(!config.automount);
        assert_eq!(config.autoexec.len(), 1);
        assert!(Config::load(&[dir.path().join("missing.toml")]).is_err());
    }
}
