// ABOUTME: Configuration structures and parsing for the SecureCRT importer
// ABOUTME: Users point at their session export and tune which sessions are skipped and how results print

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    pub source: SourceConfig,
    pub import: ImportConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SourceConfig {
    pub sessions_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ImportConfig {
    #[serde(default = "default_meta_sessions")]
    pub meta_sessions: Vec<String>,
    #[serde(default = "default_port")]
    pub default_port: String,
    #[serde(default)]
    pub collect_warnings: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_include_identity")]
    pub include_identity: bool,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Toml,
}

fn default_meta_sessions() -> Vec<String> {
    crate::securecrt::parser::DEFAULT_META_SESSIONS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_port() -> String {
    crate::securecrt::parser::DEFAULT_PORT.to_string()
}

fn default_include_identity() -> bool {
    true
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            meta_sessions: default_meta_sessions(),
            default_port: default_port(),
            collect_warnings: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source: SourceConfig {
                sessions_path: "~/.vandyke/SecureCRT/sessions.xml".to_string(),
            },
            import: ImportConfig::default(),
            output: OutputConfig {
                format: OutputFormat::Json,
                include_identity: true,
            },
        }
    }
}

impl Config {
    pub fn default_config_content() -> &'static str {
        r#"# SecureCRT Import Configuration

[source]
# SecureCRT XML export (File > Export Settings in SecureCRT)
sessions_path = "~/.vandyke/SecureCRT/sessions.xml"

[import]
# Session names that hold SecureCRT defaults rather than real hosts
meta_sessions = ["Default"]
# Port used when a session does not set one
default_port = "22"
# Report hosts without a hostname and overwritten duplicate names
collect_warnings = false

[output]
# json or toml
format = "json"
# Resolve the SSH2 identity key referenced by the export
include_identity = true
"#
    }

    pub fn load_from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        Self::load_from_str(&content)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to determine config directory")?;
        Ok(config_dir.join("securecrt-import").join("config.toml"))
    }

    pub fn expand_path(&mut self) -> Result<()> {
        self.source.sessions_path = expand_tilde(&self.source.sessions_path)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.sessions_path.is_empty() {
            anyhow::bail!("sessions_path cannot be empty");
        }

        if self.import.default_port.is_empty() {
            anyhow::bail!("default_port cannot be empty");
        }

        if self.import.meta_sessions.iter().any(|name| name.is_empty()) {
            anyhow::bail!("meta_sessions cannot contain empty names");
        }

        Ok(())
    }

    pub fn save_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write default config to: {}", path.display()))?;

        Ok(())
    }
}

fn expand_tilde(path: &str) -> Result<String> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home.join(rest).to_string_lossy().into_owned())
    } else {
        Ok(path.to_string())
    }
}
