// ABOUTME: crt-import command line: reads a SecureCRT export and prints the normalized host tree
// ABOUTME: Configuration comes from a TOML file, with command line flags taking precedence

use anyhow::{Context, Result};
use clap::Parser;
use securecrt_import::config::{Config, OutputFormat};
use securecrt_import::logging;
use securecrt_import::securecrt::{
    HostTree, IdentityKeyPaths, ImportWarning, KeyPair, SecureCrtParser, XmlNode,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Import SecureCRT sessions into a host/group tree
#[derive(Parser, Debug)]
#[command(name = "crt-import")]
#[command(version)]
#[command(about = "Import SecureCRT sessions into a host/group tree", long_about = None)]
struct Cli {
    /// SecureCRT XML export (overrides source.sessions_path)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Configuration file (default: <config dir>/securecrt-import/config.toml)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the default configuration file and exit
    #[arg(long = "init-config")]
    init_config: bool,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum)]
    format: Option<OutputFormat>,

    /// Report skipped hosts and overwritten names
    #[arg(long = "warnings")]
    warnings: bool,

    /// Do not resolve the SSH2 identity key
    #[arg(long = "no-identity")]
    no_identity: bool,

    /// Read the identity key files and include their contents
    #[arg(long = "read-keys")]
    read_keys: bool,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct ImportReport {
    hosts: HostTree,
    #[serde(skip_serializing_if = "Option::is_none")]
    identity: Option<IdentityKeyPaths>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keys: Option<KeyPair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<ImportWarning>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(if cli.verbose { "debug" } else { logging::DEFAULT_LOG_LEVEL })?;

    if cli.init_config {
        let path = match &cli.config {
            Some(path) => path.clone(),
            None => Config::default_config_path()?,
        };
        Config::save_default_config(&path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let document = XmlNode::load_from_file(Path::new(&config.source.sessions_path))?;
    let report = import(&document, &config, cli.read_keys)?;

    if let Some(warnings) = &report.warnings {
        for warning in warnings {
            tracing::warn!("{}", warning);
        }
    }

    println!("{}", render(&report, config.output.format)?);
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => {
            let path = Config::default_config_path()?;
            if path.exists() {
                Config::load_from_file(&path)?
            } else {
                tracing::debug!("No configuration at {}, using defaults", path.display());
                Config::default()
            }
        }
    };

    if let Some(file) = &cli.file {
        config.source.sessions_path = file.to_string_lossy().into_owned();
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if cli.warnings {
        config.import.collect_warnings = true;
    }
    if cli.no_identity {
        config.output.include_identity = false;
    }

    config.expand_path()?;
    config.validate()?;
    Ok(config)
}

fn import(document: &XmlNode, config: &Config, read_keys: bool) -> Result<ImportReport> {
    let parser = SecureCrtParser::from_config(document, &config.import);

    let (hosts, warnings) = if config.import.collect_warnings {
        let (hosts, warnings) = parser.parse_hosts_with_warnings();
        (hosts, Some(warnings))
    } else {
        (parser.parse_hosts(), None)
    };

    let identity = if config.output.include_identity {
        parser.parse_identity()
    } else {
        None
    };

    let keys = match (&identity, read_keys) {
        (Some(identity), true) => Some(identity.read_keys()?),
        _ => None,
    };

    tracing::info!(
        "Imported {} hosts in {} groups",
        hosts.host_count(),
        hosts.group_count()
    );

    Ok(ImportReport {
        hosts,
        identity,
        keys,
        warnings,
    })
}

fn render(report: &ImportReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("Failed to serialize import as JSON")
        }
        OutputFormat::Toml => toml::to_string(report).context("Failed to serialize import as TOML"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<VanDyke version="3.0">
    <key name="Sessions">
        <key name="Default">
            <string name="Hostname">template</string>
        </key>
        <key name="Lab">
            <key name="router">
                <string name="Hostname">10.1.0.1</string>
                <string name="Username">netops</string>
            </key>
        </key>
        <key name="broken">
            <string name="Hostname"></string>
        </key>
    </key>
    <key name="SSH2">
        <string name="Identity Filename V2">/keys/lab.pub::rawkey</string>
    </key>
</VanDyke>"#;

    fn config(collect_warnings: bool, include_identity: bool) -> Config {
        let mut config = Config::default();
        config.import.collect_warnings = collect_warnings;
        config.output.include_identity = include_identity;
        config
    }

    #[test]
    fn test_import_report_json() {
        let document = XmlNode::parse_str(EXPORT).unwrap();

        let report = import(&document, &config(true, true), false).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&render(&report, OutputFormat::Json).unwrap()).unwrap();

        assert_eq!(json["hosts"]["Lab"]["__group"], true);
        assert_eq!(json["hosts"]["Lab"]["router"]["hostname"], "10.1.0.1");
        assert_eq!(json["hosts"]["Lab"]["router"]["port"], "22");
        assert!(json["hosts"].get("Default").is_none());
        assert_eq!(json["identity"]["public_key_path"], "/keys/lab.pub");
        assert_eq!(json["identity"]["private_key_path"], "/keys/lab");
        assert_eq!(json["warnings"][0]["kind"], "host_without_hostname");
        assert_eq!(json["warnings"][0]["label"], "broken");
        assert!(json.get("keys").is_none());
    }

    #[test]
    fn test_import_without_identity_or_warnings() {
        let document = XmlNode::parse_str(EXPORT).unwrap();

        let report = import(&document, &config(false, false), true).unwrap();

        assert!(report.identity.is_none());
        assert!(report.keys.is_none());
        assert!(report.warnings.is_none());
        assert_eq!(report.hosts.host_count(), 1);
    }

    #[test]
    fn test_import_read_keys_missing_files() {
        let document = XmlNode::parse_str(EXPORT).unwrap();

        let result = import(&document, &config(false, true), true);

        assert!(result.is_err());
    }

    #[test]
    fn test_render_toml() {
        let document = XmlNode::parse_str(EXPORT).unwrap();
        let report = import(&document, &config(false, false), false).unwrap();

        let rendered = render(&report, OutputFormat::Toml).unwrap();

        assert!(rendered.contains("hostname = \"10.1.0.1\""));
        assert!(rendered.contains("__group = true"));
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "crt-import",
            "--config",
            "/nonexistent/config.toml",
            "/tmp/export.xml",
        ]);

        assert!(load_config(&cli).is_err());

        let cli = Cli::parse_from(["crt-import", "-f", "toml", "--warnings", "/tmp/export.xml"]);
        assert_eq!(cli.format, Some(OutputFormat::Toml));
        assert!(cli.warnings);
        assert_eq!(cli.file, Some(PathBuf::from("/tmp/export.xml")));
    }
}
