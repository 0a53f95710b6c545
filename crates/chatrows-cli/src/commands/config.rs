//! Config command - inspect and edit the JSON configuration.
//!
//! Every subcommand works on one file: the global `--config` path when
//! given, else the per-user default.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;
use tracing::debug;

use chatrows_core::models::config::ChatrowsConfig;
use chatrows_core::transcript::TranscriptParser;

use super::default_config_path;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Write here instead of the config file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one value by dotted key (e.g. "parser.note_marker")
    Get { key: String },

    /// Change one value; JSON literals are accepted, anything else is a string
    Set { key: String, value: String },

    /// Compile every configured pattern
    Check,

    /// Show which file is in use
    Path,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let file = ConfigFile::resolve(config_path);
    debug!("Using configuration file {}", file.path.display());

    match args.command {
        ConfigCommand::Show => file.show(),
        ConfigCommand::Init { output, force } => file.init(output, force),
        ConfigCommand::Get { key } => file.get(&key),
        ConfigCommand::Set { key, value } => file.set(&key, &value),
        ConfigCommand::Check => file.check(),
        ConfigCommand::Path => file.describe(),
    }
}

struct ConfigFile {
    path: PathBuf,
    /// Named with `--config`; a missing explicit file is an error, not defaults.
    explicit: bool,
}

impl ConfigFile {
    fn resolve(config_path: Option<&str>) -> Self {
        match config_path {
            Some(path) => Self {
                path: PathBuf::from(path),
                explicit: true,
            },
            None => Self {
                path: default_config_path(),
                explicit: false,
            },
        }
    }

    fn load(&self) -> anyhow::Result<ChatrowsConfig> {
        if self.path.exists() || self.explicit {
            Ok(ChatrowsConfig::from_file(&self.path)?)
        } else {
            Ok(ChatrowsConfig::default())
        }
    }

    fn show(&self) -> anyhow::Result<()> {
        if !self.path.exists() {
            println!(
                "{} {} does not exist, showing defaults.",
                style("ℹ").blue(),
                self.path.display()
            );
            println!("{}", serde_json::to_string_pretty(&ChatrowsConfig::default())?);
            return Ok(());
        }

        println!("{}", serde_json::to_string_pretty(&self.load()?)?);
        Ok(())
    }

    fn init(&self, output: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
        let target = output.unwrap_or_else(|| self.path.clone());

        if target.exists() && !force {
            anyhow::bail!(
                "{} already exists. Use --force to overwrite.",
                target.display()
            );
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        ChatrowsConfig::default().save(&target)?;
        println!("{} Wrote defaults to {}", style("✓").green(), target.display());
        Ok(())
    }

    fn get(&self, key: &str) -> anyhow::Result<()> {
        let json = serde_json::to_value(self.load()?)?;
        let value = lookup(&json, key)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;

        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn set(&self, key: &str, raw: &str) -> anyhow::Result<()> {
        let value: Value =
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

        // A file created by `set` starts from the defaults
        let current = if self.path.exists() {
            ChatrowsConfig::from_file(&self.path)?
        } else {
            ChatrowsConfig::default()
        };

        let mut json = serde_json::to_value(current)?;
        assign(&mut json, key, value.clone())?;
        let updated: ChatrowsConfig = serde_json::from_value(json)?;

        // Unknown keys are dropped by deserialization; refuse them instead
        let stored = serde_json::to_value(&updated)?;
        if lookup(&stored, key).unwrap_or(&Value::Null) != &value {
            anyhow::bail!("Unknown configuration key: {}", key);
        }

        TranscriptParser::from_config(updated.parser.clone())?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        updated.save(&self.path)?;

        println!(
            "{} {} = {} ({})",
            style("✓").green(),
            key,
            serde_json::to_string(&value)?,
            self.path.display()
        );
        Ok(())
    }

    fn check(&self) -> anyhow::Result<()> {
        let config = self.load()?;
        let types = config.parser.order_types.len();
        TranscriptParser::from_config(config.parser)?;

        println!(
            "{} Configuration is valid ({} order types)",
            style("✓").green(),
            types
        );
        Ok(())
    }

    fn describe(&self) -> anyhow::Result<()> {
        println!("Configuration file: {}", self.path.display());

        if self.path.exists() {
            println!("Status: {}", style("exists").green());
        } else {
            println!("Status: {}", style("not created").yellow());
            println!("Run 'chatrows config init' to write the defaults there.");
        }
        Ok(())
    }
}

/// Value at a dotted key path.
fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(root, |node, part| node.get(part))
}

fn assign(root: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let (section, field) = match key.rsplit_once('.') {
        Some((section, field)) => {
            let node = section
                .split('.')
                .try_fold(root, |node, part| node.get_mut(part))
                .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", section))?;
            (node, field)
        }
        None => (root, key),
    };

    let object = section
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("Cannot set {}: parent is not a section", key))?;
    object.insert(field.to_string(), value);
    Ok(())
}
