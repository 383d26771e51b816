//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/ntree/ntree.toml`
//! 3. Explicit config file passed with `--config`
//! 4. Environment variables: `NTREE__<SECTION>__<KEY>`

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::cli::error::{CliError, CliResult};

/// How trees are rendered as text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderSettings {
    /// Label printed for nodes without a value
    pub empty_label: String,
    /// Append the node handle to every label
    pub show_ids: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            empty_label: "<empty>".into(),
            show_ids: false,
        }
    }
}

/// Shape of the tree built by `ntree demo`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DemoSettings {
    /// Children of the root
    pub fanout: usize,
    /// Children of every root child
    pub grandchildren: usize,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            fanout: 3,
            grandchildren: 2,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub render: RenderSettings,
    pub demo: DemoSettings,
}

/// Get the XDG config directory for ntree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ntree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("ntree.toml"))
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// A missing global file is skipped; a missing `config_file` is an error.
    #[instrument(level = "debug")]
    pub fn load(config_file: Option<&Path>) -> CliResult<Self> {
        let mut builder = Config::builder();

        if let Some(global_path) = global_config_path() {
            debug!("global config: {}", global_path.display());
            builder = builder.add_source(File::from(global_path).required(false));
        }

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("NTREE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        let settings: Self = config.try_deserialize().map_err(config_err)?;
        debug!(?settings, "settings loaded");
        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> CliResult<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# ntree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/ntree/ntree.toml
#   File:   ntree --config <file>
#   Env:    NTREE__<SECTION>__<KEY>, e.g. NTREE__DEMO__FANOUT=4

[render]
# Label for nodes without a value
# empty_label = "<empty>"

# Append node handles to labels
# show_ids = false

[demo]
# Children of the root
# fanout = 3

# Children of every root child
# grandchildren = 2
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> CliError {
    CliError::Config {
        message: e.to_string(),
    }
}
