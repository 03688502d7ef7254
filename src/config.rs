//! Configuration for the render driver.
//!
//! Layering, lowest to highest precedence:
//! - Built-in defaults
//! - `rendergen.toml` / `.rendergen.toml` in the current directory
//! - `rendergen.toml` in the XDG config directory
//! - Environment variables prefixed `RENDERGEN_`, `__`-nested
//!
//! ## Example config file (rendergen.toml):
//! ```toml
//! [output]
//! target = "ruby"
//! path = "generated/types.rb"
//! leading_comment = "Generated types. Do not edit by hand."
//!
//! [diagnostics]
//! fail_on_warnings = false
//! ```

use std::path::PathBuf;

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Top-level render configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Output target and destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Which `RenderStrategy` to drive. Only `"ruby"` exists today.
    #[serde(default = "default_target")]
    pub target: String,

    /// Destination file. `None` means write to stdout.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Comment emitted at the top of the generated file.
    #[serde(default)]
    pub leading_comment: Option<String>,

    /// Create the parent directory of `path` if it does not exist.
    #[serde(default = "default_true")]
    pub create_output_dir: bool,

    /// Override the target's own indent unit width, in spaces.
    #[serde(default)]
    pub indent_width: Option<usize>,
}

/// Non-fatal diagnostics handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Treat any collected warning as a render failure.
    #[serde(default)]
    pub fail_on_warnings: bool,
}

fn default_target() -> String {
    "ruby".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            path: None,
            leading_comment: None,
            create_output_dir: true,
            indent_width: None,
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { fail_on_warnings: false }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Load configuration from default locations.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, optionally overlaying one explicit file on top.
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        for location in ["rendergen.toml", ".rendergen.toml"] {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "rendergen", "rendergen") {
            let xdg_config = dirs.config_dir().join("rendergen.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("RENDERGEN").separator("__").try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_ruby() {
        let config = RenderConfig::default();
        assert_eq!(config.output.target, "ruby");
        assert!(!config.diagnostics.fail_on_warnings);
    }

    #[test]
    fn serializes_round_trip_through_toml() {
        let config = RenderConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("[diagnostics]"));
        let parsed: RenderConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.output.target, config.output.target);
    }
}
