//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.crimescope.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset settings.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Chart settings.
    #[serde(default)]
    pub charts: ChartConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory where charts and the summary table are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            verbose: false,
        }
    }
}

fn default_output_dir() -> String {
    "results".to_string()
}

/// Dataset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Path to the incident CSV file.
    #[serde(default = "default_dataset_path")]
    pub path: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

fn default_dataset_path() -> String {
    "data/crimes.csv".to_string()
}

/// Chart rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Render chart PNGs (the summary table is always written).
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Chart width in pixels.
    #[serde(default = "default_chart_width")]
    pub width: u32,

    /// Chart height in pixels.
    #[serde(default = "default_chart_height")]
    pub height: u32,

    /// Number of areas shown in the night-incident chart.
    #[serde(default = "default_top_areas")]
    pub top_areas: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width: default_chart_width(),
            height: default_chart_height(),
            top_areas: default_top_areas(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_chart_width() -> u32 {
    1200
}

fn default_chart_height() -> u32 {
    800
}

fn default_top_areas() -> usize {
    10
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".crimescope.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Paths always override since they have defaults in CLI
        self.dataset.path = args.dataset.display().to_string();
        self.general.output_dir = args.output.display().to_string();

        // Chart settings
        self.charts.top_areas = args.top_areas;
        if args.no_charts {
            self.charts.enabled = false;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Chart dimensions as the renderer expects them.
    pub fn chart_size(&self) -> (u32, u32) {
        (self.charts.width, self.charts.height)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dataset.path, "data/crimes.csv");
        assert_eq!(config.general.output_dir, "results");
        assert!(config.charts.enabled);
        assert_eq!(config.charts.top_areas, 10);
        assert_eq!(config.chart_size(), (1200, 800));
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output_dir = "out"
verbose = true

[dataset]
path = "data/incidents.csv"

[charts]
enabled = false
width = 800
height = 600
top_areas = 5
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output_dir, "out");
        assert!(config.general.verbose);
        assert_eq!(config.dataset.path, "data/incidents.csv");
        assert!(!config.charts.enabled);
        assert_eq!(config.chart_size(), (800, 600));
        assert_eq!(config.charts.top_areas, 5);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str("[charts]\ntop_areas = 3\n").unwrap();
        assert_eq!(config.charts.top_areas, 3);
        assert_eq!(config.charts.width, 1200);
        assert_eq!(config.dataset.path, "data/crimes.csv");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[dataset]"));
        assert!(toml_str.contains("[charts]"));
    }
}
