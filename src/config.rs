//! Configuration file handling.
//!
//! Settings come from an optional `salescope.toml`; every field has a
//! default so an empty or absent file is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::AnalysisError;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "salescope.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Source header names for the canonical columns.
    #[serde(default)]
    pub columns: ColumnsConfig,

    /// Tunables of the computations.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    /// Products catalog CSV.
    #[serde(default = "default_products_file")]
    pub products_file: PathBuf,

    /// Sales CSV.
    #[serde(default = "default_sales_file")]
    pub sales_file: PathBuf,

    /// Directory receiving the artifacts. Created when absent.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            products_file: default_products_file(),
            sales_file: default_sales_file(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_products_file() -> PathBuf {
    PathBuf::from("datos/productos.csv")
}

fn default_sales_file() -> PathBuf {
    PathBuf::from("datos/ventas.csv")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

/// Header names as they appear in the source files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnsConfig {
    #[serde(default = "default_barcode")]
    pub barcode: String,

    #[serde(default = "default_description")]
    pub description: String,

    #[serde(default = "default_content_volume")]
    pub content_volume: String,

    #[serde(default = "default_outlet_id")]
    pub outlet_id: String,

    #[serde(default = "default_commercial_date")]
    pub commercial_date: String,

    #[serde(default = "default_units_sold")]
    pub units_sold: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            barcode: default_barcode(),
            description: default_description(),
            content_volume: default_content_volume(),
            outlet_id: default_outlet_id(),
            commercial_date: default_commercial_date(),
            units_sold: default_units_sold(),
        }
    }
}

fn default_barcode() -> String {
    "codigo_barras".to_string()
}

fn default_description() -> String {
    "descripcion".to_string()
}

fn default_content_volume() -> String {
    "contenido".to_string()
}

fn default_outlet_id() -> String {
    "pdv_codigo".to_string()
}

fn default_commercial_date() -> String {
    "fecha_comercial".to_string()
}

fn default_units_sold() -> String {
    "cant_vta".to_string()
}

/// Tunables of the computations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Share of outlets a product must reach (Q1).
    #[serde(default = "default_coverage_cutoff")]
    pub coverage_cutoff: f64,

    /// Cumulative volume share kept by the Pareto cut (Q2).
    #[serde(default = "default_pareto_cutoff")]
    pub pareto_cutoff: f64,

    /// strftime pattern of the commercial date column.
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Description substrings identifying the growth target (Q5).
    /// Matched case-insensitively; any pattern may match.
    #[serde(default = "default_target_products")]
    pub target_products: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            coverage_cutoff: default_coverage_cutoff(),
            pareto_cutoff: default_pareto_cutoff(),
            date_format: default_date_format(),
            target_products: default_target_products(),
        }
    }
}

fn default_coverage_cutoff() -> f64 {
    crate::questions::coverage::DEFAULT_COVERAGE_CUTOFF
}

fn default_pareto_cutoff() -> f64 {
    crate::questions::pareto::DEFAULT_PARETO_CUTOFF
}

fn default_date_format() -> String {
    crate::data::DEFAULT_DATE_FORMAT.to_string()
}

fn default_target_products() -> Vec<String> {
    crate::questions::growth::DEFAULT_TARGET_PATTERNS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate(path)?;
        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Cutoffs must be shares in `[0, 1]` and at least one target pattern is required.
    pub fn validate(&self, path: &Path) -> std::result::Result<(), AnalysisError> {
        let invalid = |reason: String| AnalysisError::Config {
            path: path.to_path_buf(),
            reason,
        };

        for (name, value) in [
            ("coverage_cutoff", self.analysis.coverage_cutoff),
            ("pareto_cutoff", self.analysis.pareto_cutoff),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{name} must be within [0, 1], got {value}")));
            }
        }

        if self.analysis.target_products.iter().all(|p| p.trim().is_empty()) {
            return Err(invalid("target_products needs at least one pattern".into()));
        }

        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given explicitly on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.paths.output_dir = output.clone();
        }

        if let crate::cli::Command::Run {
            ref products,
            ref sales,
        } = args.command
        {
            if let Some(products) = products {
                self.paths.products_file = products.clone();
            }
            if let Some(sales) = sales {
                self.paths.sales_file = sales.clone();
            }
        }
    }

    /// Render the default configuration as TOML.
    pub fn default_toml() -> Result<String> {
        let header = "# salescope configuration\n\n";
        let body = toml::to_string_pretty(&Config::default())
            .context("Failed to serialize default configuration")?;
        Ok(format!("{header}{body}"))
    }
}
