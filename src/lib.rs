//! Salescope: answers five fixed business questions over a retail sales dataset
//!
//! Products and point-of-sale transactions are loaded once with Polars and
//! passed by reference to five independent computations: outlet coverage,
//! a Pareto cut over liters sold, best-selling outlet frequency, the change
//! between two quarters and the monthly growth of one target product.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod questions;
pub mod report;
pub mod schema;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use config::Config;
pub use data::{load_datasets, normalize_dates, Datasets};
pub use error::{AnalysisError, AnalysisResult};
pub use pipeline::{run, PipelineSummary};
pub use questions::{
    coverage_filter, frequency_ranking, period_variation, product_growth, volume_pareto, Change,
};
pub use report::ArtifactWriter;
pub use viz::{render_dashboard, Panel};

/// Common result type used by the binary and the presentation layer
pub type Result<T> = anyhow::Result<T>;
