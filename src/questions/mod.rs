//! The five business questions.
//!
//! Each computation borrows the input frames and builds its own lazy copy,
//! so results never depend on the order in which questions run.

pub mod coverage;
pub mod frequency;
pub mod growth;
pub mod pareto;
pub mod variation;

use std::collections::HashSet;
use std::fmt;

use polars::prelude::*;

use crate::error::AnalysisResult;

pub use coverage::coverage_filter;
pub use frequency::frequency_ranking;
pub use growth::{product_growth, ProductGrowth};
pub use pareto::{volume_pareto, ParetoTable};
pub use variation::{period_variation, PeriodVariation};

/// Relative change between a base and a later quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Change {
    /// Percentage change, e.g. `50.0` for +50%.
    Percent(f64),
    /// Growth from a zero base; positive infinity.
    Unbounded,
}

impl Change {
    pub fn as_f64(&self) -> f64 {
        match self {
            Change::Percent(value) => *value,
            Change::Unbounded => f64::INFINITY,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Change::Unbounded)
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Percent(value) => write!(f, "{value:+.2}%"),
            Change::Unbounded => write!(f, "+infinity"),
        }
    }
}

/// First value of `column` as f64; empty or null reads as zero.
pub(crate) fn scalar_f64(df: &DataFrame, column: &str) -> AnalysisResult<f64> {
    let values = df
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(values.f64()?.get(0).unwrap_or(0.0))
}

/// Non-null values of a text column as a set.
pub(crate) fn string_set(df: &DataFrame, column: &str) -> AnalysisResult<HashSet<String>> {
    let values = df.column(column)?.as_materialized_series().str()?;
    Ok(values
        .into_iter()
        .flatten()
        .map(|v| v.to_string())
        .collect())
}

/// Rows of `df` whose `column` value belongs to `keys`, in their original order.
pub(crate) fn retain_keys(
    df: &DataFrame,
    column: &str,
    keys: &HashSet<String>,
) -> AnalysisResult<DataFrame> {
    let values = df.column(column)?.as_materialized_series().str()?;
    let mask: BooleanChunked = values
        .into_iter()
        .map(|v| v.is_some_and(|v| keys.contains(v)))
        .collect();
    Ok(df.filter(&mask)?)
}
