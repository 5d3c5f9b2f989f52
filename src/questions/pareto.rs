//! Q2: the smallest product set carrying most of the volume sold.

use polars::prelude::*;
use tracing::info;

use super::scalar_f64;
use crate::error::AnalysisResult;
use crate::schema::{derived, product, sale};

/// Cumulative share of liters kept by the cut.
pub const DEFAULT_PARETO_CUTOFF: f64 = 0.8;

/// Liters sold per product, with shares computed over every product sold.
#[derive(Debug, Clone)]
pub struct ParetoTable {
    /// Every product with matched sales: barcode, liters, liters_pct, liters_cum.
    pub full: DataFrame,
    /// Leading rows of `full` whose cumulative share is within the cutoff.
    pub selected: DataFrame,
}

impl ParetoTable {
    /// Sum of liters over the full aggregate.
    pub fn total_liters(&self) -> AnalysisResult<f64> {
        let total = self
            .full
            .clone()
            .lazy()
            .select([col(derived::LITERS).sum()])
            .collect()?;
        scalar_f64(&total, derived::LITERS)
    }
}

/// Rank products by liters sold and keep the head of the ranking.
///
/// Sales join the catalog on barcode (unmatched sales are dropped) and each
/// row contributes `units_sold * content_volume / 1000` liters, content being
/// in milliliters. Products are sorted by liters descending, ties by barcode
/// ascending. Shares are taken over the full ranking and a row is selected
/// while its cumulative share is `<= cutoff`. When nothing was sold in volume
/// every share is zero and the whole ranking is selected.
pub fn volume_pareto(
    products: &DataFrame,
    sales: &DataFrame,
    cutoff: f64,
) -> AnalysisResult<ParetoTable> {
    let catalog = products
        .clone()
        .lazy()
        .select([
            col(product::BARCODE),
            col(product::CONTENT_VOLUME).strict_cast(DataType::Float64),
        ]);

    let ranked = sales
        .clone()
        .lazy()
        .join(
            catalog,
            [col(sale::BARCODE)],
            [col(product::BARCODE)],
            JoinArgs::new(JoinType::Inner),
        )
        .with_column(
            (col(sale::UNITS_SOLD) * col(product::CONTENT_VOLUME) / lit(1000.0))
                .alias(derived::LITERS),
        )
        .group_by([col(sale::BARCODE)])
        .agg([col(derived::LITERS).sum()])
        .sort(
            [derived::LITERS, sale::BARCODE],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .collect()?;

    let total = ranked
        .clone()
        .lazy()
        .select([col(derived::LITERS).sum()])
        .collect()?;
    let total_liters = scalar_f64(&total, derived::LITERS)?;

    let share = if total_liters == 0.0 {
        lit(0.0)
    } else {
        col(derived::LITERS) / lit(total_liters)
    };

    let full = ranked
        .lazy()
        .with_column(share.alias(derived::LITERS_PCT))
        .with_column(col(derived::LITERS_PCT).cum_sum(false).alias(derived::LITERS_CUM))
        .select([
            col(sale::BARCODE),
            col(derived::LITERS),
            col(derived::LITERS_PCT),
            col(derived::LITERS_CUM),
        ])
        .collect()?;

    let selected = full
        .clone()
        .lazy()
        .filter(col(derived::LITERS_CUM).lt_eq(lit(cutoff)))
        .collect()?;

    info!(
        products = selected.height(),
        ranked = full.height(),
        total_liters,
        "Pareto cut over liters sold"
    );
    Ok(ParetoTable { full, selected })
}
