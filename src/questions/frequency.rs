//! Q3: the outlet where each widely distributed, high-volume product sells most often.

use std::collections::HashSet;

use polars::prelude::*;
use tracing::{debug, info};

use super::{retain_keys, string_set};
use crate::data::normalize_dates;
use crate::error::AnalysisResult;
use crate::schema::{derived, product, sale};

/// Per product, the outlet with the lowest `days_open / days_with_sale` ratio.
///
/// Only products present in both `coverage` (Q1) and `pareto` (Q2) are
/// considered. `days_open` is the number of distinct dates an outlet appears
/// in the filtered sales, `days_with_sale` the number of distinct dates the
/// product sold at that outlet, so the ratio is at least 1 and a lower value
/// means the product sells on more of the outlet's days. Ties on the ratio go
/// to the lowest outlet id. Output columns are barcode, outlet, frequency,
/// one row per product sorted by barcode.
pub fn frequency_ranking(
    sales: &DataFrame,
    coverage: &DataFrame,
    pareto: &DataFrame,
) -> AnalysisResult<DataFrame> {
    let covered = string_set(coverage, product::BARCODE)?;
    let ranked = string_set(pareto, sale::BARCODE)?;
    let common: HashSet<String> = covered.intersection(&ranked).cloned().collect();
    debug!(
        covered = covered.len(),
        ranked = ranked.len(),
        "Intersecting coverage and Pareto products"
    );

    let sales = normalize_dates(sales)?;
    let filtered = retain_keys(&sales, sale::BARCODE, &common)?
        .lazy()
        .filter(
            col(sale::OUTLET_ID)
                .is_not_null()
                .and(col(sale::COMMERCIAL_DATE).is_not_null()),
        );

    let days_open = filtered
        .clone()
        .group_by([col(sale::OUTLET_ID)])
        .agg([col(sale::COMMERCIAL_DATE).n_unique().alias(derived::DAYS_OPEN)]);

    let days_with_sale = filtered
        .group_by([col(sale::BARCODE), col(sale::OUTLET_ID)])
        .agg([col(sale::COMMERCIAL_DATE)
            .n_unique()
            .alias(derived::DAYS_WITH_SALE)]);

    let result = days_with_sale
        .join(
            days_open,
            [col(sale::OUTLET_ID)],
            [col(sale::OUTLET_ID)],
            JoinArgs::new(JoinType::Inner),
        )
        .with_column(
            (col(derived::DAYS_OPEN).cast(DataType::Float64)
                / col(derived::DAYS_WITH_SALE).cast(DataType::Float64))
            .alias(derived::FREQUENCY),
        )
        .sort(
            [sale::BARCODE, derived::FREQUENCY, sale::OUTLET_ID],
            SortMultipleOptions::default(),
        )
        .group_by_stable([col(sale::BARCODE)])
        .agg([
            col(sale::OUTLET_ID).first().alias(derived::OUTLET),
            col(derived::FREQUENCY).first(),
        ])
        .collect()?;

    info!(products = result.height(), "Most frequent outlet per product");
    Ok(result)
}
