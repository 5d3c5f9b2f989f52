//! Q1: products that reach broad distribution.

use polars::prelude::*;
use tracing::{debug, info};

use super::{retain_keys, scalar_f64, string_set};
use crate::error::AnalysisResult;
use crate::schema::{derived, product, sale};

/// Share of outlets a product must have sold in.
pub const DEFAULT_COVERAGE_CUTOFF: f64 = 0.8;

/// Products sold in at least `cutoff` of all outlets.
///
/// Sales lacking a barcode or an outlet are ignored. A product qualifies when
/// its distinct outlet count is `>= cutoff * total_outlets` (no rounding).
/// Products keep the catalog's row order and all of its columns. Without any
/// usable sale there is nothing to count, so the result is empty.
pub fn coverage_filter(
    products: &DataFrame,
    sales: &DataFrame,
    cutoff: f64,
) -> AnalysisResult<DataFrame> {
    let usable = sales.clone().lazy().filter(
        col(sale::BARCODE)
            .is_not_null()
            .and(col(sale::OUTLET_ID).is_not_null()),
    );

    let total = usable
        .clone()
        .select([col(sale::OUTLET_ID).n_unique().alias(derived::OUTLET_COUNT)])
        .collect()?;
    let total_outlets = scalar_f64(&total, derived::OUTLET_COUNT)?;
    let threshold = cutoff * total_outlets;

    let qualifying = usable
        .group_by([col(sale::BARCODE)])
        .agg([col(sale::OUTLET_ID).n_unique().alias(derived::OUTLET_COUNT)])
        .filter(
            col(derived::OUTLET_COUNT)
                .cast(DataType::Float64)
                .gt_eq(lit(threshold)),
        )
        .collect()?;
    debug!(
        total_outlets,
        threshold,
        qualifying = qualifying.height(),
        "Outlet coverage counted"
    );

    let barcodes = string_set(&qualifying, sale::BARCODE)?;
    let selected = retain_keys(products, product::BARCODE, &barcodes)?;

    info!(
        products = selected.height(),
        cutoff, "Products reaching the outlet coverage cutoff"
    );
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products() -> DataFrame {
        df!(
            product::BARCODE => ["A", "B", "C", "D"],
            product::DESCRIPTION => ["Agua A", "Agua B", "Agua C", "Agua D"],
            product::CONTENT_VOLUME => [500.0, 1500.0, 2250.0, 1000.0],
        )
        .unwrap()
    }

    /// Five outlets. A sells in all, B in four, C in three, D in none.
    fn sales() -> DataFrame {
        df!(
            sale::BARCODE => [
                Some("A"), Some("A"), Some("A"), Some("A"), Some("A"),
                Some("B"), Some("B"), Some("B"), Some("B"),
                Some("C"), Some("C"), Some("C"), Some("C"),
                None, Some("D"),
            ],
            sale::OUTLET_ID => [
                Some("P1"), Some("P2"), Some("P3"), Some("P4"), Some("P5"),
                Some("P1"), Some("P2"), Some("P3"), Some("P4"),
                Some("P1"), Some("P1"), Some("P2"), Some("P3"),
                Some("P9"), None,
            ],
            sale::UNITS_SOLD => [1.0; 15],
        )
        .unwrap()
    }

    fn barcodes(df: &DataFrame) -> Vec<String> {
        df.column(product::BARCODE)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // Null barcode/outlet rows are dropped, so P9 does not count: 5 outlets, threshold 4.0.
        let result = coverage_filter(&products(), &sales(), DEFAULT_COVERAGE_CUTOFF).unwrap();
        assert_eq!(barcodes(&result), vec!["A", "B"]);
        assert_eq!(result.width(), 3);
    }

    #[test]
    fn test_keeps_catalog_order() {
        let reordered = df!(
            product::BARCODE => ["B", "D", "A"],
            product::DESCRIPTION => ["Agua B", "Agua D", "Agua A"],
            product::CONTENT_VOLUME => [1500.0, 1000.0, 500.0],
        )
        .unwrap();

        let result = coverage_filter(&reordered, &sales(), DEFAULT_COVERAGE_CUTOFF).unwrap();
        assert_eq!(barcodes(&result), vec!["B", "A"]);
    }

    #[test]
    fn test_raising_cutoff_never_grows_selection() {
        let mut previous: Option<Vec<String>> = None;
        for cutoff in [0.0, 0.2, 0.5, 0.6, 0.8, 0.81, 1.0] {
            let current = barcodes(&coverage_filter(&products(), &sales(), cutoff).unwrap());
            if let Some(prev) = &previous {
                assert!(current.iter().all(|b| prev.contains(b)), "cutoff {cutoff}");
            }
            previous = Some(current);
        }
    }

    #[test]
    fn test_no_sales_selects_nothing() {
        let empty = sales().head(Some(0));
        let result = coverage_filter(&products(), &empty, DEFAULT_COVERAGE_CUTOFF).unwrap();
        assert_eq!(result.height(), 0);
    }
}
