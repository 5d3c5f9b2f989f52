//! Q5: month-over-month growth of one target product.

use polars::prelude::*;
use tracing::{info, warn};

use super::Change;
use crate::data::normalize_dates;
use crate::error::AnalysisResult;
use crate::schema::{derived, product, sale};

/// The target is listed with both decimal separators.
pub const DEFAULT_TARGET_PATTERNS: [&str; 2] = [
    "SALUS FRUTTE CERO ANANA 1,65L",
    "SALUS FRUTTE CERO ANANA 1.65L",
];

pub const BASE_MONTH: &str = "2020-08";
pub const COMPARED_MONTH: &str = "2020-09";

/// Monthly sales of the target product.
#[derive(Debug, Clone)]
pub struct ProductGrowth {
    pub barcode: String,
    pub description: String,
    /// Units per calendar month: month ("YYYY-MM"), units. Sorted by month.
    pub monthly: DataFrame,
    pub august: f64,
    pub september: f64,
    pub change: Change,
}

/// `(september - august) / august * 100`, unbounded whenever August is zero.
pub fn month_change(august: f64, september: f64) -> Change {
    if august == 0.0 {
        Change::Unbounded
    } else {
        Change::Percent((september - august) / august * 100.0)
    }
}

/// First product, in catalog order, whose description contains any pattern
/// (case-insensitive). Returns its barcode and description.
pub fn find_target(
    products: &DataFrame,
    patterns: &[String],
) -> AnalysisResult<Option<(String, String)>> {
    let needles: Vec<String> = patterns
        .iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect();

    let barcodes = products
        .column(product::BARCODE)?
        .as_materialized_series()
        .str()?;
    let descriptions = products
        .column(product::DESCRIPTION)?
        .as_materialized_series()
        .str()?;

    let found = barcodes
        .into_iter()
        .zip(descriptions.into_iter())
        .find_map(|(barcode, description)| {
            let (barcode, description) = (barcode?, description?);
            let lowered = description.to_lowercase();
            needles
                .iter()
                .any(|needle| lowered.contains(needle.as_str()))
                .then(|| (barcode.to_string(), description.to_string()))
        });
    Ok(found)
}

/// Monthly units of the target product and its August to September growth.
///
/// Returns `Ok(None)` when no product matches the patterns. When several
/// products match only the first one is analysed. A month without sales
/// counts as zero.
pub fn product_growth(
    products: &DataFrame,
    sales: &DataFrame,
    patterns: &[String],
) -> AnalysisResult<Option<ProductGrowth>> {
    let Some((barcode, description)) = find_target(products, patterns)? else {
        warn!(?patterns, "Target product not found in the catalog");
        return Ok(None);
    };

    let sales = normalize_dates(sales)?;
    let monthly = sales
        .lazy()
        .filter(
            col(sale::BARCODE)
                .eq(lit(barcode.clone()))
                .and(col(sale::COMMERCIAL_DATE).is_not_null()),
        )
        .with_column(
            col(sale::COMMERCIAL_DATE)
                .dt()
                .to_string("%Y-%m")
                .alias(derived::MONTH),
        )
        .group_by([col(derived::MONTH)])
        .agg([col(sale::UNITS_SOLD).sum().alias(derived::UNITS)])
        .sort([derived::MONTH], SortMultipleOptions::default())
        .collect()?;

    let august = month_units(&monthly, BASE_MONTH)?;
    let september = month_units(&monthly, COMPARED_MONTH)?;
    let change = month_change(august, september);

    info!(
        %barcode,
        august,
        september,
        change = %change,
        "Target product growth computed"
    );
    Ok(Some(ProductGrowth {
        barcode,
        description,
        monthly,
        august,
        september,
        change,
    }))
}

fn month_units(monthly: &DataFrame, month: &str) -> AnalysisResult<f64> {
    let months = monthly
        .column(derived::MONTH)?
        .as_materialized_series()
        .str()?;
    let units = monthly
        .column(derived::UNITS)?
        .as_materialized_series()
        .f64()?;

    Ok(months
        .into_iter()
        .zip(units.into_iter())
        .find(|(m, _)| *m == Some(month))
        .and_then(|(_, u)| u)
        .unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> Vec<String> {
        DEFAULT_TARGET_PATTERNS.iter().map(|s| s.to_string()).collect()
    }

    fn products(description: &str) -> DataFrame {
        df!(
            product::BARCODE => ["100", "200", "300"],
            product::DESCRIPTION => [
                "LEVITE POMELO 2.25L",
                description,
                "SALUS FRUTTE CERO ANANA 1,65L PACK",
            ],
            product::CONTENT_VOLUME => [2250.0, 1650.0, 1650.0],
        )
        .unwrap()
    }

    fn sales() -> DataFrame {
        df!(
            sale::BARCODE => ["200", "200", "200", "200", "300", "100"],
            sale::OUTLET_ID => ["P1", "P2", "P1", "P1", "P1", "P1"],
            sale::COMMERCIAL_DATE => [
                "2020-07-15", "2020-08-03", "2020-08-20", "2020-09-10", "2020-09-11", "2020-09-12",
            ],
            sale::UNITS_SOLD => [10.0, 120.0, 80.0, 300.0, 999.0, 999.0],
        )
        .unwrap()
    }

    #[test]
    fn test_matches_both_spellings_case_insensitively() {
        for description in [
            "Salus Frutte Cero Anana 1,65L",
            "SALUS FRUTTE CERO ANANA 1.65L",
        ] {
            let found = find_target(&products(description), &patterns()).unwrap();
            assert_eq!(found.map(|(b, _)| b), Some("200".to_string()), "{description}");
        }
    }

    #[test]
    fn test_first_match_wins() {
        // Product 300 also matches but comes later in the catalog.
        let catalog = products("SALUS FRUTTE CERO ANANA 1,65L");
        let growth = product_growth(&catalog, &sales(), &patterns())
            .unwrap()
            .unwrap();
        assert_eq!(growth.barcode, "200");
        assert_eq!(growth.august, 200.0);
        assert_eq!(growth.september, 300.0);
        assert_eq!(growth.change, Change::Percent(50.0));
    }

    #[test]
    fn test_monthly_table() {
        let catalog = products("SALUS FRUTTE CERO ANANA 1,65L");
        let growth = product_growth(&catalog, &sales(), &patterns())
            .unwrap()
            .unwrap();

        assert_eq!(growth.monthly.get_column_names_str(), vec!["month", "units"]);
        let months: Vec<&str> = growth
            .monthly
            .column(derived::MONTH)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(months, vec!["2020-07", "2020-08", "2020-09"]);
    }

    #[test]
    fn test_not_found_is_not_an_error() {
        let catalog = df!(
            product::BARCODE => ["100"],
            product::DESCRIPTION => ["LEVITE POMELO 2.25L"],
            product::CONTENT_VOLUME => [2250.0],
        )
        .unwrap();

        let result = product_growth(&catalog, &sales(), &patterns()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_zero_august_is_unbounded() {
        assert_eq!(month_change(200.0, 300.0), Change::Percent(50.0));
        assert_eq!(month_change(0.0, 300.0), Change::Unbounded);
        assert_eq!(month_change(0.0, 0.0), Change::Unbounded);
    }
}
