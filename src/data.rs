//! Data loading and normalization using Polars

use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info};

use crate::config::{ColumnsConfig, Config};
use crate::error::{AnalysisError, AnalysisResult};
use crate::schema::{product, sale};

/// Date pattern assumed for text dates when no other format is known.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// The two input tables, loaded once and only ever borrowed afterwards.
#[derive(Debug, Clone)]
pub struct Datasets {
    /// Products catalog keyed by barcode
    pub products: DataFrame,
    /// Point-of-sale transactions
    pub sales: DataFrame,
}

/// Load both tables using the locations and mappings of `config`.
pub fn load_datasets(config: &Config) -> AnalysisResult<Datasets> {
    let products = load_products(&config.paths.products_file, &config.columns)?;
    let sales = load_sales(
        &config.paths.sales_file,
        &config.columns,
        &config.analysis.date_format,
    )?;

    info!(
        products = products.height(),
        sales = sales.height(),
        "Datasets loaded"
    );
    Ok(Datasets { products, sales })
}

/// Load the products catalog.
///
/// Source headers are renamed to the canonical names of [`crate::schema::product`].
/// Every column stays text so the catalog is written back unchanged; the
/// content volume is only checked to be numeric.
pub fn load_products(path: &Path, columns: &ColumnsConfig) -> AnalysisResult<DataFrame> {
    let raw = read_csv_as_strings(path)?;
    let mapping = [
        (columns.barcode.as_str(), product::BARCODE),
        (columns.description.as_str(), product::DESCRIPTION),
        (columns.content_volume.as_str(), product::CONTENT_VOLUME),
    ];
    let df = rename_required(raw, "products", &mapping)?;
    parse_numeric(&df, "products", product::CONTENT_VOLUME)?;

    debug!(path = %path.display(), rows = df.height(), "Products loaded");
    Ok(df)
}

/// Load the sales table and parse its commercial date with `date_format`.
pub fn load_sales(
    path: &Path,
    columns: &ColumnsConfig,
    date_format: &str,
) -> AnalysisResult<DataFrame> {
    let raw = read_csv_as_strings(path)?;
    let mapping = [
        (columns.barcode.as_str(), sale::BARCODE),
        (columns.outlet_id.as_str(), sale::OUTLET_ID),
        (columns.commercial_date.as_str(), sale::COMMERCIAL_DATE),
        (columns.units_sold.as_str(), sale::UNITS_SOLD),
    ];
    let df = rename_required(raw, "sales", &mapping)?;
    let df = parse_numeric(&df, "sales", sale::UNITS_SOLD)?;
    let df = normalize_dates_with(&df, date_format)?;

    debug!(path = %path.display(), rows = df.height(), "Sales loaded");
    Ok(df)
}

/// Return a copy of `sales` whose commercial date column has the `Date` type.
///
/// Text is parsed with [`DEFAULT_DATE_FORMAT`], datetimes are truncated to
/// their day and dates are returned unchanged. The input is never modified.
pub fn normalize_dates(sales: &DataFrame) -> AnalysisResult<DataFrame> {
    normalize_dates_with(sales, DEFAULT_DATE_FORMAT)
}

/// [`normalize_dates`] with an explicit format for text dates.
pub fn normalize_dates_with(sales: &DataFrame, date_format: &str) -> AnalysisResult<DataFrame> {
    let column = sales
        .column(sale::COMMERCIAL_DATE)
        .map_err(|_| AnalysisError::MissingColumn {
            table: "sales",
            column: sale::COMMERCIAL_DATE.to_string(),
        })?;

    let expr = match column.dtype() {
        DataType::Date => return Ok(sales.clone()),
        DataType::Datetime(_, _) => col(sale::COMMERCIAL_DATE).cast(DataType::Date),
        DataType::String => col(sale::COMMERCIAL_DATE)
            .str()
            .strip_chars(lit(" \t\r\n"))
            .str()
            .to_date(StrptimeOptions {
                format: Some(date_format.into()),
                strict: true,
                ..Default::default()
            }),
        other => {
            return Err(AnalysisError::InvalidDate {
                column: sale::COMMERCIAL_DATE.to_string(),
                reason: format!("unsupported type {other}"),
            })
        }
    };

    sales
        .clone()
        .lazy()
        .with_columns([expr])
        .collect()
        .map_err(|e| AnalysisError::InvalidDate {
            column: sale::COMMERCIAL_DATE.to_string(),
            reason: e.to_string(),
        })
}

/// Copy of `df` with `column` as Float64. Any non-empty cell that is not a
/// number is an error.
fn parse_numeric(
    df: &DataFrame,
    table: &'static str,
    column: &str,
) -> AnalysisResult<DataFrame> {
    df.clone()
        .lazy()
        .with_columns([col(column).strict_cast(DataType::Float64)])
        .collect()
        .map_err(|e| AnalysisError::InvalidNumber {
            table,
            column: column.to_string(),
            reason: e.to_string(),
        })
}

/// Read a CSV file with all columns as String dtype, trimming header whitespace.
fn read_csv_as_strings(path: &Path) -> AnalysisResult<DataFrame> {
    if !path.is_file() {
        return Err(AnalysisError::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;

    Ok(df)
}

/// Rename source headers to canonical names, failing on the first one absent.
fn rename_required(
    df: DataFrame,
    table: &'static str,
    mapping: &[(&str, &str)],
) -> AnalysisResult<DataFrame> {
    for &(source, _) in mapping {
        if df.column(source).is_err() {
            return Err(AnalysisError::MissingColumn {
                table,
                column: source.to_string(),
            });
        }
    }

    let (old, new): (Vec<&str>, Vec<&str>) = mapping
        .iter()
        .filter(|(source, canonical)| source != canonical)
        .copied()
        .unzip();
    if old.is_empty() {
        return Ok(df);
    }

    Ok(df.lazy().rename(old, new, true).collect()?)
}
