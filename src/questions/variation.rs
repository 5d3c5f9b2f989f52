//! Q4: change in units sold between two fixed quarters.

use chrono::NaiveDate;
use polars::prelude::*;
use tracing::info;

use super::{scalar_f64, Change};
use crate::data::normalize_dates;
use crate::error::AnalysisResult;
use crate::schema::sale;

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub label: &'static str,
    pub start: (i32, u32, u32),
    pub end: (i32, u32, u32),
}

/// June to August 2020.
pub const PERIOD_A: Period = Period {
    label: "Junio a Agosto",
    start: (2020, 6, 1),
    end: (2020, 8, 31),
};

/// September to November 2020.
pub const PERIOD_B: Period = Period {
    label: "Septiembre a Noviembre",
    start: (2020, 9, 1),
    end: (2020, 11, 30),
};

impl Period {
    /// Predicate selecting the sales dated within this period.
    fn contains(&self) -> Expr {
        let day = col(sale::COMMERCIAL_DATE).cast(DataType::Int32);
        day.clone()
            .gt_eq(lit(epoch_days(self.start)))
            .and(day.lt_eq(lit(epoch_days(self.end))))
    }
}

/// Days since 1970-01-01, the physical representation of a polars `Date`.
fn epoch_days((year, month, day): (i32, u32, u32)) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|date| (date - epoch).num_days() as i32)
        .unwrap_or_default()
}

/// Units sold in each period and the relative change from A to B.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodVariation {
    pub total_a: f64,
    pub total_b: f64,
    pub change: Change,
}

impl PeriodVariation {
    pub fn from_totals(total_a: f64, total_b: f64) -> Self {
        Self {
            total_a,
            total_b,
            change: period_change(total_a, total_b),
        }
    }
}

/// `(b - a) / a * 100`; from a zero base the change is unbounded when
/// anything sold and zero otherwise.
pub fn period_change(total_a: f64, total_b: f64) -> Change {
    if total_a == 0.0 {
        if total_b > 0.0 {
            Change::Unbounded
        } else {
            Change::Percent(0.0)
        }
    } else {
        Change::Percent((total_b - total_a) / total_a * 100.0)
    }
}

/// Sum units sold in [`PERIOD_A`] and [`PERIOD_B`] and compare them.
///
/// Sales outside both periods are ignored.
pub fn period_variation(sales: &DataFrame) -> AnalysisResult<PeriodVariation> {
    let sales = normalize_dates(sales)?;

    let totals = sales
        .lazy()
        .select([
            col(sale::UNITS_SOLD)
                .filter(PERIOD_A.contains())
                .sum()
                .alias("total_a"),
            col(sale::UNITS_SOLD)
                .filter(PERIOD_B.contains())
                .sum()
                .alias("total_b"),
        ])
        .collect()?;

    let variation = PeriodVariation::from_totals(
        scalar_f64(&totals, "total_a")?,
        scalar_f64(&totals, "total_b")?,
    );

    info!(
        total_a = variation.total_a,
        total_b = variation.total_b,
        change = %variation.change,
        "Period variation computed"
    );
    Ok(variation)
}
