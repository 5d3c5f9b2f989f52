//! Runs the five questions in order and persists each result independently.

use std::path::PathBuf;

use polars::prelude::DataFrame;
use tracing::{error, info, warn};

use crate::config::AnalysisConfig;
use crate::data::Datasets;
use crate::error::AnalysisResult;
use crate::questions::{
    coverage_filter, frequency_ranking, period_variation, product_growth, volume_pareto,
    ParetoTable, PeriodVariation, ProductGrowth,
};
use crate::report::{growth_report, variation_report, ArtifactWriter};
use crate::schema::artifact;

/// Everything one run computed, plus the artifacts that made it to disk.
#[derive(Debug)]
pub struct PipelineSummary {
    pub coverage: DataFrame,
    pub pareto: ParetoTable,
    pub frequency: DataFrame,
    pub variation: PeriodVariation,
    pub growth: Option<ProductGrowth>,
    /// Paths written successfully.
    pub written: Vec<PathBuf>,
    /// Artifact names whose write failed.
    pub failed: Vec<String>,
}

/// Compute Q1..Q5 over `datasets` and persist every result through `writer`.
///
/// A computation error aborts the run; a failed write is logged and the
/// remaining artifacts are still produced.
pub fn run(
    datasets: &Datasets,
    analysis: &AnalysisConfig,
    writer: &ArtifactWriter,
) -> AnalysisResult<PipelineSummary> {
    let mut outcome = Outcome::default();
    let Datasets { products, sales } = datasets;

    let coverage = coverage_filter(products, sales, analysis.coverage_cutoff)?;
    outcome.record(artifact::COVERAGE, writer.write_csv(artifact::COVERAGE, &coverage));

    let pareto = volume_pareto(products, sales, analysis.pareto_cutoff)?;
    outcome.record(artifact::PARETO, writer.write_csv(artifact::PARETO, &pareto.selected));

    let frequency = frequency_ranking(sales, &coverage, &pareto.selected)?;
    outcome.record(artifact::FREQUENCY, writer.write_csv(artifact::FREQUENCY, &frequency));

    let variation = period_variation(sales)?;
    outcome.record(
        artifact::VARIATION,
        writer.write_text(artifact::VARIATION, &variation_report(&variation)),
    );

    let growth = product_growth(products, sales, &analysis.target_products)?;
    match &growth {
        Some(growth) => {
            outcome.record(artifact::MONTHLY, writer.write_csv(artifact::MONTHLY, &growth.monthly));
            outcome.record(
                artifact::GROWTH,
                writer.write_text(artifact::GROWTH, &growth_report(growth)),
            );
        }
        None => warn!("Skipping target product artifacts: no matching product"),
    }

    info!(
        written = outcome.written.len(),
        failed = outcome.failed.len(),
        dir = %writer.dir().display(),
        "Pipeline finished"
    );

    Ok(PipelineSummary {
        coverage,
        pareto,
        frequency,
        variation,
        growth,
        written: outcome.written,
        failed: outcome.failed,
    })
}

#[derive(Default)]
struct Outcome {
    written: Vec<PathBuf>,
    failed: Vec<String>,
}

impl Outcome {
    fn record(&mut self, name: &str, result: AnalysisResult<PathBuf>) {
        match result {
            Ok(path) => self.written.push(path),
            Err(e) => {
                error!(file = name, error = %e, "Failed to persist artifact");
                self.failed.push(name.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{product, sale};
    use polars::prelude::*;
    use tempfile::tempdir;

    fn datasets() -> Datasets {
        let products = df!(
            product::BARCODE => ["A", "B"],
            product::DESCRIPTION => ["SALUS FRUTTE CERO ANANA 1,65L", "LEVITE POMELO 2.25L"],
            product::CONTENT_VOLUME => [1650.0, 2250.0],
        )
        .unwrap();
        let sales = df!(
            sale::BARCODE => ["A", "A", "B"],
            sale::OUTLET_ID => ["P1", "P2", "P1"],
            sale::COMMERCIAL_DATE => ["2020-08-10", "2020-09-10", "2020-07-01"],
            sale::UNITS_SOLD => [10.0, 20.0, 5.0],
        )
        .unwrap();
        Datasets { products, sales }
    }

    #[test]
    fn test_all_artifacts_written() {
        let temp_dir = tempdir().unwrap();
        let writer = ArtifactWriter::new(temp_dir.path());

        let summary = run(&datasets(), &AnalysisConfig::default(), &writer).unwrap();
        assert_eq!(summary.written.len(), 6);
        assert!(summary.failed.is_empty());
        assert!(summary.written.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_missing_target_skips_its_artifacts() {
        let temp_dir = tempdir().unwrap();
        let writer = ArtifactWriter::new(temp_dir.path());
        let analysis = AnalysisConfig {
            target_products: vec!["NO EXISTE".to_string()],
            ..AnalysisConfig::default()
        };

        let summary = run(&datasets(), &analysis, &writer).unwrap();
        assert!(summary.growth.is_none());
        assert_eq!(summary.written.len(), 4);
        assert!(!temp_dir.path().join(artifact::GROWTH).exists());
    }

    #[test]
    fn test_write_failures_do_not_abort() {
        let temp_dir = tempdir().unwrap();
        let blocker = temp_dir.path().join("output");
        std::fs::write(&blocker, "file in the way").unwrap();
        let writer = ArtifactWriter::new(blocker);

        let summary = run(&datasets(), &AnalysisConfig::default(), &writer).unwrap();
        assert!(summary.written.is_empty());
        assert_eq!(summary.failed.len(), 6);
        assert!(summary.growth.is_some());
    }
}
