//! Artifact persistence and narrative reports

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{AnalysisError, AnalysisResult};
use crate::questions::{PeriodVariation, ProductGrowth};
use crate::questions::variation::{PERIOD_A, PERIOD_B};

/// Writes artifacts into one output directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `df` as a headed CSV file named `name`.
    pub fn write_csv(&self, name: &str, df: &DataFrame) -> AnalysisResult<PathBuf> {
        let path = self.dir.join(name);
        self.persist(&path, |path| {
            let mut file = File::create(path)?;
            let mut df = df.clone();
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut df)?;
            Ok(())
        })?;
        info!(path = %path.display(), rows = df.height(), "CSV artifact written");
        Ok(path)
    }

    /// Write a UTF-8 text artifact named `name`.
    pub fn write_text(&self, name: &str, text: &str) -> AnalysisResult<PathBuf> {
        let path = self.dir.join(name);
        self.persist(&path, |path| Ok(fs::write(path, text)?))?;
        info!(path = %path.display(), "Text artifact written");
        Ok(path)
    }

    fn persist<F>(&self, path: &Path, write: F) -> AnalysisResult<()>
    where
        F: FnOnce(&Path) -> AnalysisResult<()>,
    {
        let result = fs::create_dir_all(&self.dir)
            .map_err(AnalysisError::from)
            .and_then(|_| write(path));

        result.map_err(|source| AnalysisError::Write {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        debug!(dir = %self.dir.display(), "Output directory ready");
        Ok(())
    }
}

/// Round to whole units and group thousands with commas, e.g. `1,234,568`.
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Narrative for the period comparison.
pub fn variation_report(variation: &PeriodVariation) -> String {
    let mut out = String::new();
    out.push_str("Variación de ventas de Aguas Saborizadas\n\n");
    out.push_str("Periodo comparado:\n");
    out.push_str(&format!(
        "- {}: {} unidades\n",
        PERIOD_A.label,
        format_thousands(variation.total_a)
    ));
    out.push_str(&format!(
        "- {}: {} unidades\n\n",
        PERIOD_B.label,
        format_thousands(variation.total_b)
    ));
    out.push_str(&format!("Variación porcentual: {}\n\n", variation.change));
    out.push_str("Interpretación:\n");
    let direction = match variation.change.as_f64() {
        v if v > 0.0 => "un crecimiento",
        v if v < 0.0 => "una caída",
        _ => "estabilidad",
    };
    out.push_str(&format!(
        "Se observa {direction} en el volumen total de ventas entre los dos períodos. "
    ));
    out.push_str(
        "El cambio puede deberse a factores estacionales, promociones comerciales \
         o a una distinta disponibilidad en puntos de venta.\n",
    );
    out
}

/// Narrative for the target product's growth.
pub fn growth_report(growth: &ProductGrowth) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Análisis del crecimiento de ventas: {}\n\n",
        growth.description
    ));
    out.push_str("Ventas mensuales:\n");
    out.push_str(&format!("- Agosto: {} unidades\n", format_thousands(growth.august)));
    out.push_str(&format!(
        "- Septiembre: {} unidades\n\n",
        format_thousands(growth.september)
    ));
    out.push_str(&format!("Crecimiento intermensual: {}\n\n", growth.change));
    out.push_str("Posibles causas:\n");
    for cause in [
        "Aumento en la distribución del producto en puntos de venta clave",
        "Acciones promocionales específicas o descuentos en septiembre",
        "Comportamiento estacional (mayor consumo en primavera)",
        "Campañas de marketing o reposicionamiento de marca",
    ] {
        out.push_str(&format!("- {cause}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::Change;
    use tempfile::tempdir;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(1234567.6), "1,234,568");
        assert_eq!(format_thousands(-45210.0), "-45,210");
    }

    #[test]
    fn test_variation_report_contents() {
        let report = variation_report(&PeriodVariation::from_totals(12500.0, 18750.0));
        assert!(report.contains("- Junio a Agosto: 12,500 unidades"));
        assert!(report.contains("- Septiembre a Noviembre: 18,750 unidades"));
        assert!(report.contains("Variación porcentual: +50.00%"));

        let report = variation_report(&PeriodVariation::from_totals(0.0, 10.0));
        assert!(report.contains("Variación porcentual: +infinity"));
    }

    #[test]
    fn test_growth_report_contents() {
        let growth = ProductGrowth {
            barcode: "200".to_string(),
            description: "SALUS FRUTTE CERO ANANA 1,65L".to_string(),
            monthly: DataFrame::empty(),
            august: 2000.0,
            september: 3000.0,
            change: Change::Percent(50.0),
        };

        let report = growth_report(&growth);
        assert!(
            report.starts_with("Análisis del crecimiento de ventas: SALUS FRUTTE CERO ANANA 1,65L")
        );
        assert!(report.contains("- Agosto: 2,000 unidades"));
        assert!(report.contains("- Septiembre: 3,000 unidades"));
        assert!(report.contains("Crecimiento intermensual: +50.00%"));
    }

    #[test]
    fn test_writer_creates_directory() {
        let temp_dir = tempdir().unwrap();
        let writer = ArtifactWriter::new(temp_dir.path().join("nested").join("output"));

        let df = df!("month" => ["2020-08"], "units" => [200.0]).unwrap();
        let csv = writer.write_csv("monthly.csv", &df).unwrap();
        let txt = writer.write_text("report.txt", "hola").unwrap();

        assert_eq!(fs::read_to_string(&csv).unwrap().lines().next(), Some("month,units"));
        assert_eq!(fs::read_to_string(&txt).unwrap(), "hola");
    }

    #[test]
    fn test_write_failure_names_the_file() {
        let temp_dir = tempdir().unwrap();
        let blocker = temp_dir.path().join("blocked");
        fs::write(&blocker, "not a directory").unwrap();

        let writer = ArtifactWriter::new(blocker.clone());
        let err = writer.write_text("report.txt", "hola").unwrap_err();
        assert!(matches!(err, AnalysisError::Write { .. }));
        assert!(err.to_string().contains("report.txt"));
    }
}
