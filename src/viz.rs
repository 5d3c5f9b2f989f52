//! Presentation of the written artifacts: bar charts (Plotters, SVG) and text panels.
//!
//! Every panel is built independently; a missing or malformed artifact turns
//! into a warning for that panel only.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use plotters::prelude::*;
use polars::prelude::{CsvReadOptions, DataFrame, DataType, SerReader, SortMultipleOptions};
use tracing::{debug, warn};

use crate::schema::{artifact, derived, sale};

/// Bars shown per ranking chart.
const TOP_N: usize = 20;

/// Sub-directory of the output directory receiving the charts.
pub const CHARTS_DIR: &str = "charts";

/// One rendered section of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Chart { title: String, path: PathBuf },
    Text { title: String, content: String },
    Warning { title: String, message: String },
}

impl Panel {
    pub fn title(&self) -> &str {
        match self {
            Panel::Chart { title, .. }
            | Panel::Text { title, .. }
            | Panel::Warning { title, .. } => title.as_str(),
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Panel::Warning { .. })
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.title())?;
        match self {
            Panel::Chart { path, .. } => writeln!(f, "Chart saved to: {}", path.display()),
            Panel::Text { content, .. } => writeln!(f, "{content}"),
            Panel::Warning { message, .. } => writeln!(f, "⚠ {message}"),
        }
    }
}

/// Build all dashboard panels from the artifacts in `output_dir`.
pub fn render_dashboard(output_dir: &Path) -> Vec<Panel> {
    let charts_dir = output_dir.join(CHARTS_DIR);

    let panels = vec![
        guarded(
            "Pregunta 2: Top productos por volumen vendido (litros)",
            "No se pudo cargar la salida de pregunta 2.",
            || pareto_chart(output_dir, &charts_dir),
        ),
        guarded(
            "Pregunta 3: Frecuencia de venta por producto",
            "No se pudo cargar la salida de pregunta 3.",
            || frequency_chart(output_dir, &charts_dir),
        ),
        guarded(
            "Pregunta 4: Variación de ventas entre períodos",
            "No se encontró el archivo de variación de ventas.",
            || read_text(&output_dir.join(artifact::VARIATION)),
        ),
        guarded(
            "Pregunta 5: Ventas mensuales del producto objetivo",
            "No se pudieron cargar los resultados de la pregunta 5.",
            || monthly_chart(output_dir, &charts_dir),
        ),
        guarded(
            "Pregunta 5: Causa del crecimiento",
            "No se pudieron cargar los resultados de la pregunta 5.",
            || read_text(&output_dir.join(artifact::GROWTH)),
        ),
    ];

    let warnings = panels.iter().filter(|p| p.is_warning()).count();
    debug!(panels = panels.len(), warnings, "Dashboard rendered");
    panels
}

/// Run one panel builder, turning its failure into an inline warning.
fn guarded<F>(title: &str, message: &str, build: F) -> Panel
where
    F: FnOnce() -> crate::Result<PanelBody>,
{
    let title = title.to_string();
    match build() {
        Ok(PanelBody::Chart(path)) => Panel::Chart { title, path },
        Ok(PanelBody::Text(content)) => Panel::Text { title, content },
        Err(e) => {
            warn!(panel = %title, error = %e, "Panel unavailable");
            Panel::Warning {
                title,
                message: message.to_string(),
            }
        }
    }
}

enum PanelBody {
    Chart(PathBuf),
    Text(String),
}

fn pareto_chart(output_dir: &Path, charts_dir: &Path) -> crate::Result<PanelBody> {
    let df = read_artifact(&output_dir.join(artifact::PARETO))?
        .sort(
            [derived::LITERS],
            SortMultipleOptions::default().with_order_descending(true),
        )?
        .head(Some(TOP_N));
    let (labels, values) = labels_and_values(&df, sale::BARCODE, derived::LITERS)?;

    let path = charts_dir.join("pregunta_2_pareto.svg");
    create_bar_chart(
        &path,
        "Top productos por litros vendidos",
        &labels,
        &values,
        ("Código de barras", "Litros"),
        &BLUE,
    )?;
    Ok(PanelBody::Chart(path))
}

fn frequency_chart(output_dir: &Path, charts_dir: &Path) -> crate::Result<PanelBody> {
    let df = read_artifact(&output_dir.join(artifact::FREQUENCY))?
        .sort([derived::FREQUENCY], SortMultipleOptions::default())?
        .head(Some(TOP_N));
    let (labels, values) = labels_and_values(&df, sale::BARCODE, derived::FREQUENCY)?;

    let path = charts_dir.join("pregunta_3_frecuencia.svg");
    create_bar_chart(
        &path,
        "Top productos más frecuentes (menor frecuencia = más venta)",
        &labels,
        &values,
        ("Código de barras", "Frecuencia"),
        &GREEN,
    )?;
    Ok(PanelBody::Chart(path))
}

fn monthly_chart(output_dir: &Path, charts_dir: &Path) -> crate::Result<PanelBody> {
    let df = read_artifact(&output_dir.join(artifact::MONTHLY))?;
    let (labels, values) = labels_and_values(&df, derived::MONTH, derived::UNITS)?;

    let path = charts_dir.join("pregunta_5_mensual.svg");
    create_bar_chart(
        &path,
        "Ventas mensuales del producto",
        &labels,
        &values,
        ("Mes", "Unidades vendidas"),
        &MAGENTA,
    )?;
    Ok(PanelBody::Chart(path))
}

fn read_text(path: &Path) -> crate::Result<PanelBody> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(PanelBody::Text(content))
}

fn read_artifact(path: &Path) -> crate::Result<DataFrame> {
    if !path.is_file() {
        anyhow::bail!("Artifact not found: {}", path.display());
    }
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .with_context(|| format!("Malformed artifact: {}", path.display()))?;
    Ok(df)
}

/// Labels as text and values as floats, nulls read as empty / zero.
fn labels_and_values(
    df: &DataFrame,
    label_column: &str,
    value_column: &str,
) -> crate::Result<(Vec<String>, Vec<f64>)> {
    let labels = df
        .column(label_column)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let values = df
        .column(value_column)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;

    let labels: Vec<String> = labels
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect();
    let values: Vec<f64> = values.f64()?.into_iter().map(|v| v.unwrap_or(0.0)).collect();
    Ok((labels, values))
}

/// Draw a vertical bar chart with one labelled bar per value.
pub fn create_bar_chart(
    output_path: &Path,
    title: &str,
    labels: &[String],
    values: &[f64],
    (x_desc, y_desc): (&str, &str),
    color: &RGBColor,
) -> crate::Result<()> {
    if values.is_empty() {
        anyhow::bail!("Nothing to plot for {}", output_path.display());
    }
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let n = values.len();
    let max_value = values.iter().cloned().fold(0.0, f64::max);
    let y_max = if max_value > 0.0 { max_value * 1.1 } else { 1.0 };

    let root = SVGBackend::new(output_path, (1200, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)?;

    let label_at = |x: &f64| {
        let index = x.round();
        if (x - index).abs() < 1e-6 && index >= 0.0 {
            labels.get(index as usize).cloned().unwrap_or_default()
        } else {
            String::new()
        }
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&label_at)
        .x_desc(x_desc)
        .y_desc(y_desc)
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(values.iter().enumerate().map(|(i, &value)| {
        Rectangle::new(
            [(i as f64 - 0.4, 0.0), (i as f64 + 0.4, value)],
            color.filled(),
        )
    }))?;

    root.present()?;
    debug!(path = %output_path.display(), bars = n, "Bar chart saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ArtifactWriter;
    use polars::prelude::*;
    use tempfile::tempdir;

    fn write_artifacts(dir: &Path) {
        let writer = ArtifactWriter::new(dir);
        let pareto = df!(
            "barcode" => ["A", "C"],
            "liters" => [40.0, 20.0],
            "liters_pct" => [0.5, 0.25],
            "liters_cum" => [0.5, 0.75],
        )
        .unwrap();
        writer.write_csv(artifact::PARETO, &pareto).unwrap();
        writer
            .write_text(artifact::VARIATION, "Variación porcentual: +50.00%")
            .unwrap();
    }

    #[test]
    fn test_create_bar_chart() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("charts").join("bars.svg");

        let labels = vec!["A".to_string(), "B".to_string()];
        create_bar_chart(&path, "Test", &labels, &[3.0, 1.5], ("x", "y"), &BLUE).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_empty_chart_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("empty.svg");
        assert!(create_bar_chart(&path, "Test", &[], &[], ("x", "y"), &BLUE).is_err());
    }

    #[test]
    fn test_missing_artifacts_become_warnings() {
        let temp_dir = tempdir().unwrap();
        write_artifacts(temp_dir.path());

        let panels = render_dashboard(temp_dir.path());
        assert_eq!(panels.len(), 5);

        assert!(matches!(&panels[0], Panel::Chart { path, .. } if path.exists()));
        assert!(panels[1].is_warning());
        assert!(matches!(&panels[2], Panel::Text { content, .. } if content.contains("+50.00%")));
        assert!(panels[3].is_warning());
        assert!(panels[4].is_warning());
    }

    #[test]
    fn test_malformed_artifact_only_affects_its_panel() {
        let temp_dir = tempdir().unwrap();
        write_artifacts(temp_dir.path());
        std::fs::write(
            temp_dir.path().join(artifact::FREQUENCY),
            "barcode,outlet\nA,P1\n",
        )
        .unwrap();

        let panels = render_dashboard(temp_dir.path());
        assert!(panels[1].is_warning());
        assert!(!panels[0].is_warning());
        assert!(!panels[2].is_warning());
    }
}
