//! Report writer for strategy comparisons: JSON, text table, and HTML chart.

use std::fs;
use std::path::{Path, PathBuf};

use plotly::layout::Axis;
use plotly::{Bar, Layout, Plot};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ExperimentName;
use crate::report::ComparisonReport;

/// Writes comparison reports to an output directory.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_comparison.json`,
/// `{experiment}_comparison.txt`, and `{experiment}_profit.html`.
pub struct ReportWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ReportWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write the report to `{experiment}_comparison.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`].
    #[instrument(skip_all)]
    pub fn write_json(&self, report: &ComparisonReport) -> Result<PathBuf, IoError> {
        let path = self.path_for("comparison.json");
        let artifact = ComparisonArtifact {
            experiment: self.experiment.as_str(),
            report,
        };
        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::Serialize {
            artifact: "comparison report",
            source: e,
        })?;
        self.write(&path, &json)?;
        info!(path = %path.display(), "comparison JSON written");
        Ok(path)
    }

    /// Write the fixed-width table to `{experiment}_comparison.txt`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_text(&self, report: &ComparisonReport) -> Result<PathBuf, IoError> {
        let path = self.path_for("comparison.txt");
        self.write(&path, &report.to_string())?;
        info!(path = %path.display(), "comparison table written");
        Ok(path)
    }

    /// Write a bar chart of total profit per strategy to
    /// `{experiment}_profit.html`, bars in report (descending) order.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_profit_chart(&self, report: &ComparisonReport) -> Result<PathBuf, IoError> {
        let path = self.path_for("profit.html");
        let plot = profit_chart(report, self.experiment.as_str());
        self.write(&path, &plot.to_html())?;
        info!(path = %path.display(), "profit chart written");
        Ok(path)
    }

    /// Write all three artifacts and return their paths.
    ///
    /// # Errors
    ///
    /// Propagates the first failure of the individual writers.
    pub fn write_all(&self, report: &ComparisonReport) -> Result<Vec<PathBuf>, IoError> {
        Ok(vec![
            self.write_json(report)?,
            self.write_text(report)?,
            self.write_profit_chart(report)?,
        ])
    }

    fn path_for(&self, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{suffix}", self.experiment.as_str()))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), IoError> {
        fs::write(path, contents).map_err(|e| IoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Build the descending total-profit bar chart.
#[must_use]
pub fn profit_chart(report: &ComparisonReport, experiment: &str) -> Plot {
    let names: Vec<String> = report.rows.iter().map(|r| r.balancing.clone()).collect();
    let profits: Vec<f64> = report.rows.iter().map(|r| r.total_profit).collect();

    let mut plot = Plot::new();
    plot.add_trace(Bar::new(names, profits).name("Total profit"));
    plot.set_layout(
        Layout::new()
            .title(format!("Total profit by balancing strategy ({experiment})").as_str())
            .x_axis(Axis::new().title("Balancing"))
            .y_axis(Axis::new().title("Total profit")),
    );
    plot
}

// --- Shadow struct for JSON serialization ---

#[derive(Serialize)]
struct ComparisonArtifact<'a> {
    experiment: &'a str,
    #[serde(flatten)]
    report: &'a ComparisonReport,
}
