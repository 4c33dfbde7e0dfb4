//! `validate-data`: load the dataset and report integrity problems.

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use provpath_lib::{load_dataset, resolve_data_dir, Asymmetry, PathfindingService};

use crate::output::{write_data_report, write_json, OutputFormat};
use crate::terminal::ColorPalette;

/// Integrity summary for one dataset directory.
#[derive(Debug, Clone, Serialize)]
pub struct DataReport {
    pub data_dir: String,
    pub region_count: usize,
    pub edge_count: usize,
    /// One-sided neighbor declarations; the graph builder repairs these.
    pub asymmetries: Vec<Asymmetry>,
    /// Regions listing themselves as a neighbor; ignored by the graph builder.
    pub self_references: Vec<String>,
    /// Codes of regions without both coordinates.
    pub missing_coordinates: Vec<String>,
    pub connected: bool,
    pub unreachable: Vec<String>,
}

/// Load and check the dataset in `data_dir`.
pub fn build_report(data_dir: Option<&Path>) -> Result<DataReport> {
    let dir = resolve_data_dir(data_dir).context("failed to resolve the dataset directory")?;
    let dataset = load_dataset(&dir)
        .with_context(|| format!("failed to load dataset from {}", dir.display()))?;

    let asymmetries = dataset.asymmetries();
    let self_references = dataset.self_references();
    let mut missing_coordinates: Vec<String> = dataset
        .records
        .iter()
        .filter(|r| r.latitude.is_none() || r.longitude.is_none())
        .map(|r| r.code.clone())
        .collect();
    missing_coordinates.sort();

    let registry = dataset
        .into_registry()
        .context("dataset failed registry validation")?;
    let service = PathfindingService::new(registry).context("failed to build region graph")?;
    let stats = service.stats()?;

    Ok(DataReport {
        data_dir: dir.display().to_string(),
        region_count: stats.graph.region_count,
        edge_count: stats.graph.edge_count,
        asymmetries,
        self_references,
        missing_coordinates,
        connected: stats.connected,
        unreachable: stats.unreachable,
    })
}

/// Write the report, then fail if the graph is disconnected.
pub fn handle_validate_data_command<W: Write>(
    data_dir: Option<&Path>,
    format: OutputFormat,
    palette: &ColorPalette,
    out: &mut W,
) -> Result<()> {
    let report = build_report(data_dir)?;
    if !report.asymmetries.is_empty() {
        warn!(count = report.asymmetries.len(), "adjacency is not symmetric");
    }
    if !report.self_references.is_empty() {
        warn!(
            codes = %report.self_references.join(", "),
            "regions listed as their own neighbor"
        );
    }
    if !report.missing_coordinates.is_empty() {
        warn!(
            count = report.missing_coordinates.len(),
            "regions without coordinates"
        );
    }

    match format {
        OutputFormat::Json => write_json(out, &report),
        OutputFormat::Text => write_data_report(out, &report, palette),
    }
    .context("failed to write dataset report")?;

    if !report.connected {
        bail!(
            "region graph is disconnected; unreachable: {}",
            report.unreachable.join(", ")
        );
    }
    info!(regions = report.region_count, "dataset is valid");
    Ok(())
}
