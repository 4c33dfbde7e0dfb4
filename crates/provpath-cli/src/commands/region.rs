//! Region lookup handlers: `info`, `search`, `regions` and `stats`.

use std::io::Write;

use anyhow::{Context, Result};

use provpath_lib::PathfindingService;

use crate::output::{write_json, write_region_info, write_region_list, write_stats, OutputFormat};
use crate::terminal::ColorPalette;

/// Default `--limit` for `search`.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

pub fn handle_info_command<W: Write>(
    service: &PathfindingService,
    identifier: &str,
    format: OutputFormat,
    palette: &ColorPalette,
    out: &mut W,
) -> Result<()> {
    let info = service.region_info(identifier)?;
    match format {
        OutputFormat::Json => write_json(out, &info),
        OutputFormat::Text => write_region_info(out, &info, palette),
    }
    .context("failed to write region info")
}

pub fn handle_search_command<W: Write>(
    service: &PathfindingService,
    query: &str,
    limit: usize,
    format: OutputFormat,
    palette: &ColorPalette,
    out: &mut W,
) -> Result<()> {
    if limit == 0 {
        anyhow::bail!("--limit must be at least 1");
    }
    let regions = service.search(query, Some(limit))?;
    match format {
        OutputFormat::Json => write_json(out, &regions),
        OutputFormat::Text => write_region_list(out, &regions, palette),
    }
    .context("failed to write search results")
}

pub fn handle_regions_command<W: Write>(
    service: &PathfindingService,
    format: OutputFormat,
    palette: &ColorPalette,
    out: &mut W,
) -> Result<()> {
    let regions = service.regions()?;
    match format {
        OutputFormat::Json => write_json(out, &regions),
        OutputFormat::Text => write_region_list(out, &regions, palette),
    }
    .context("failed to write region list")
}

pub fn handle_stats_command<W: Write>(
    service: &PathfindingService,
    format: OutputFormat,
    palette: &ColorPalette,
    out: &mut W,
) -> Result<()> {
    let stats = service.stats()?;
    match format {
        OutputFormat::Json => write_json(out, &stats),
        OutputFormat::Text => write_stats(out, &stats, palette),
    }
    .context("failed to write statistics")
}
