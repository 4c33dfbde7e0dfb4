//! Output formatting for command results.
//!
//! Every command renders either as human-readable text or as pretty-printed
//! JSON. Text writers take a [`ColorPalette`] so tests can render with
//! [`ColorPalette::plain`] and compare plain strings.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use provpath_lib::{
    ConnectivityReport, PathResult, ReachableRegion, RegionInfo, RegionSummary, ServiceStats,
};

use crate::commands::data::DataReport;
use crate::terminal::{format_km, ColorPalette};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// JSON shape of a path lookup: the hop count next to the full result.
#[derive(Debug, Serialize)]
pub struct PathOutput<'a> {
    pub hop_count: usize,
    #[serde(flatten)]
    pub result: &'a PathResult,
}

/// Write `value` as pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

/// Render a path as a numbered list of regions with per-leg distances.
pub fn write_path<W: Write>(
    out: &mut W,
    result: &PathResult,
    palette: &ColorPalette,
) -> io::Result<()> {
    let p = palette;
    let (Some(start), Some(end)) = (result.start(), result.end()) else {
        return writeln!(out, "Empty path");
    };

    writeln!(
        out,
        "Path from {}{}{} to {}{}{}: {} {} (road class {})",
        p.white_bold,
        start.name,
        p.reset,
        p.white_bold,
        end.name,
        p.reset,
        result.hop_count(),
        if result.hop_count() == 1 { "hop" } else { "hops" },
        result.road_class,
    )?;

    let mut previous: Option<&str> = None;
    for (index, region) in result.path.iter().enumerate() {
        let leg = previous.and_then(|from| {
            result.segments.as_ref().and_then(|segments| {
                segments
                    .iter()
                    .find(|s| s.from == from && s.to == region.code)
            })
        });
        let marker = if index == 0 { "  " } else { p.arrow };
        write!(
            out,
            " {:>2} {} {}{}{} {}{}{}",
            index, marker, p.gray, region.code, p.reset, p.white_bold, region.name, p.reset
        )?;
        match leg {
            Some(segment) => writeln!(
                out,
                "  {}+{}{}",
                p.cyan,
                format_km(segment.distance_km),
                p.reset
            )?,
            None => writeln!(out)?,
        }
        previous = Some(region.code.as_str());
    }

    writeln!(out)?;
    match result.estimated_distance_km {
        Some(km) => writeln!(
            out,
            "Estimated distance: {}{}{}",
            p.cyan,
            format_km(km),
            p.reset
        )?,
        None => writeln!(
            out,
            "Estimated distance: {}unavailable (missing coordinates){}",
            p.gray, p.reset
        )?,
    }
    if let Some(km) = result.real_distance_km {
        writeln!(out, "Road distance:      {}{}{}", p.cyan, format_km(km), p.reset)?;
    }
    writeln!(
        out,
        "{}Search took {} ms{}",
        p.gray,
        result.search_duration.as_millis(),
        p.reset
    )
}

/// Render reachable regions grouped by hop count.
pub fn write_reachable<W: Write>(
    out: &mut W,
    start: &str,
    regions: &[ReachableRegion],
    palette: &ColorPalette,
) -> io::Result<()> {
    let p = palette;
    writeln!(
        out,
        "{} regions reachable from {}{}{}",
        regions.len(),
        p.white_bold,
        start,
        p.reset
    )?;

    let mut current_hop = None;
    for region in regions {
        if current_hop != Some(region.hops) {
            writeln!(out, "{}{} hops:{}", p.gray, region.hops, p.reset)?;
            current_hop = Some(region.hops);
        }
        writeln!(out, "  {}{}{} {}", p.gray, region.code, p.reset, region.name)?;
    }
    Ok(())
}

pub fn write_connectivity<W: Write>(
    out: &mut W,
    report: &ConnectivityReport,
    palette: &ColorPalette,
) -> io::Result<()> {
    let p = palette;
    let (color, verdict) = if report.connected {
        (p.green, "connected")
    } else {
        (p.red, "not connected")
    };
    writeln!(
        out,
        "{} ({}) and {} ({}) are {}{}{}",
        report.first.name,
        report.first.code,
        report.second.name,
        report.second.code,
        color,
        verdict,
        p.reset
    )
}

pub fn write_region_info<W: Write>(
    out: &mut W,
    info: &RegionInfo,
    palette: &ColorPalette,
) -> io::Result<()> {
    let p = palette;
    writeln!(
        out,
        "{}{}{} {}({}){}",
        p.white_bold, info.name, p.reset, p.gray, info.code, p.reset
    )?;
    writeln!(out, "  Full name:   {}", info.full_name)?;
    if let Some(name_en) = &info.full_name_en {
        writeln!(out, "  English:     {}", name_en)?;
    }
    if let Some(code_name) = &info.code_name {
        writeln!(out, "  Code name:   {}", code_name)?;
    }
    match (info.latitude, info.longitude) {
        (Some(lat), Some(lon)) => writeln!(out, "  Coordinates: {:.4}, {:.4}", lat, lon)?,
        _ => writeln!(out, "  Coordinates: {}unknown{}", p.gray, p.reset)?,
    }
    writeln!(out, "  Neighbors ({}):", info.neighbor_count)?;
    for neighbor in &info.neighbors {
        writeln!(
            out,
            "    {}{}{} {}",
            p.gray, neighbor.code, p.reset, neighbor.name
        )?;
    }
    Ok(())
}

/// Render a region table, one row per region.
pub fn write_region_list<W: Write>(
    out: &mut W,
    regions: &[RegionSummary],
    palette: &ColorPalette,
) -> io::Result<()> {
    let p = palette;
    if regions.is_empty() {
        return writeln!(out, "No regions found");
    }
    for region in regions {
        writeln!(
            out,
            "{}{}{}  {:<16} {}{} neighbors{}",
            p.gray,
            region.code,
            p.reset,
            region.name,
            p.gray,
            region.neighbor_count,
            p.reset
        )?;
    }
    writeln!(out, "{} regions", regions.len())
}

pub fn write_stats<W: Write>(
    out: &mut W,
    stats: &ServiceStats,
    palette: &ColorPalette,
) -> io::Result<()> {
    let p = palette;
    let graph = &stats.graph;
    writeln!(out, "Regions:    {}", graph.region_count)?;
    writeln!(out, "Edges:      {}", graph.edge_count)?;
    writeln!(
        out,
        "Neighbors:  avg {:.2}, min {}, max {}",
        graph.avg_neighbors, graph.min_neighbors, graph.max_neighbors
    )?;
    if stats.connected {
        writeln!(out, "Connected:  {}yes{}", p.green, p.reset)
    } else {
        writeln!(
            out,
            "Connected:  {}no{} (unreachable: {})",
            p.red,
            p.reset,
            stats.unreachable.join(", ")
        )
    }
}

/// Render a dataset validation report.
pub fn write_data_report<W: Write>(
    out: &mut W,
    report: &DataReport,
    palette: &ColorPalette,
) -> io::Result<()> {
    let p = palette;
    writeln!(out, "Dataset:    {}", report.data_dir)?;
    writeln!(out, "Regions:    {}", report.region_count)?;
    writeln!(out, "Edges:      {}", report.edge_count)?;

    if report.asymmetries.is_empty() {
        writeln!(out, "Adjacency:  {}symmetric{}", p.green, p.reset)?;
    } else {
        writeln!(
            out,
            "Adjacency:  {}{} one-sided relations (repaired on load){}",
            p.orange,
            report.asymmetries.len(),
            p.reset
        )?;
        for asymmetry in &report.asymmetries {
            writeln!(
                out,
                "  {} lists {}, but {} does not list {}",
                asymmetry.declared_by,
                asymmetry.missing_from,
                asymmetry.missing_from,
                asymmetry.declared_by
            )?;
        }
    }

    if !report.self_references.is_empty() {
        writeln!(
            out,
            "Self-listed: {}{}{} (ignored)",
            p.orange,
            report.self_references.join(", "),
            p.reset
        )?;
    }

    if report.missing_coordinates.is_empty() {
        writeln!(out, "Coordinates: {}complete{}", p.green, p.reset)?;
    } else {
        writeln!(
            out,
            "Coordinates: {}missing for {}{}",
            p.orange,
            report.missing_coordinates.join(", "),
            p.reset
        )?;
    }

    if report.connected {
        writeln!(out, "Connected:  {}yes{}", p.green, p.reset)
    } else {
        writeln!(
            out,
            "Connected:  {}no{} (unreachable: {})",
            p.red,
            p.reset,
            report.unreachable.join(", ")
        )
    }
}
