//! `path`, `reachable` and `connected` handlers.

use std::io::Write;

use anyhow::{Context, Result};

use provpath_lib::{PathRequest, PathfindingService, RoadClass};

use crate::output::{
    write_connectivity, write_json, write_path, write_reachable, OutputFormat, PathOutput,
};
use crate::terminal::ColorPalette;

/// Arguments for the `path` command.
#[derive(Debug, Clone)]
pub struct PathArgs {
    pub from: String,
    pub to: String,
    pub road_class: RoadClass,
    /// Disable fuzzy name matching.
    pub exact: bool,
    pub real_distance: bool,
}

impl PathArgs {
    pub fn to_request(&self) -> PathRequest {
        PathRequest::new(self.from.clone(), self.to.clone())
            .with_fuzzy_match(!self.exact)
            .with_road_class(self.road_class)
            .with_real_distance(self.real_distance)
    }
}

/// clap value parser for `--road-class`.
pub fn parse_road_class(value: &str) -> std::result::Result<RoadClass, String> {
    value.parse().map_err(|e: provpath_lib::Error| e.to_string())
}

pub fn handle_path_command<W: Write>(
    service: &PathfindingService,
    args: &PathArgs,
    format: OutputFormat,
    palette: &ColorPalette,
    out: &mut W,
) -> Result<()> {
    let result = service.find_path(&args.to_request())?;
    match format {
        OutputFormat::Json => write_json(
            out,
            &PathOutput {
                hop_count: result.hop_count(),
                result: &result,
            },
        ),
        OutputFormat::Text => write_path(out, &result, palette),
    }
    .context("failed to write path")
}

pub fn handle_reachable_command<W: Write>(
    service: &PathfindingService,
    from: &str,
    max_hops: Option<usize>,
    format: OutputFormat,
    palette: &ColorPalette,
    out: &mut W,
) -> Result<()> {
    let regions = service.reachable(from, max_hops)?;
    match format {
        OutputFormat::Json => write_json(out, &regions),
        OutputFormat::Text => write_reachable(out, from, &regions, palette),
    }
    .context("failed to write reachable regions")
}

pub fn handle_connected_command<W: Write>(
    service: &PathfindingService,
    first: &str,
    second: &str,
    format: OutputFormat,
    palette: &ColorPalette,
    out: &mut W,
) -> Result<()> {
    let report = service.check_connectivity(first, second)?;
    match format {
        OutputFormat::Json => write_json(out, &report),
        OutputFormat::Text => write_connectivity(out, &report, palette),
    }
    .context("failed to write connectivity report")
}

#[cfg(test)]
mod tests {
    use provpath_lib::Error as LibError;

    use super::*;
    use crate::commands::test_support::{render, service};

    fn args(from: &str, to: &str) -> PathArgs {
        PathArgs {
            from: from.to_string(),
            to: to.to_string(),
            road_class: RoadClass::Unspecified,
            exact: false,
            real_distance: false,
        }
    }

    #[test]
    fn parse_road_class_accepts_known_names() {
        assert_eq!(parse_road_class("Highway"), Ok(RoadClass::Highway));
        assert_eq!(parse_road_class("direct"), Ok(RoadClass::Direct));
        assert!(parse_road_class("motorway").unwrap_err().contains("road_class"));
    }

    #[test]
    fn exact_disables_fuzzy_matching() {
        let mut path_args = args("Hanoi", "48");
        assert!(path_args.to_request().fuzzy_match);
        path_args.exact = true;
        assert!(!path_args.to_request().fuzzy_match);
    }

    #[test]
    fn path_json_output() {
        let service = service();
        let text = render(|out| {
            handle_path_command(
                &service,
                &args("Hà Nội", "Đà Nẵng"),
                OutputFormat::Json,
                &ColorPalette::plain(),
                out,
            )
        });
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["hop_count"], 7);
    }

    #[test]
    fn unknown_region_surfaces_library_error() {
        let service = service();
        let err = handle_path_command(
            &service,
            &args("Hanoy", "48"),
            OutputFormat::Text,
            &ColorPalette::plain(),
            &mut Vec::<u8>::new(),
        )
        .unwrap_err();

        match err.downcast_ref::<LibError>() {
            Some(LibError::RegionNotFound { suggestions, .. }) => {
                assert!(suggestions.iter().any(|s| s == "Hà Nội"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn reachable_text_output() {
        let service = service();
        let text = render(|out| {
            handle_reachable_command(
                &service,
                "Cà Mau",
                Some(1),
                OutputFormat::Text,
                &ColorPalette::plain(),
                out,
            )
        });
        assert!(text.starts_with("3 regions reachable from Cà Mau\n"));
    }

    #[test]
    fn connected_json_output() {
        let service = service();
        let text = render(|out| {
            handle_connected_command(
                &service,
                "12",
                "96",
                OutputFormat::Json,
                &ColorPalette::plain(),
                out,
            )
        });
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["connected"], true);
    }
}
