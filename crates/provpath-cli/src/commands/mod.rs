//! Handlers for CLI subcommands.
//!
//! `main.rs` parses arguments and dispatches here. Handlers write to any
//! `impl Write` so they can be exercised without spawning the binary.

pub mod data;
pub mod path;
pub mod region;

use std::path::Path;

use anyhow::{Context, Result};

use provpath_lib::{load_registry, resolve_data_dir, PathfindingService, RouteResolver};

/// Load the dataset and build the path service, attaching `resolver` if any.
pub fn load_service(
    data_dir: Option<&Path>,
    resolver: Option<RouteResolver>,
) -> Result<PathfindingService> {
    let dir = resolve_data_dir(data_dir).context("failed to resolve the dataset directory")?;
    let registry = load_registry(&dir)
        .with_context(|| format!("failed to load dataset from {}", dir.display()))?;
    let service = PathfindingService::new(registry).context("failed to build region graph")?;
    Ok(service.with_resolver(resolver))
}
