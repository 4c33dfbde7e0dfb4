use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::region::{RegionCode, RegionRecord};
use crate::registry::RegionRegistry;

/// Region rows file name inside a data directory.
pub const PROVINCES_FILENAME: &str = "provinces.json";
/// Adjacency map file name inside a data directory.
pub const ADJACENCY_FILENAME: &str = "adjacency.json";

const DATA_DIR_ENV: &str = "PROVPATH_DATA_DIR";

/// Parsed dataset files, validated for cross-references.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<RegionRecord>,
    pub adjacency: HashMap<RegionCode, Vec<RegionCode>>,
}

/// A neighbor relation declared on only one side.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Asymmetry {
    /// Region whose list contains `missing_from`.
    pub declared_by: RegionCode,
    /// Region whose list lacks `declared_by`.
    pub missing_from: RegionCode,
}

impl Dataset {
    /// Validate that every adjacency key and neighbor names a declared region.
    pub fn new(
        records: Vec<RegionRecord>,
        adjacency: HashMap<RegionCode, Vec<RegionCode>>,
    ) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::EmptyDataset { what: "regions" });
        }
        if adjacency.is_empty() {
            return Err(Error::EmptyDataset { what: "adjacency" });
        }

        let codes: HashSet<&str> = records.iter().map(|r| r.code.trim()).collect();
        let mut keys: Vec<&RegionCode> = adjacency.keys().collect();
        keys.sort();
        for key in keys {
            if !codes.contains(key.as_str()) {
                return Err(Error::UnknownAdjacencyKey { code: key.clone() });
            }
            for neighbor in &adjacency[key] {
                if !codes.contains(neighbor.as_str()) {
                    return Err(Error::UnknownNeighbor {
                        code: key.clone(),
                        neighbor: neighbor.clone(),
                    });
                }
            }
        }

        Ok(Self { records, adjacency })
    }

    /// Initialize a fresh registry from this dataset.
    pub fn into_registry(self) -> Result<RegionRegistry> {
        let mut registry = RegionRegistry::new();
        registry.initialize(self.records, &self.adjacency)?;
        Ok(registry)
    }

    pub fn region_count(&self) -> usize {
        self.records.len()
    }

    /// Neighbor relations declared on one side only, sorted.
    pub fn asymmetries(&self) -> Vec<Asymmetry> {
        adjacency_asymmetries(&self.adjacency)
    }

    /// Codes that list themselves as a neighbor, sorted. The graph builder
    /// ignores these entries.
    pub fn self_references(&self) -> Vec<RegionCode> {
        let mut codes: Vec<RegionCode> = self
            .adjacency
            .iter()
            .filter(|(code, neighbors)| neighbors.contains(code))
            .map(|(code, _)| code.clone())
            .collect();
        codes.sort();
        codes
    }
}

/// List every "A lists B but B does not list A" relation.
pub fn adjacency_asymmetries(
    adjacency: &HashMap<RegionCode, Vec<RegionCode>>,
) -> Vec<Asymmetry> {
    let mut found: Vec<Asymmetry> = adjacency
        .iter()
        .flat_map(|(code, neighbors)| {
            neighbors.iter().filter_map(move |neighbor| {
                let reciprocated = adjacency
                    .get(neighbor)
                    .is_some_and(|back| back.iter().any(|c| c == code));
                (!reciprocated).then(|| Asymmetry {
                    declared_by: code.clone(),
                    missing_from: neighbor.clone(),
                })
            })
        })
        .collect();
    found.sort();
    found.dedup();
    found
}

/// Pick the data directory: explicit path, then `PROVPATH_DATA_DIR`, then the
/// platform data directory.
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        debug!(path = %path.display(), "using explicit data directory");
        return Ok(path.to_path_buf());
    }
    if let Ok(value) = env::var(DATA_DIR_ENV) {
        if !value.trim().is_empty() {
            debug!(path = %value, "using data directory from {}", DATA_DIR_ENV);
            return Ok(PathBuf::from(value));
        }
    }
    default_data_dir()
}

/// Platform-specific data directory for provpath.
pub fn default_data_dir() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("org", "provpath", "provpath").ok_or(Error::DataDirUnavailable)?;
    Ok(dirs.data_dir().to_path_buf())
}

/// Read and validate `provinces.json` and `adjacency.json` from `dir`.
pub fn load_dataset(dir: &Path) -> Result<Dataset> {
    let provinces_path = dir.join(PROVINCES_FILENAME);
    let adjacency_path = dir.join(ADJACENCY_FILENAME);

    let records: Vec<RegionRecord> = read_json(&provinces_path)?;
    let adjacency: HashMap<RegionCode, Vec<RegionCode>> = read_json(&adjacency_path)?;
    let dataset = Dataset::new(records, adjacency)?;

    info!(
        dir = %dir.display(),
        regions = dataset.region_count(),
        "loaded region dataset"
    );
    Ok(dataset)
}

/// Load the dataset in `dir` straight into an initialized registry.
pub fn load_registry(dir: &Path) -> Result<RegionRegistry> {
    load_dataset(dir)?.into_registry()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::DatasetNotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
