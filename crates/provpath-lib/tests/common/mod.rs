//! Shared fixtures for provpath-lib integration tests.
//!
//! Small hand-built registries for property checks, plus helpers for the
//! checked-in dataset and a scripted routing transport.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use provpath_lib::resolver::RouteLeg;
use provpath_lib::{
    RegionRecord, RegionRegistry, RouteTransport, RoutingResponse, TransportFailure,
};

/// Checked-in dataset directory at the workspace root.
#[allow(dead_code)]
pub fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

#[allow(dead_code)]
pub fn record(code: &str, name: &str, coords: Option<(f64, f64)>) -> RegionRecord {
    RegionRecord {
        code: code.to_string(),
        name: name.to_string(),
        full_name: format!("Tỉnh {name}"),
        code_name: None,
        name_en: None,
        full_name_en: None,
        latitude: coords.map(|c| c.0),
        longitude: coords.map(|c| c.1),
    }
}

#[allow(dead_code)]
pub fn adjacency(entries: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(code, neighbors)| {
            (
                code.to_string(),
                neighbors.iter().map(|n| n.to_string()).collect(),
            )
        })
        .collect()
}

#[allow(dead_code)]
pub fn registry(
    records: Vec<RegionRecord>,
    adjacency: &HashMap<String, Vec<String>>,
) -> RegionRegistry {
    let mut registry = RegionRegistry::new();
    registry
        .initialize(records, adjacency)
        .expect("fixture registry initializes");
    registry
}

/// Hanoi (01) bordering Bac Ninh (24) and Phu Tho (25).
#[allow(dead_code)]
pub fn hanoi_triangle() -> RegionRegistry {
    registry(
        vec![
            record("01", "Hà Nội", Some((21.0285, 105.8542))),
            record("24", "Bắc Ninh", Some((21.1861, 106.0763))),
            record("25", "Phú Thọ", Some((21.3227, 105.4019))),
        ],
        &adjacency(&[("01", &["24", "25"]), ("24", &["01"]), ("25", &["01"])]),
    )
}

/// Adjacency declared on one side only: 01 lists 24 and 25, but neither lists 01.
#[allow(dead_code)]
pub fn one_sided() -> RegionRegistry {
    registry(
        vec![
            record("01", "Hà Nội", Some((21.0285, 105.8542))),
            record("24", "Bắc Ninh", Some((21.1861, 106.0763))),
            record("25", "Phú Thọ", Some((21.3227, 105.4019))),
        ],
        &adjacency(&[("01", &["24", "25"])]),
    )
}

/// 01 lists itself alongside 24.
#[allow(dead_code)]
pub fn self_listed() -> RegionRegistry {
    registry(
        vec![
            record("01", "Hà Nội", Some((21.0285, 105.8542))),
            record("24", "Bắc Ninh", Some((21.1861, 106.0763))),
        ],
        &adjacency(&[("01", &["01", "24"]), ("24", &["01"])]),
    )
}

/// A line 24 - 01 - 25 where 01 has no coordinates, plus an isolated 96.
#[allow(dead_code)]
pub fn missing_coordinates() -> RegionRegistry {
    registry(
        vec![
            record("01", "Hà Nội", None),
            record("24", "Bắc Ninh", Some((21.1861, 106.0763))),
            record("25", "Phú Thọ", Some((21.3227, 105.4019))),
            record("96", "Cà Mau", Some((9.1769, 105.1524))),
        ],
        &adjacency(&[("01", &["24", "25"]), ("24", &["01"]), ("25", &["01"])]),
    )
}

/// Two components: {01, 24, 25} and {91, 96}.
#[allow(dead_code)]
pub fn two_islands() -> RegionRegistry {
    registry(
        vec![
            record("01", "Hà Nội", Some((21.0285, 105.8542))),
            record("24", "Bắc Ninh", Some((21.1861, 106.0763))),
            record("25", "Phú Thọ", Some((21.3227, 105.4019))),
            record("91", "An Giang", Some((10.5216, 105.1259))),
            record("96", "Cà Mau", Some((9.1769, 105.1524))),
        ],
        &adjacency(&[
            ("01", &["24", "25"]),
            ("24", &["01", "25"]),
            ("25", &["01", "24"]),
            ("91", &["96"]),
            ("96", &["91"]),
        ]),
    )
}

/// Scripted [`RouteTransport`] that replays a fixed sequence of outcomes and
/// counts calls. The last outcome repeats once the script is exhausted.
#[allow(dead_code)]
#[derive(Clone)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Vec<Result<RoutingResponse, TransportFailure>>>>,
    calls: Arc<AtomicUsize>,
    last_coordinates: Arc<Mutex<Vec<(f64, f64)>>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(script: Vec<Result<RoutingResponse, TransportFailure>>) -> Self {
        let mut script = script;
        script.reverse();
        Self {
            script: Arc::new(Mutex::new(script)),
            calls: Arc::new(AtomicUsize::new(0)),
            last_coordinates: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn always(outcome: Result<RoutingResponse, TransportFailure>) -> Self {
        Self::new(vec![outcome])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_coordinates(&self) -> Vec<(f64, f64)> {
        self.last_coordinates.lock().expect("lock").clone()
    }
}

impl RouteTransport for ScriptedTransport {
    fn fetch(
        &self,
        coordinates: &[(f64, f64)],
        _profile: &str,
    ) -> Result<RoutingResponse, TransportFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_coordinates.lock().expect("lock") = coordinates.to_vec();
        let mut script = self.script.lock().expect("lock");
        if script.len() > 1 {
            script.pop().expect("non-empty script")
        } else {
            script
                .last()
                .cloned()
                .unwrap_or(Err(TransportFailure::Timeout))
        }
    }
}

/// Backend body reporting a single route of `meters`.
#[allow(dead_code)]
pub fn ok_response(meters: f64) -> RoutingResponse {
    RoutingResponse {
        code: "Ok".to_string(),
        routes: vec![RouteLeg { distance: meters }],
        message: None,
    }
}
