use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};

use crate::distance::{RoadClass, RoadSegment};
use crate::error::{Error, Result};
use crate::graph::RegionGraph;
use crate::region::{Region, RegionCode};

/// Reason attached to [`Error::NoPathFound`] when BFS exhausts the component.
pub const DISCONNECTED_REASON: &str = "regions are in disconnected components";

/// Shortest chain of regions between two endpoints, plus any distance figures.
#[derive(Debug, Clone, Serialize)]
pub struct PathResult {
    /// Regions from start to end inclusive.
    pub path: Vec<Region>,
    #[serde(rename = "search_duration_ms", serialize_with = "duration_as_millis")]
    pub search_duration: Duration,
    pub road_class: RoadClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<RoadSegment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_distance_km: Option<f64>,
}

impl PathResult {
    fn topological(path: Vec<Region>, search_duration: Duration) -> Self {
        Self {
            path,
            search_duration,
            road_class: RoadClass::default(),
            segments: None,
            estimated_distance_km: None,
            real_distance_km: None,
        }
    }

    /// Number of edges traversed.
    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn codes(&self) -> Vec<&str> {
        self.path.iter().map(|r| r.code.as_str()).collect()
    }

    pub fn start(&self) -> Option<&Region> {
        self.path.first()
    }

    pub fn end(&self) -> Option<&Region> {
        self.path.last()
    }
}

fn duration_as_millis<S>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

/// Find a minimum-hop path between two codes using breadth-first search.
pub fn find_path(graph: &RegionGraph, start: &str, end: &str) -> Result<PathResult> {
    let started = Instant::now();
    ensure_vertices(graph, &[start, end])?;

    if start == end {
        let region = vertex(graph, start)?;
        return Ok(PathResult::topological(vec![region.clone()], started.elapsed()));
    }

    let mut parents: HashMap<&str, Option<&str>> = HashMap::new();
    let mut queue = VecDeque::new();
    parents.insert(start, None);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for next in graph.neighbors(current)? {
            let next = next.as_str();
            if parents.contains_key(next) {
                continue;
            }
            parents.insert(next, Some(current));
            if next == end {
                let codes = reconstruct_path(&parents, start, end);
                let path = codes
                    .into_iter()
                    .map(|code| vertex(graph, code).cloned())
                    .collect::<Result<Vec<_>>>()?;
                return Ok(PathResult::topological(path, started.elapsed()));
            }
            queue.push_back(next);
        }
    }

    Err(Error::NoPathFound {
        start: start.to_string(),
        end: end.to_string(),
        reason: Some(DISCONNECTED_REASON.to_string()),
    })
}

/// Hop distance from `start` to every reachable region.
///
/// With `max_hops`, regions at exactly the cap are recorded but not expanded.
pub fn reachable_from(
    graph: &RegionGraph,
    start: &str,
    max_hops: Option<usize>,
) -> Result<BTreeMap<RegionCode, usize>> {
    ensure_vertices(graph, &[start])?;

    let mut hops: BTreeMap<RegionCode, usize> = BTreeMap::new();
    let mut queue = VecDeque::new();
    hops.insert(start.to_string(), 0);
    queue.push_back((start, 0usize));

    while let Some((current, distance)) = queue.pop_front() {
        if max_hops.is_some_and(|limit| distance >= limit) {
            continue;
        }
        for next in graph.neighbors(current)? {
            if hops.contains_key(next) {
                continue;
            }
            hops.insert(next.clone(), distance + 1);
            queue.push_back((next.as_str(), distance + 1));
        }
    }

    Ok(hops)
}

/// Whether a path exists between two codes; trivially true when equal.
pub fn connected(graph: &RegionGraph, a: &str, b: &str) -> Result<bool> {
    ensure_vertices(graph, &[a, b])?;
    if a == b {
        return Ok(true);
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(a);
    queue.push_back(a);
    while let Some(current) = queue.pop_front() {
        for next in graph.neighbors(current)? {
            if next == b {
                return Ok(true);
            }
            if visited.insert(next.as_str()) {
                queue.push_back(next.as_str());
            }
        }
    }
    Ok(false)
}

fn ensure_vertices(graph: &RegionGraph, codes: &[&str]) -> Result<()> {
    if !graph.is_built() {
        return Err(Error::GraphNotBuilt);
    }
    for code in codes {
        if !graph.contains(code) {
            return Err(Error::NotAVertex {
                code: code.to_string(),
            });
        }
    }
    Ok(())
}

fn vertex<'g>(graph: &'g RegionGraph, code: &str) -> Result<&'g Region> {
    graph.region(code).ok_or_else(|| Error::NotAVertex {
        code: code.to_string(),
    })
}

fn reconstruct_path<'a>(
    parents: &HashMap<&'a str, Option<&'a str>>,
    start: &'a str,
    end: &'a str,
) -> Vec<&'a str> {
    let mut path = Vec::new();
    let mut current = Some(end);
    while let Some(node) = current {
        path.push(node);
        if node == start {
            break;
        }
        current = parents.get(node).copied().flatten();
    }
    path.reverse();
    path
}
