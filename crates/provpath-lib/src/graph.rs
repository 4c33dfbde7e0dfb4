use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::region::{Region, RegionCode};
use crate::registry::RegionRegistry;

/// Undirected adjacency graph over regions.
///
/// Vertices and neighbor lists keep insertion order so traversal is
/// deterministic. Every edge is stored in both directions. Traversal is only
/// permitted after [`mark_built`](RegionGraph::mark_built), and no mutation
/// is permitted afterwards.
#[derive(Debug, Clone, Default)]
pub struct RegionGraph {
    regions: HashMap<RegionCode, Region>,
    order: Vec<RegionCode>,
    adjacency: HashMap<RegionCode, Vec<RegionCode>>,
    edge_count: usize,
    built: bool,
}

/// Outcome of a whole-graph reachability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectivityCheck {
    pub connected: bool,
    pub visited: usize,
    pub total: usize,
    /// Codes not reachable from the root, in insertion order.
    pub unreachable: Vec<RegionCode>,
}

/// Summary figures for a graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub region_count: usize,
    pub edge_count: usize,
    pub built: bool,
    pub avg_neighbors: f64,
    pub min_neighbors: usize,
    pub max_neighbors: usize,
}

impl RegionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex. Fails when the code is already present.
    pub fn add_region(&mut self, region: Region) -> Result<()> {
        if self.built {
            return Err(Error::GraphAlreadyBuilt);
        }
        if self.regions.contains_key(&region.code) {
            return Err(Error::DuplicateRegion { code: region.code });
        }
        self.order.push(region.code.clone());
        self.adjacency.insert(region.code.clone(), Vec::new());
        self.regions.insert(region.code.clone(), region);
        Ok(())
    }

    /// Add the undirected edge `a`–`b`. Re-adding an existing edge is a no-op.
    pub fn add_edge(&mut self, a: &str, b: &str) -> Result<()> {
        if self.built {
            return Err(Error::GraphAlreadyBuilt);
        }
        for code in [a, b] {
            if !self.regions.contains_key(code) {
                return Err(Error::NotAVertex {
                    code: code.to_string(),
                });
            }
        }
        if a == b {
            return Err(Error::InvalidInput {
                field: "edge".to_string(),
                message: "self-loops are not allowed".to_string(),
                value: Some(a.to_string()),
            });
        }

        let mut added = false;
        for (from, to) in [(a, b), (b, a)] {
            if let Some(list) = self.adjacency.get_mut(from) {
                if !list.iter().any(|code| code == to) {
                    list.push(to.to_string());
                    added = true;
                }
            }
        }
        if added {
            self.edge_count += 1;
        }
        Ok(())
    }

    pub fn mark_built(&mut self) {
        self.built = true;
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Neighbor codes of `code` in insertion order.
    pub fn neighbors(&self, code: &str) -> Result<&[RegionCode]> {
        if !self.built {
            return Err(Error::GraphNotBuilt);
        }
        self.adjacency
            .get(code)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::RegionNotFound {
                identifier: code.to_string(),
                suggestions: Vec::new(),
            })
    }

    pub fn region(&self, code: &str) -> Option<&Region> {
        self.regions.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.regions.contains_key(code)
    }

    pub fn region_count(&self) -> usize {
        self.order.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Regions in insertion order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.order.iter().filter_map(|code| self.regions.get(code))
    }

    /// BFS from the first inserted region; an empty graph is not connected.
    pub fn validate_connectivity(&self) -> Result<ConnectivityCheck> {
        if !self.built {
            return Err(Error::GraphNotBuilt);
        }
        let Some(root) = self.order.first() else {
            return Ok(ConnectivityCheck {
                connected: false,
                visited: 0,
                total: 0,
                unreachable: Vec::new(),
            });
        };

        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(root.as_str());
        queue.push_back(root.as_str());
        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(current)? {
                if visited.insert(next.as_str()) {
                    queue.push_back(next.as_str());
                }
            }
        }

        let unreachable: Vec<RegionCode> = self
            .order
            .iter()
            .filter(|code| !visited.contains(code.as_str()))
            .cloned()
            .collect();
        Ok(ConnectivityCheck {
            connected: unreachable.is_empty(),
            visited: visited.len(),
            total: self.order.len(),
            unreachable,
        })
    }

    pub fn stats(&self) -> GraphStats {
        let counts: Vec<usize> = self
            .order
            .iter()
            .map(|code| self.adjacency.get(code).map_or(0, Vec::len))
            .collect();
        let avg_neighbors = if counts.is_empty() {
            0.0
        } else {
            counts.iter().sum::<usize>() as f64 / counts.len() as f64
        };
        GraphStats {
            region_count: self.order.len(),
            edge_count: self.edge_count,
            built: self.built,
            avg_neighbors,
            min_neighbors: counts.iter().copied().min().unwrap_or(0),
            max_neighbors: counts.iter().copied().max().unwrap_or(0),
        }
    }
}

/// Build the adjacency graph from an initialized registry.
///
/// Declared neighbor relations are collapsed onto a canonical `(min, max)`
/// key so each undirected edge is added once; a relation declared on only one
/// side still yields a symmetric edge. A region listing itself is skipped.
pub fn build_graph(registry: &RegionRegistry) -> Result<RegionGraph> {
    let regions = registry.all()?;
    let mut graph = RegionGraph::new();
    for region in regions {
        graph.add_region(region.clone())?;
    }

    let mut seen: BTreeSet<(&str, &str)> = BTreeSet::new();
    for region in regions {
        for neighbor in &region.neighbors {
            let a = region.code.as_str();
            let b = neighbor.as_str();
            if a == b {
                warn!(code = a, "ignoring region listed as its own neighbor");
                continue;
            }
            let key = if a <= b { (a, b) } else { (b, a) };
            if seen.insert(key) {
                graph.add_edge(a, b)?;
            }
        }
    }

    graph.mark_built();
    debug!(
        regions = graph.region_count(),
        edges = graph.edge_count(),
        "region graph built"
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::RegionRecord;

    fn region(code: &str) -> Region {
        Region::from_record(
            RegionRecord {
                code: code.to_string(),
                name: format!("Region {code}"),
                full_name: format!("Region {code}"),
                code_name: None,
                name_en: None,
                full_name_en: None,
                latitude: None,
                longitude: None,
            },
            Vec::new(),
        )
        .expect("valid region")
    }

    #[test]
    fn traversal_requires_built_graph() {
        let mut graph = RegionGraph::new();
        graph.add_region(region("01")).expect("add");
        assert!(matches!(graph.neighbors("01"), Err(Error::GraphNotBuilt)));
        graph.mark_built();
        assert!(graph.neighbors("01").expect("built").is_empty());
    }

    #[test]
    fn edges_are_symmetric_and_idempotent() {
        let mut graph = RegionGraph::new();
        graph.add_region(region("01")).expect("add");
        graph.add_region(region("24")).expect("add");
        graph.add_edge("01", "24").expect("edge");
        graph.add_edge("24", "01").expect("same edge");
        graph.mark_built();

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.neighbors("01").expect("ok"), ["24".to_string()]);
        assert_eq!(graph.neighbors("24").expect("ok"), ["01".to_string()]);
    }

    #[test]
    fn duplicate_region_and_unknown_edge_fail() {
        let mut graph = RegionGraph::new();
        graph.add_region(region("01")).expect("add");
        assert!(matches!(
            graph.add_region(region("01")),
            Err(Error::DuplicateRegion { .. })
        ));
        assert!(matches!(
            graph.add_edge("01", "99"),
            Err(Error::NotAVertex { code }) if code == "99"
        ));
    }

    #[test]
    fn built_graph_rejects_mutation() {
        let mut graph = RegionGraph::new();
        graph.mark_built();
        assert!(matches!(
            graph.add_region(region("01")),
            Err(Error::GraphAlreadyBuilt)
        ));
    }

    #[test]
    fn unknown_neighbor_lookup_is_region_not_found() {
        let mut graph = RegionGraph::new();
        graph.mark_built();
        assert!(matches!(
            graph.neighbors("77"),
            Err(Error::RegionNotFound { .. })
        ));
    }

    #[test]
    fn empty_graph_is_not_connected() {
        let mut graph = RegionGraph::new();
        graph.mark_built();
        let check = graph.validate_connectivity().expect("check");
        assert!(!check.connected);
        assert_eq!(check.total, 0);
    }

    #[test]
    fn connectivity_lists_unreachable_codes() {
        let mut graph = RegionGraph::new();
        for code in ["01", "24", "96"] {
            graph.add_region(region(code)).expect("add");
        }
        graph.add_edge("01", "24").expect("edge");
        graph.mark_built();

        let check = graph.validate_connectivity().expect("check");
        assert!(!check.connected);
        assert_eq!(check.visited, 2);
        assert_eq!(check.unreachable, vec!["96".to_string()]);

        let stats = graph.stats();
        assert_eq!(stats.min_neighbors, 0);
        assert_eq!(stats.max_neighbors, 1);
    }
}
