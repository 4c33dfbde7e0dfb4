use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::distance::{DistanceEstimator, RoadClass, RoadSegment};
use crate::error::{Error, Result};
use crate::graph::{build_graph, GraphStats, RegionGraph};
use crate::path::{self, PathResult};
use crate::region::{Region, RegionCode};
use crate::registry::{MatchKind, RegionRegistry};
use crate::resolver::RouteResolver;

/// Parameters for a single path lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRequest {
    pub start: String,
    pub end: String,
    pub fuzzy_match: bool,
    pub road_class: RoadClass,
    pub resolve_real_distance: bool,
}

impl PathRequest {
    /// Fuzzy lookup, unspecified road class, real distance requested.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            fuzzy_match: true,
            road_class: RoadClass::Unspecified,
            resolve_real_distance: true,
        }
    }

    pub fn with_fuzzy_match(mut self, fuzzy_match: bool) -> Self {
        self.fuzzy_match = fuzzy_match;
        self
    }

    pub fn with_road_class(mut self, road_class: RoadClass) -> Self {
        self.road_class = road_class;
        self
    }

    pub fn with_real_distance(mut self, resolve: bool) -> Self {
        self.resolve_real_distance = resolve;
        self
    }
}

/// Short description of a region used in listings. `neighbor_count` is
/// taken from the built graph, so it includes repaired one-sided borders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub code: RegionCode,
    pub name: String,
    pub full_name: String,
    pub code_name: Option<String>,
    pub neighbor_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeighborSummary {
    pub code: RegionCode,
    pub name: String,
}

/// A region together with its graph neighbors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionInfo {
    pub code: RegionCode,
    pub name: String,
    pub full_name: String,
    pub code_name: Option<String>,
    pub name_en: Option<String>,
    pub full_name_en: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub neighbor_count: usize,
    pub neighbors: Vec<NeighborSummary>,
}

/// Region reachable from a start point, with its hop distance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReachableRegion {
    pub code: RegionCode,
    pub name: String,
    pub full_name: String,
    pub hops: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectivityReport {
    pub first: RegionSummary,
    pub second: RegionSummary,
    pub connected: bool,
}

/// Result of checking whether an identifier names a region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentifierValidation {
    pub valid: bool,
    pub original_input: String,
    pub region: Option<RegionSummary>,
    pub matched_by: Option<MatchKind>,
    pub error: Option<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStats {
    #[serde(flatten)]
    pub graph: GraphStats,
    pub connected: bool,
    pub unreachable: Vec<RegionCode>,
}

/// Composes registry, graph, BFS, distance estimation and optional route
/// resolution into request-level operations.
///
/// Registry and graph are immutable once the service exists, so a service can
/// be shared across threads behind an `Arc`.
pub struct PathfindingService {
    registry: Arc<RegionRegistry>,
    graph: Arc<RegionGraph>,
    estimator: DistanceEstimator,
    resolver: Option<RouteResolver>,
}

impl fmt::Debug for PathfindingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathfindingService")
            .field("regions", &self.registry.count())
            .field("edges", &self.graph.edge_count())
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl PathfindingService {
    /// Build the graph from an initialized registry.
    pub fn new(registry: RegionRegistry) -> Result<Self> {
        let graph = build_graph(&registry)?;
        Self::with_graph(Arc::new(registry), Arc::new(graph))
    }

    /// Use an existing graph, which must already be built.
    pub fn with_graph(registry: Arc<RegionRegistry>, graph: Arc<RegionGraph>) -> Result<Self> {
        if !registry.is_initialized() {
            return Err(Error::NotInitialized);
        }
        if !graph.is_built() {
            return Err(Error::GraphNotBuilt);
        }
        info!(
            regions = registry.count(),
            edges = graph.edge_count(),
            "pathfinding service ready"
        );
        Ok(Self {
            registry,
            graph,
            estimator: DistanceEstimator::new(),
            resolver: None,
        })
    }

    pub fn with_resolver(mut self, resolver: Option<RouteResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    pub fn graph(&self) -> &RegionGraph {
        &self.graph
    }

    pub fn estimator(&self) -> &DistanceEstimator {
        &self.estimator
    }

    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }

    /// Resolve both endpoints, search, then annotate the path with distances.
    ///
    /// Only resolution and search failures are returned as errors. Missing
    /// coordinates and route resolver failures leave the corresponding
    /// distance fields empty.
    pub fn find_path(&self, request: &PathRequest) -> Result<PathResult> {
        // Step 1: reject blank endpoints before any lookup, then resolve.
        ensure_not_blank(&request.start, "start")?;
        ensure_not_blank(&request.end, "end")?;
        let start = self.resolve(&request.start, request.fuzzy_match, "start")?;
        let end = self.resolve(&request.end, request.fuzzy_match, "end")?;
        info!(
            start = %start.code,
            end = %end.code,
            "finding path {} -> {}",
            start.name,
            end.name
        );

        // Step 2: topology.
        let mut result = match path::find_path(&self.graph, &start.code, &end.code) {
            Ok(result) => result,
            Err(err) => {
                warn!(start = %start.code, end = %end.code, error = %err, "no path");
                return Err(err);
            }
        };

        // Step 3: per-edge estimates; a segment without coordinates is skipped.
        let segments = self.estimate_segments(&result.path, request.road_class);
        let estimated = if result.hop_count() == 0 {
            Some(0.0)
        } else if segments.is_empty() {
            None
        } else {
            Some(segments.iter().map(|s| s.distance_km).sum())
        };
        result.road_class = request.road_class;
        result.estimated_distance_km = estimated;
        result.segments = Some(segments);

        // Step 4: optional enrichment from the routing backend.
        if request.resolve_real_distance && result.hop_count() > 0 {
            if let Some(resolver) = &self.resolver {
                let outcome = resolver.route_distance(&result.path);
                if outcome.success {
                    result.real_distance_km = outcome.distance_km;
                } else {
                    warn!(
                        error = outcome.error_message.as_deref().unwrap_or("unknown"),
                        "real distance unavailable"
                    );
                }
            }
        }

        info!(
            hops = result.hop_count(),
            duration_ms = result.search_duration.as_secs_f64() * 1000.0,
            estimated_km = ?result.estimated_distance_km,
            real_km = ?result.real_distance_km,
            "path found"
        );
        Ok(result)
    }

    /// Find several paths, skipping pairs that cannot be resolved or joined.
    pub fn find_paths<S: AsRef<str>>(&self, pairs: &[(S, S)]) -> Result<Vec<PathResult>> {
        let mut results = Vec::with_capacity(pairs.len());
        for (start, end) in pairs {
            let start: &str = start.as_ref();
            let end: &str = end.as_ref();
            match self.find_path(&PathRequest::new(start, end)) {
                Ok(result) => results.push(result),
                Err(err @ (Error::RegionNotFound { .. } | Error::NoPathFound { .. })) => {
                    warn!(start, end, error = %err, "skipping pair");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(results)
    }

    /// Regions reachable from `start`, sorted by hop count then code.
    pub fn reachable(
        &self,
        start: &str,
        max_hops: Option<usize>,
    ) -> Result<Vec<ReachableRegion>> {
        let start = self.resolve(start, true, "start")?;
        let hops = path::reachable_from(&self.graph, &start.code, max_hops)?;

        let mut reachable: Vec<ReachableRegion> = hops
            .into_iter()
            .filter_map(|(code, hops)| {
                self.graph.region(&code).map(|region| ReachableRegion {
                    code,
                    name: region.name.clone(),
                    full_name: region.full_name.clone(),
                    hops,
                })
            })
            .collect();
        reachable.sort_by(|a, b| a.hops.cmp(&b.hops).then_with(|| a.code.cmp(&b.code)));
        info!(start = %start.code, ?max_hops, count = reachable.len(), "reachable regions");
        Ok(reachable)
    }

    pub fn check_connectivity(&self, first: &str, second: &str) -> Result<ConnectivityReport> {
        let a = self.resolve(first, true, "first")?;
        let b = self.resolve(second, true, "second")?;
        let connected = path::connected(&self.graph, &a.code, &b.code)?;
        Ok(ConnectivityReport {
            first: self.summary(a),
            second: self.summary(b),
            connected,
        })
    }

    pub fn region_info(&self, identifier: &str) -> Result<RegionInfo> {
        let region = self.resolve(identifier, true, "identifier")?;
        let neighbors: Vec<NeighborSummary> = self
            .graph
            .neighbors(&region.code)?
            .iter()
            .filter_map(|code| self.graph.region(code))
            .map(|neighbor| NeighborSummary {
                code: neighbor.code.clone(),
                name: neighbor.name.clone(),
            })
            .collect();

        Ok(RegionInfo {
            code: region.code.clone(),
            name: region.name.clone(),
            full_name: region.full_name.clone(),
            code_name: region.code_name.clone(),
            name_en: region.name_en.clone(),
            full_name_en: region.full_name_en.clone(),
            latitude: region.latitude,
            longitude: region.longitude,
            neighbor_count: neighbors.len(),
            neighbors,
        })
    }

    /// Every region, sorted by code.
    pub fn regions(&self) -> Result<Vec<RegionSummary>> {
        let mut regions: Vec<RegionSummary> = self
            .registry
            .all()?
            .iter()
            .map(|region| self.summary(region))
            .collect();
        regions.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(regions)
    }

    pub fn search(&self, query: &str, limit: Option<usize>) -> Result<Vec<RegionSummary>> {
        Ok(self
            .registry
            .search(query, limit)?
            .into_iter()
            .map(|region| self.summary(region))
            .collect())
    }

    /// Report whether `identifier` resolves, without failing.
    pub fn validate_identifier(&self, identifier: &str) -> IdentifierValidation {
        match self.registry.resolve_match(identifier, true) {
            Ok(resolution) => IdentifierValidation {
                valid: true,
                original_input: identifier.to_string(),
                region: Some(self.summary(resolution.region)),
                matched_by: Some(resolution.matched_by),
                error: None,
                suggestions: Vec::new(),
            },
            Err(err) => {
                let suggestions = match &err {
                    Error::RegionNotFound { suggestions, .. } => suggestions.clone(),
                    _ => Vec::new(),
                };
                IdentifierValidation {
                    valid: false,
                    original_input: identifier.to_string(),
                    region: None,
                    matched_by: None,
                    error: Some(err.to_string()),
                    suggestions,
                }
            }
        }
    }

    pub fn stats(&self) -> Result<ServiceStats> {
        let check = self.graph.validate_connectivity()?;
        Ok(ServiceStats {
            graph: self.graph.stats(),
            connected: check.connected,
            unreachable: check.unreachable,
        })
    }

    fn summary(&self, region: &Region) -> RegionSummary {
        RegionSummary {
            code: region.code.clone(),
            name: region.name.clone(),
            full_name: region.full_name.clone(),
            code_name: region.code_name.clone(),
            neighbor_count: self.graph.neighbors(&region.code).map_or(0, <[_]>::len),
        }
    }

    fn resolve(&self, identifier: &str, fuzzy: bool, field: &str) -> Result<&Region> {
        ensure_not_blank(identifier, field)?;
        let resolution = self.registry.resolve_match(identifier, fuzzy)?;
        debug!(
            field,
            input = identifier,
            code = %resolution.region.code,
            matched_by = %resolution.matched_by,
            "resolved region"
        );
        Ok(resolution.region)
    }

    fn estimate_segments(&self, path: &[Region], road_class: RoadClass) -> Vec<RoadSegment> {
        path.windows(2)
            .filter_map(|pair| {
                match self
                    .estimator
                    .build_road_segment(&pair[0], &pair[1], road_class, None)
                {
                    Ok(segment) => Some(segment),
                    Err(err) => {
                        warn!(
                            from = %pair[0].code,
                            to = %pair[1].code,
                            error = %err,
                            "skipping segment estimate"
                        );
                        None
                    }
                }
            })
            .collect()
    }
}

fn ensure_not_blank(identifier: &str, field: &str) -> Result<()> {
    if identifier.trim().is_empty() {
        return Err(Error::InvalidInput {
            field: field.to_string(),
            message: "region code or name must not be empty".to_string(),
            value: Some(identifier.to_string()),
        });
    }
    Ok(())
}
