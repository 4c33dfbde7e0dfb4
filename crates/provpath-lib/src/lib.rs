//! provpath library entry points.
//!
//! This crate holds the region registry, the adjacency graph built from it,
//! breadth-first path search, distance estimation, and best-effort real
//! distance lookups. Higher-level consumers (CLI, HTTP service) should go
//! through [`PathfindingService`] instead of reimplementing its composition.
//!

#![deny(warnings)]

pub mod dataset;
pub mod distance;
pub mod error;
pub mod graph;
pub mod path;
pub mod pathfinding;
pub mod region;
pub mod registry;
pub mod resolver;

pub use dataset::{
    adjacency_asymmetries, load_dataset, load_registry, resolve_data_dir, Asymmetry, Dataset,
};
pub use distance::{DistanceCache, DistanceEstimator, RoadClass, RoadSegment};
pub use error::{Error, Result};
pub use graph::{build_graph, ConnectivityCheck, GraphStats, RegionGraph};
pub use path::{connected, find_path, reachable_from, PathResult};
pub use pathfinding::{
    ConnectivityReport, IdentifierValidation, NeighborSummary, PathRequest, PathfindingService,
    ReachableRegion, RegionInfo, RegionSummary, ServiceStats,
};
pub use region::{normalize_text, Region, RegionCode, RegionRecord};
pub use registry::{MatchKind, RegionRegistry, Resolution};
pub use resolver::{
    HttpRouteTransport, ResolverConfig, RetryPolicy, RouteDistance, RouteResolver, RouteTransport,
    RoutingResponse, TransportFailure,
};
