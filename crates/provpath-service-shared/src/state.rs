//! Application state for HTTP services.
//!
//! Handlers reach the region registry, the adjacency graph, and the optional
//! external route resolver through a single [`PathfindingService`].

use std::path::Path;
use std::sync::Arc;

use provpath_lib::{load_registry, Error as LibError, PathfindingService, ResolverConfig};

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// The data directory does not exist.
    DataDirNotFound(String),

    /// The dataset files could not be read or validated.
    DatasetLoad(LibError),

    /// The adjacency graph could not be built from the registry.
    GraphBuild(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataDirNotFound(path) => write!(f, "data directory not found: {}", path),
            Self::DatasetLoad(e) => write!(f, "failed to load dataset: {}", e),
            Self::GraphBuild(e) => write!(f, "failed to build region graph: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DatasetLoad(e) | Self::GraphBuild(e) => Some(e),
            Self::DataDirNotFound(_) => None,
        }
    }
}

/// Shared application state for all axum handlers.
///
/// Cheap to clone; the service behind it is read-only after construction, so
/// handlers share it without locking.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::get, extract::State};
/// use provpath_service_shared::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     let count = state.service().registry().count();
///     // ...
/// }
///
/// let state = AppState::load("data", &ResolverConfig::disabled()).unwrap();
/// let app = Router::new()
///     .route("/api/v1/regions", get(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<PathfindingService>,
}

impl AppState {
    /// Load the dataset in `data_dir`, build the graph, and attach a route
    /// resolver when `resolver` enables one.
    ///
    /// Blocking: reads files and may construct an HTTP client. Call it before
    /// the runtime starts or from `spawn_blocking`.
    pub fn load(
        data_dir: impl AsRef<Path>,
        resolver: &ResolverConfig,
    ) -> Result<Self, AppStateError> {
        let data_dir = data_dir.as_ref();

        if !data_dir.is_dir() {
            return Err(AppStateError::DataDirNotFound(
                data_dir.display().to_string(),
            ));
        }

        tracing::info!(path = %data_dir.display(), "loading region dataset");
        let registry = load_registry(data_dir).map_err(AppStateError::DatasetLoad)?;

        let service = PathfindingService::new(registry)
            .map_err(AppStateError::GraphBuild)?
            .with_resolver(resolver.build_resolver());

        tracing::info!(
            region_count = service.registry().count(),
            edge_count = service.graph().edge_count(),
            routing_enabled = service.has_resolver(),
            "region graph ready"
        );

        Ok(Self::from_service(service))
    }

    /// Wrap an already constructed service.
    ///
    /// Useful for tests that attach a scripted route transport.
    pub fn from_service(service: PathfindingService) -> Self {
        Self {
            inner: Arc::new(service),
        }
    }

    /// Access the pathfinding service.
    pub fn service(&self) -> &PathfindingService {
        &self.inner
    }

    /// Shared handle for moving the service into a blocking task.
    pub fn service_arc(&self) -> Arc<PathfindingService> {
        Arc::clone(&self.inner)
    }

    /// Number of regions known to the registry.
    pub fn region_count(&self) -> usize {
        self.inner.registry().count()
    }

    /// Whether the adjacency graph is built and queryable.
    pub fn graph_built(&self) -> bool {
        self.inner.graph().is_built()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("region_count", &self.region_count())
            .field("graph_built", &self.graph_built())
            .field("has_resolver", &self.inner.has_resolver())
            .finish()
    }
}
