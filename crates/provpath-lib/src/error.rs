use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the provpath library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when an identifier could not be resolved to a region.
    #[error("unknown region: {identifier}{}", format_suggestions(.suggestions))]
    RegionNotFound {
        identifier: String,
        suggestions: Vec<String>,
    },

    /// Raised when no path connects two regions.
    #[error("no path found between {start} and {end}{}", format_reason(.reason))]
    NoPathFound {
        start: String,
        end: String,
        reason: Option<String>,
    },

    /// Raised when a caller supplied an unusable field value.
    #[error("invalid input for '{field}': {message}{}", format_value(.value))]
    InvalidInput {
        field: String,
        message: String,
        value: Option<String>,
    },

    /// Raised when the registry is queried before `initialize`.
    #[error("region registry has not been initialized")]
    NotInitialized,

    /// Raised when `initialize` is called twice without a reset.
    #[error("region registry is already initialized")]
    AlreadyInitialized,

    /// Raised when traversal is attempted on a graph that is still being built.
    #[error("region graph has not been built")]
    GraphNotBuilt,

    /// Raised when a built graph is mutated.
    #[error("region graph is already built and cannot be modified")]
    GraphAlreadyBuilt,

    /// Raised when a code is looked up in a graph that does not contain it.
    #[error("region {code} is not a vertex of the graph")]
    NotAVertex { code: String },

    /// Raised when a region code is registered twice.
    #[error("duplicate region code {code}")]
    DuplicateRegion { code: String },

    /// Raised when a region record violates the model invariants.
    #[error("invalid region {code}: {message}")]
    InvalidRegion { code: String, message: String },

    /// Raised when the adjacency map has a key with no matching region.
    #[error("adjacency data references unknown region {code}")]
    UnknownAdjacencyKey { code: String },

    /// Raised when a neighbor list references an undeclared region.
    #[error("region {code} lists unknown neighbor {neighbor}")]
    UnknownNeighbor { code: String, neighbor: String },

    /// Raised when distance estimation lacks coordinates on either endpoint.
    #[error("missing coordinates for distance between {from} and {to}")]
    MissingCoordinates { from: String, to: String },

    /// Raised when the external routing backend cannot produce a distance.
    #[error("route resolution failed: {message}")]
    RouteResolution { message: String },

    /// Raised when a dataset input file is missing.
    #[error("dataset file not found at {path}")]
    DatasetNotFound { path: PathBuf },

    /// Raised when a dataset input contains no regions or no adjacency.
    #[error("dataset {what} is empty")]
    EmptyDataset { what: &'static str },

    /// No suitable data directory could be resolved for this platform.
    #[error("failed to resolve a data directory for the region dataset")]
    DataDirUnavailable,

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON parsing errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Shorthand for an [`Error::InvalidInput`] without an offending value.
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidInput {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    /// Whether this error is a startup sequencing problem rather than a bad request.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::NotInitialized
                | Error::AlreadyInitialized
                | Error::GraphNotBuilt
                | Error::GraphAlreadyBuilt
        )
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

fn format_reason(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(" ({})", reason),
        None => String::new(),
    }
}

fn format_value(value: &Option<String>) -> String {
    match value {
        Some(value) => format!(" (value: '{}')", value),
        None => String::new(),
    }
}
