//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use provpath_lib::{PathRequest, RoadClass};

use crate::ProblemDetails;

/// Largest `limit` accepted by search endpoints.
pub const MAX_SEARCH_LIMIT: usize = 100;

/// Validation trait for request types.
///
/// Implementations should validate all fields and return a `ProblemDetails`
/// error for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

fn require_non_empty(
    value: &str,
    field: &str,
    request_id: &str,
) -> Result<(), Box<ProblemDetails>> {
    if value.trim().is_empty() {
        return Err(Box::new(ProblemDetails::bad_request(
            format!("The '{}' field is required and cannot be empty", field),
            request_id,
        )));
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

fn default_limit() -> usize {
    10
}

/// Request for a path between two regions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindPathRequest {
    /// Starting region code or name.
    pub start: String,

    /// Destination region code or name.
    pub end: String,

    /// Allow substring matches on names.
    #[serde(default = "default_true")]
    pub fuzzy_match: bool,

    /// Road class for the straight-line correction (`highway`, `national`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road_class: Option<String>,

    /// Ask the external routing backend for the real road distance.
    #[serde(default = "default_true")]
    pub resolve_real_distance: bool,
}

impl FindPathRequest {
    /// Parsed road class; absent means unspecified.
    pub fn road_class(&self) -> provpath_lib::Result<RoadClass> {
        match self.road_class.as_deref() {
            Some(value) => value.parse(),
            None => Ok(RoadClass::Unspecified),
        }
    }

    /// Convert into the orchestrator's request type.
    pub fn to_path_request(&self) -> provpath_lib::Result<PathRequest> {
        Ok(PathRequest::new(self.start.trim(), self.end.trim())
            .with_fuzzy_match(self.fuzzy_match)
            .with_road_class(self.road_class()?)
            .with_real_distance(self.resolve_real_distance))
    }
}

impl Validate for FindPathRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        require_non_empty(&self.start, "start", request_id)?;
        require_non_empty(&self.end, "end", request_id)?;

        if self.road_class().is_err() {
            return Err(Box::new(ProblemDetails::bad_request(
                format!(
                    "The 'road_class' field must be one of direct, highway, national, \
                     provincial, unspecified (got '{}')",
                    self.road_class.as_deref().unwrap_or_default()
                ),
                request_id,
            )));
        }

        Ok(())
    }
}

/// Request for every region reachable from a starting region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReachableRequest {
    /// Starting region code or name.
    pub start: String,

    /// Optional hop limit; zero returns only the start region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hops: Option<usize>,
}

impl Validate for ReachableRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        require_non_empty(&self.start, "start", request_id)
    }
}

/// Request for whether two regions are connected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityRequest {
    pub first: String,
    pub second: String,
}

impl Validate for ConnectivityRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        require_non_empty(&self.first, "first", request_id)?;
        require_non_empty(&self.second, "second", request_id)
    }
}

/// Request for a region name search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Query matched against names after diacritic folding.
    pub query: String,

    /// Maximum number of results to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Validate for SearchRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        require_non_empty(&self.query, "query", request_id)?;

        if self.limit == 0 {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'limit' field must be at least 1",
                request_id,
            )));
        }

        if self.limit > MAX_SEARCH_LIMIT {
            return Err(Box::new(ProblemDetails::bad_request(
                format!("The 'limit' field cannot exceed {}", MAX_SEARCH_LIMIT),
                request_id,
            )));
        }

        Ok(())
    }
}

/// Request for checking an identifier without failing on a miss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    pub identifier: String,
}

impl Validate for ValidateRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        require_non_empty(&self.identifier, "identifier", request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_path(start: &str, end: &str) -> FindPathRequest {
        FindPathRequest {
            start: start.to_string(),
            end: end.to_string(),
            fuzzy_match: true,
            road_class: None,
            resolve_real_distance: true,
        }
    }

    #[test]
    fn test_find_path_request_valid() {
        let req = FindPathRequest {
            road_class: Some("highway".to_string()),
            ..find_path("Hà Nội", "Đà Nẵng")
        };
        assert!(req.validate("test").is_ok());

        let path_request = req.to_path_request().unwrap();
        assert_eq!(path_request.start, "Hà Nội");
        assert_eq!(path_request.road_class, RoadClass::Highway);
    }

    #[test]
    fn test_find_path_request_empty_start() {
        let err = find_path("", "48").validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("'start'"));
    }

    #[test]
    fn test_find_path_request_blank_end() {
        let err = find_path("01", "   ").validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("'end'"));
    }

    #[test]
    fn test_find_path_request_unknown_road_class() {
        let req = FindPathRequest {
            road_class: Some("motorway".to_string()),
            ..find_path("01", "48")
        };
        let err = req.validate("req-rc").unwrap_err();
        assert_eq!(err.status, 400);
        assert!(err.detail.as_deref().unwrap().contains("motorway"));
        assert_eq!(err.instance.as_deref(), Some("req-rc"));
    }

    #[test]
    fn test_find_path_request_defaults() {
        let req: FindPathRequest = serde_json::from_str(r#"{"start":"01","end":"48"}"#).unwrap();
        assert!(req.fuzzy_match);
        assert!(req.resolve_real_distance);
        assert_eq!(req.road_class().unwrap(), RoadClass::Unspecified);
    }

    #[test]
    fn test_reachable_request() {
        let req: ReachableRequest = serde_json::from_str(r#"{"start":"01"}"#).unwrap();
        assert!(req.max_hops.is_none());
        assert!(req.validate("test").is_ok());

        let req = ReachableRequest {
            start: " ".to_string(),
            max_hops: Some(2),
        };
        assert!(req.validate("test").is_err());
    }

    #[test]
    fn test_connectivity_request_requires_both() {
        let req = ConnectivityRequest {
            first: "01".to_string(),
            second: String::new(),
        };
        let err = req.validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("'second'"));
    }

    #[test]
    fn test_search_request_default_limit() {
        let req: SearchRequest = serde_json::from_str(r#"{"query":"thanh"}"#).unwrap();
        assert_eq!(req.limit, 10);
        assert!(req.validate("test").is_ok());
    }

    #[test]
    fn test_search_request_limit_bounds() {
        let zero = SearchRequest {
            query: "ha".to_string(),
            limit: 0,
        };
        assert!(zero.validate("test").is_err());

        let too_many = SearchRequest {
            query: "ha".to_string(),
            limit: MAX_SEARCH_LIMIT + 1,
        };
        let err = too_many.validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("cannot exceed"));
    }

    #[test]
    fn test_validate_request_blank() {
        let req = ValidateRequest {
            identifier: "\t".to_string(),
        };
        assert!(req.validate("test").is_err());
    }
}
