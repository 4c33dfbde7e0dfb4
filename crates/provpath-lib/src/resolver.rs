//! Best-effort real driving distances from an OSRM-compatible routing backend.
//!
//! The resolver never fails a caller: every problem is reported through
//! [`RouteDistance::failure`]. Network access goes through the
//! [`RouteTransport`] trait so retry behavior can be exercised with a scripted
//! transport.

use std::env;
use std::fmt;
use std::thread;
use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::region::Region;

pub const DEFAULT_ROUTING_URL: &str = "https://router.project-osrm.org";
pub const DEFAULT_PROFILE: &str = "driving";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_MS: u64 = 500;

const ENABLED_ENV: &str = "PROVPATH_ROUTING_ENABLED";
const URL_ENV: &str = "PROVPATH_ROUTING_URL";
const PROFILE_ENV: &str = "PROVPATH_ROUTING_PROFILE";
const TIMEOUT_ENV: &str = "PROVPATH_ROUTING_TIMEOUT_SECS";
const MAX_ATTEMPTS_ENV: &str = "PROVPATH_ROUTING_MAX_ATTEMPTS";
const BACKOFF_ENV: &str = "PROVPATH_ROUTING_BACKOFF_MS";

/// Outcome of a real-distance lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDistance {
    pub distance_km: Option<f64>,
    pub success: bool,
    pub error_message: Option<String>,
}

impl RouteDistance {
    pub fn ok(distance_km: f64) -> Self {
        Self {
            distance_km: Some(distance_km),
            success: true,
            error_message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            distance_km: None,
            success: false,
            error_message: Some(message.into()),
        }
    }
}

/// A single route in a backend response. `distance` is in meters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteLeg {
    pub distance: f64,
}

/// Backend response body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoutingResponse {
    pub code: String,
    #[serde(default)]
    pub routes: Vec<RouteLeg>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Transport-level failure for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    Timeout,
    Connect(String),
    Status(u16),
    Decode(String),
}

impl TransportFailure {
    /// Timeouts, connection errors and server-side statuses may succeed later.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportFailure::Timeout | TransportFailure::Connect(_) => true,
            TransportFailure::Status(status) => *status == 408 || *status >= 500,
            TransportFailure::Decode(_) => false,
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportFailure::Timeout => write!(f, "request timed out"),
            TransportFailure::Connect(message) => write!(f, "connection failed: {}", message),
            TransportFailure::Status(status) => write!(f, "backend returned HTTP {}", status),
            TransportFailure::Decode(message) => write!(f, "invalid response body: {}", message),
        }
    }
}

/// Something that can ask a routing backend for a route.
///
/// `coordinates` are `(longitude, latitude)` pairs in travel order.
pub trait RouteTransport: Send + Sync {
    fn fetch(
        &self,
        coordinates: &[(f64, f64)],
        profile: &str,
    ) -> std::result::Result<RoutingResponse, TransportFailure>;
}

/// Retry limits for the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub backoff: Duration,
    /// HTTP statuses that end the lookup immediately.
    pub abort_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            abort_statuses: vec![401, 403, 429],
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Whether another attempt should follow `failure` on attempt `attempt`
    /// (1-based).
    pub fn should_retry(&self, failure: &TransportFailure, attempt: u32) -> bool {
        if attempt >= self.max_attempts {
            return false;
        }
        if let TransportFailure::Status(status) = failure {
            if self.abort_statuses.contains(status) {
                return false;
            }
        }
        failure.is_transient()
    }
}

/// [`RouteTransport`] backed by a blocking reqwest client.
///
/// The client is built on first use.
#[derive(Debug)]
pub struct HttpRouteTransport {
    base_url: String,
    timeout: Duration,
    client: OnceCell<Client>,
}

impl HttpRouteTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            client: OnceCell::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request URL for a coordinate sequence.
    pub fn route_url(&self, coordinates: &[(f64, f64)], profile: &str) -> String {
        let waypoints = coordinates
            .iter()
            .map(|(lon, lat)| format!("{lon},{lat}"))
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}/route/v1/{}/{}?overview=false&steps=false",
            self.base_url, profile, waypoints
        )
    }

    fn client(&self) -> Result<&Client> {
        self.client.get_or_try_init(|| {
            Client::builder()
                .timeout(self.timeout)
                .user_agent(user_agent())
                .build()
                .map_err(Error::Http)
        })
    }
}

impl RouteTransport for HttpRouteTransport {
    fn fetch(
        &self,
        coordinates: &[(f64, f64)],
        profile: &str,
    ) -> std::result::Result<RoutingResponse, TransportFailure> {
        let client = self
            .client()
            .map_err(|err| TransportFailure::Connect(err.to_string()))?;
        let url = self.route_url(coordinates, profile);
        debug!(%url, "requesting route");

        let response = client.get(&url).send().map_err(|err| {
            if err.is_timeout() {
                TransportFailure::Timeout
            } else {
                TransportFailure::Connect(err.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportFailure::Status(status.as_u16()));
        }

        response
            .json::<RoutingResponse>()
            .map_err(|err| TransportFailure::Decode(err.to_string()))
    }
}

fn user_agent() -> String {
    format!("provpath-lib/{}", env!("CARGO_PKG_VERSION"))
}

/// Resolves real driving distances across a waypoint sequence.
pub struct RouteResolver {
    transport: Box<dyn RouteTransport>,
    policy: RetryPolicy,
    profile: String,
}

impl fmt::Debug for RouteResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteResolver")
            .field("policy", &self.policy)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl RouteResolver {
    pub fn new(transport: Box<dyn RouteTransport>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            profile: DEFAULT_PROFILE.to_string(),
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Real driving distance across `waypoints`, never failing the caller.
    pub fn route_distance(&self, waypoints: &[Region]) -> RouteDistance {
        match self.try_route_distance(waypoints) {
            Ok(distance_km) => RouteDistance::ok(distance_km),
            Err(err) => RouteDistance::failure(err.to_string()),
        }
    }

    /// Like [`route_distance`](Self::route_distance) but reports failures as
    /// [`Error::RouteResolution`].
    pub fn try_route_distance(&self, waypoints: &[Region]) -> Result<f64> {
        if waypoints.len() < 2 {
            return Err(resolution_error("at least two waypoints are required"));
        }
        let mut coordinates = Vec::with_capacity(waypoints.len());
        for region in waypoints {
            let Some((lat, lon)) = region.coordinates() else {
                return Err(resolution_error(format!(
                    "region {} has no coordinates",
                    region.code
                )));
            };
            coordinates.push((lon, lat));
        }

        let response = self.fetch_with_retry(&coordinates)?;
        if response.code != "Ok" {
            let detail = response.message.unwrap_or(response.code);
            return Err(resolution_error(format!("backend rejected route: {detail}")));
        }
        let Some(route) = response.routes.first() else {
            return Err(resolution_error("backend returned no routes"));
        };
        Ok(route.distance / 1000.0)
    }

    fn fetch_with_retry(&self, coordinates: &[(f64, f64)]) -> Result<RoutingResponse> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.transport.fetch(coordinates, &self.profile) {
                Ok(response) => return Ok(response),
                Err(failure) => {
                    if !self.policy.should_retry(&failure, attempt) {
                        warn!(attempt, %failure, "route lookup failed");
                        return Err(resolution_error(format!(
                            "{failure} after {attempt} attempt(s)"
                        )));
                    }
                    debug!(attempt, %failure, "retrying route lookup");
                    if !self.policy.backoff.is_zero() {
                        thread::sleep(self.policy.backoff);
                    }
                }
            }
        }
    }
}

fn resolution_error(message: impl Into<String>) -> Error {
    Error::RouteResolution {
        message: message.into(),
    }
}

/// Resolver settings, usually read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    pub enabled: bool,
    pub base_url: String,
    pub profile: String,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_ROUTING_URL.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }
}

impl ResolverConfig {
    /// Load from `PROVPATH_ROUTING_*` variables; unparsable values keep the
    /// default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using a custom variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let enabled = lookup(ENABLED_ENV)
            .map(|v| parse_flag(&v))
            .unwrap_or(defaults.enabled);
        let base_url = lookup(URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.base_url);
        let profile = lookup(PROFILE_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.profile);
        let timeout = parse_env(&lookup, TIMEOUT_ENV)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let max_attempts = parse_env(&lookup, MAX_ATTEMPTS_ENV).unwrap_or(defaults.max_attempts);
        let backoff = parse_env(&lookup, BACKOFF_ENV)
            .map(Duration::from_millis)
            .unwrap_or(defaults.backoff);

        Self {
            enabled,
            base_url,
            profile,
            timeout,
            max_attempts,
            backoff,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_backoff(self.backoff)
    }

    /// HTTP-backed resolver, or `None` when routing is disabled.
    pub fn build_resolver(&self) -> Option<RouteResolver> {
        if !self.enabled {
            return None;
        }
        let transport = HttpRouteTransport::new(self.base_url.clone(), self.timeout);
        Some(
            RouteResolver::new(Box::new(transport), self.retry_policy())
                .with_profile(self.profile.clone()),
        )
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

fn parse_env<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable routing setting");
            None
        }
    }
}
