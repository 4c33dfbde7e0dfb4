use std::fmt;
use std::str::FromStr;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::region::{Region, RegionCode};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Coarse road category selecting a straight-line correction factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadClass {
    /// Straight line, no correction.
    Direct,
    Highway,
    National,
    Provincial,
    /// No class given; uses the national road factor.
    #[default]
    Unspecified,
}

impl RoadClass {
    /// Multiplier applied to great-circle distance.
    pub fn factor(self) -> f64 {
        match self {
            RoadClass::Direct => 1.0,
            RoadClass::Highway => 1.2,
            RoadClass::National => 1.35,
            RoadClass::Provincial => 1.5,
            RoadClass::Unspecified => 1.35,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoadClass::Direct => "direct",
            RoadClass::Highway => "highway",
            RoadClass::National => "national",
            RoadClass::Provincial => "provincial",
            RoadClass::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoadClass {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "direct" | "default" => Ok(RoadClass::Direct),
            "highway" => Ok(RoadClass::Highway),
            "national" => Ok(RoadClass::National),
            "provincial" => Ok(RoadClass::Provincial),
            "" | "unspecified" | "unknown" => Ok(RoadClass::Unspecified),
            other => Err(Error::InvalidInput {
                field: "road_class".to_string(),
                message: "expected one of direct, highway, national, provincial, unspecified"
                    .to_string(),
                value: Some(other.to_string()),
            }),
        }
    }
}

/// Haversine distance in kilometers between two `(lat, lon)` points in degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Estimated distance annotation for one edge of a path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadSegment {
    pub from: RegionCode,
    pub from_name: String,
    pub to: RegionCode,
    pub to_name: String,
    pub distance_km: f64,
    pub road_class: RoadClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub road_name: Option<String>,
}

/// Memoized road distances keyed by unordered region pair and road class.
///
/// No eviction: the key space is bounded by the square of the region count.
#[derive(Debug, Default)]
pub struct DistanceCache {
    entries: DashMap<(RegionCode, RegionCode, RoadClass), f64>,
}

impl DistanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a distance in either orientation.
    pub fn get(&self, a: &str, b: &str, road_class: RoadClass) -> Option<f64> {
        let forward = (a.to_string(), b.to_string(), road_class);
        if let Some(hit) = self.entries.get(&forward) {
            return Some(*hit);
        }
        let reverse = (b.to_string(), a.to_string(), road_class);
        self.entries.get(&reverse).map(|hit| *hit)
    }

    pub fn insert(&self, a: &str, b: &str, road_class: RoadClass, distance_km: f64) {
        self.entries
            .insert((a.to_string(), b.to_string(), road_class), distance_km);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Converts region pairs into physical distance estimates.
///
/// Safe to share across threads; both memo layers are concurrent maps.
#[derive(Debug, Default)]
pub struct DistanceEstimator {
    great_circle_memo: DashMap<[u64; 4], f64>,
    cache: DistanceCache,
}

impl DistanceEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &DistanceCache {
        &self.cache
    }

    /// Great-circle distance, memoized by the exact coordinate quadruple.
    pub fn great_circle_distance(&self, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        let key = [lat1.to_bits(), lon1.to_bits(), lat2.to_bits(), lon2.to_bits()];
        if let Some(hit) = self.great_circle_memo.get(&key) {
            return *hit;
        }
        let distance = haversine_km(lat1, lon1, lat2, lon2);
        self.great_circle_memo.insert(key, distance);
        distance
    }

    /// Great-circle distance scaled by the road class factor.
    pub fn estimate_road_distance(
        &self,
        a: &Region,
        b: &Region,
        road_class: RoadClass,
    ) -> Result<f64> {
        if let Some(hit) = self.cache.get(&a.code, &b.code, road_class) {
            debug!(from = %a.code, to = %b.code, %road_class, "distance cache hit");
            return Ok(hit);
        }

        let (Some((lat1, lon1)), Some((lat2, lon2))) = (a.coordinates(), b.coordinates()) else {
            return Err(Error::MissingCoordinates {
                from: a.code.clone(),
                to: b.code.clone(),
            });
        };

        let distance = self.great_circle_distance(lat1, lon1, lat2, lon2) * road_class.factor();
        self.cache.insert(&a.code, &b.code, road_class, distance);
        Ok(distance)
    }

    /// Wrap [`estimate_road_distance`](Self::estimate_road_distance) into an
    /// edge annotation.
    pub fn build_road_segment(
        &self,
        from: &Region,
        to: &Region,
        road_class: RoadClass,
        road_name: Option<String>,
    ) -> Result<RoadSegment> {
        let distance_km = self.estimate_road_distance(from, to, road_class)?;
        debug!(from = %from.code, to = %to.code, distance_km, "segment estimated");
        Ok(RoadSegment {
            from: from.code.clone(),
            from_name: from.name.clone(),
            to: to.code.clone(),
            to_name: to.name.clone(),
            distance_km,
            road_class,
            road_name,
        })
    }
}
