//! Core types for the feature store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Coordinate units per decimal degree (100-nanodegree resolution).
pub const UNITS_PER_DEGREE: f64 = 10_000_000.0;

/// Identity of a feature.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeatureId(pub i64);

impl fmt::Debug for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeatureId({})", self.0)
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-feature version number. The creation event is version 1.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Version(pub i32);

impl Version {
    pub const INITIAL: Version = Version(1);

    /// The following version, or `None` past `i32::MAX`.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Version)
    }

    pub fn prev(self) -> Option<Self> {
        if self.0 > 1 {
            Some(Version(self.0 - 1))
        } else {
            None
        }
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Microseconds since Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as i64)
            .unwrap_or(0);
        Timestamp(micros)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// A coordinate pair in 100-nanodegree units.
///
/// Addition and subtraction wrap on overflow so that delta encoding stays
/// total over the whole `i32` range.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Coord {
    pub lat: i32,
    pub lon: i32,
}

impl Coord {
    pub const ZERO: Coord = Coord { lat: 0, lon: 0 };

    pub fn new(lat: i32, lon: i32) -> Self {
        Self { lat, lon }
    }

    /// Convert decimal degrees to the fixed integer unit, rounding to nearest.
    pub fn from_degrees(lat: f64, lon: f64) -> Self {
        Self {
            lat: (lat * UNITS_PER_DEGREE).round() as i32,
            lon: (lon * UNITS_PER_DEGREE).round() as i32,
        }
    }

    /// Convert back to decimal degrees as `(lat, lon)`.
    pub fn to_degrees(self) -> (f64, f64) {
        (
            f64::from(self.lat) / UNITS_PER_DEGREE,
            f64::from(self.lon) / UNITS_PER_DEGREE,
        )
    }

    pub fn offset(self, delta: Coord) -> Coord {
        Coord {
            lat: self.lat.wrapping_add(delta.lat),
            lon: self.lon.wrapping_add(delta.lon),
        }
    }

    /// The delta that takes `from` to `self`.
    pub fn delta_from(self, from: Coord) -> Coord {
        Coord {
            lat: self.lat.wrapping_sub(from.lat),
            lon: self.lon.wrapping_sub(from.lon),
        }
    }

    pub fn is_zero(self) -> bool {
        self == Coord::ZERO
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((lat, lon): (i32, i32)) -> Self {
        Coord { lat, lon }
    }
}

/// Geometry variant tag. Fixed for the lifetime of a feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeometryKind::Point => "POINT",
            GeometryKind::LineString => "LINESTRING",
            GeometryKind::Polygon => "POLYGON",
        };
        f.write_str(name)
    }
}

/// Decoded geometry with absolute coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Geometry {
    Point(Coord),
    LineString(Vec<Coord>),
    /// Ring vertices. The closing vertex, if any, is stored like any other.
    Polygon(Vec<Coord>),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
        }
    }

    /// Vertex slice for sequence geometries, `None` for points.
    pub fn vertices(&self) -> Option<&[Coord]> {
        match self {
            Geometry::Point(_) => None,
            Geometry::LineString(v) | Geometry::Polygon(v) => Some(v),
        }
    }
}

/// Feature properties. Keys are unique by construction.
pub type Properties = BTreeMap<String, String>;

/// Lifecycle of a feature that has been created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureStatus {
    Live,
    Deleted,
}

/// Full state of one feature at one version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSnapshot {
    pub id: FeatureId,
    pub version: Version,
    /// Timestamp of the event that produced this version.
    pub timestamp: Timestamp,
    pub status: FeatureStatus,
    pub geometry: Geometry,
    pub properties: Properties,
}

impl FeatureSnapshot {
    pub fn is_deleted(&self) -> bool {
        self.status == FeatureStatus::Deleted
    }
}

/// Store statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub feature_count: u64,
    pub live_count: u64,
    pub deleted_count: u64,
    pub event_count: u64,
    pub cached_snapshots: u64,
}
