//! Wire messages for feature events.
//!
//! Every "exactly one of" field on the wire is an enum with an explicit
//! `None` case, so an absent selection can never be mistaken for a
//! zero-valued payload.

mod builder;
mod codec;

pub use builder::{creation_event, deletion_event, modification_events};

use crate::types::{Coord, FeatureId, GeometryKind, Timestamp, Version};
use serde::{Deserialize, Serialize};

/// Delta-encoded vertex channels of a LineString or Polygon ring.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedLine {
    pub lat: Vec<i32>,
    pub lon: Vec<i32>,
}

/// Geometry selection of a creation event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireGeometry {
    #[default]
    None,
    Point(Coord),
    Linestring(EncodedLine),
    Polygon(EncodedLine),
}

/// Vertex edit command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    Insert,
    Delete,
    Change,
}

/// Ordered vertex edits as parallel arrays.
///
/// `index` is delta encoded: each operation's absolute index is the previous
/// operation's absolute index plus its own entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStringPatch {
    pub index: Vec<i32>,
    pub command: Vec<Command>,
    pub vector: Vec<Coord>,
}

impl LineStringPatch {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Geometry patch selection of a modification event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryPatch {
    #[default]
    None,
    /// Coordinate delta added to the point.
    PointPatch(Coord),
    LinestringPatch(LineStringPatch),
    /// Same shape and semantics as a LineString patch, applied to the ring.
    PolygonPatch(LineStringPatch),
}

impl GeometryPatch {
    pub fn kind(&self) -> Option<GeometryKind> {
        match self {
            GeometryPatch::None => None,
            GeometryPatch::PointPatch(_) => Some(GeometryKind::Point),
            GeometryPatch::LinestringPatch(_) => Some(GeometryKind::LineString),
            GeometryPatch::PolygonPatch(_) => Some(GeometryKind::Polygon),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, GeometryPatch::None)
    }
}

/// Parallel key/value arrays.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyList {
    pub key: Vec<String>,
    pub value: Vec<String>,
}

impl PropertyList {
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.key.push(key.into());
        self.value.push(value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = PropertyList::default();
        for (k, v) in iter {
            list.push(k, v);
        }
        list
    }
}

/// Property patch selection of a modification event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropPatch {
    #[default]
    None,
    Delete { key: Vec<String> },
    Insert(PropertyList),
    Update(PropertyList),
}

impl PropPatch {
    pub fn is_none(&self) -> bool {
        matches!(self, PropPatch::None)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationEvent {
    pub id: FeatureId,
    pub timestamp: Timestamp,
    pub version: Version,
    #[serde(default)]
    pub geometry: WireGeometry,
    #[serde(default)]
    pub properties: PropertyList,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationEvent {
    pub id: FeatureId,
    pub timestamp: Timestamp,
    pub version: Version,
    #[serde(default)]
    pub patch: GeometryPatch,
    #[serde(default)]
    pub prop_patch: PropPatch,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionEvent {
    pub id: FeatureId,
    pub timestamp: Timestamp,
    pub version: Version,
}

/// Any event in a feature's history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Creation(CreationEvent),
    Modification(ModificationEvent),
    Deletion(DeletionEvent),
}

impl Event {
    pub fn id(&self) -> FeatureId {
        match self {
            Event::Creation(e) => e.id,
            Event::Modification(e) => e.id,
            Event::Deletion(e) => e.id,
        }
    }

    pub fn version(&self) -> Version {
        match self {
            Event::Creation(e) => e.version,
            Event::Modification(e) => e.version,
            Event::Deletion(e) => e.version,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        match self {
            Event::Creation(e) => e.timestamp,
            Event::Modification(e) => e.timestamp,
            Event::Deletion(e) => e.timestamp,
        }
    }

    /// Short name for logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Event::Creation(_) => "creation",
            Event::Modification(_) => "modification",
            Event::Deletion(_) => "deletion",
        }
    }
}

impl From<CreationEvent> for Event {
    fn from(e: CreationEvent) -> Self {
        Event::Creation(e)
    }
}

impl From<ModificationEvent> for Event {
    fn from(e: ModificationEvent) -> Self {
        Event::Modification(e)
    }
}

impl From<DeletionEvent> for Event {
    fn from(e: DeletionEvent) -> Self {
        Event::Deletion(e)
    }
}
