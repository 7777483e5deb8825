//! Event construction from feature versions.
//!
//! These are the producer side of the encodings the store consumes: given
//! two states of the same feature they compute the geometry and property
//! patches between them.

use super::{CreationEvent, DeletionEvent, GeometryPatch, ModificationEvent, PropPatch};
use crate::error::{Result, StoreError};
use crate::geometry::{diff_geometry, encode_geometry};
use crate::properties::{diff_properties, properties_to_list};
use crate::types::{FeatureId, FeatureSnapshot, Geometry, Properties, Timestamp, Version};

/// Creation event for a new feature.
pub fn creation_event(
    id: FeatureId,
    timestamp: Timestamp,
    geometry: &Geometry,
    properties: &Properties,
) -> CreationEvent {
    CreationEvent {
        id,
        timestamp,
        version: Version::INITIAL,
        geometry: encode_geometry(geometry),
        properties: properties_to_list(properties),
    }
}

/// Modification events that take `prev` to the content of `curr`.
///
/// The first event carries the geometry patch and the first property patch;
/// any remaining property patches follow in their own events. Versions run
/// consecutively from `prev.version + 1`. Returns no events when nothing
/// changed.
pub fn modification_events(
    prev: &FeatureSnapshot,
    curr: &FeatureSnapshot,
    timestamp: Timestamp,
) -> Result<Vec<ModificationEvent>> {
    if prev.id != curr.id {
        return Err(StoreError::MalformedPatch(format!(
            "feature id mismatch: {} and {}",
            prev.id, curr.id
        )));
    }
    if prev.is_deleted() {
        return Err(StoreError::AlreadyDeleted(prev.id));
    }

    let geometry_patch = diff_geometry(&prev.geometry, &curr.geometry)?;
    let mut prop_patches = diff_properties(&prev.properties, &curr.properties).into_iter();

    let mut events = Vec::new();
    let mut version = prev.version;
    let mut patch = geometry_patch;
    loop {
        let prop_patch = prop_patches.next().unwrap_or(PropPatch::None);
        if patch.is_none() && prop_patch.is_none() {
            break;
        }
        version = following(prev.id, version)?;
        events.push(ModificationEvent {
            id: prev.id,
            timestamp,
            version,
            patch: std::mem::take(&mut patch),
            prop_patch,
        });
    }

    Ok(events)
}

/// Deletion event following `last`.
pub fn deletion_event(last: &FeatureSnapshot, timestamp: Timestamp) -> Result<DeletionEvent> {
    if last.is_deleted() {
        return Err(StoreError::AlreadyDeleted(last.id));
    }
    Ok(DeletionEvent {
        id: last.id,
        timestamp,
        version: following(last.id, last.version)?,
    })
}

fn following(id: FeatureId, version: Version) -> Result<Version> {
    version.next().ok_or(StoreError::VersionConflict {
        id,
        expected: version,
        got: version,
    })
}

impl ModificationEvent {
    /// Whether the event carries a geometry patch.
    pub fn has_geometry_patch(&self) -> bool {
        !matches!(self.patch, GeometryPatch::None)
    }
}
