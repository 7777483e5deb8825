//! State transitions for single events.

use super::FeatureState;
use crate::error::{Result, StoreError};
use crate::events::{CreationEvent, DeletionEvent, Event, ModificationEvent};
use crate::geometry::{apply_geometry_patch, decode_geometry};
use crate::properties::{apply_prop_patch, properties_from_list};
use crate::types::{FeatureSnapshot, FeatureStatus, Version};

/// Apply one event to a feature state, producing the next state.
///
/// The input state is never modified; on error the caller keeps it as is.
/// Lifecycle and version checks run before any patch is looked at.
pub fn apply_event(state: &FeatureState, event: &Event) -> Result<FeatureState> {
    let id = event.id();
    match state {
        FeatureState::Deleted(_) => Err(StoreError::AlreadyDeleted(id)),

        FeatureState::Absent => match event {
            Event::Creation(e) => create(e),
            _ => Err(StoreError::UnknownFeature(id)),
        },

        FeatureState::Live(current) => {
            if current.id != id {
                return Err(StoreError::UnknownFeature(id));
            }
            let expected = current.version.next();
            let conflict = StoreError::VersionConflict {
                id,
                expected: expected.unwrap_or(current.version),
                got: event.version(),
            };
            match event {
                // version 1 is taken once the feature is live
                Event::Creation(_) => Err(conflict),
                _ if Some(event.version()) != expected => Err(conflict),
                Event::Modification(e) => modify(current, e),
                Event::Deletion(e) => Ok(delete(current, e)),
            }
        }
    }
}

fn create(event: &CreationEvent) -> Result<FeatureState> {
    if event.version != Version::INITIAL {
        return Err(StoreError::VersionConflict {
            id: event.id,
            expected: Version::INITIAL,
            got: event.version,
        });
    }

    Ok(FeatureState::Live(FeatureSnapshot {
        id: event.id,
        version: event.version,
        timestamp: event.timestamp,
        status: FeatureStatus::Live,
        geometry: decode_geometry(&event.geometry)?,
        properties: properties_from_list(&event.properties)?,
    }))
}

fn modify(current: &FeatureSnapshot, event: &ModificationEvent) -> Result<FeatureState> {
    if event.patch.is_none() && event.prop_patch.is_none() {
        return Err(StoreError::MalformedPatch(
            "modification carries no patch".into(),
        ));
    }

    let geometry = if event.patch.is_none() {
        current.geometry.clone()
    } else {
        apply_geometry_patch(&current.geometry, &event.patch)?
    };

    let mut properties = current.properties.clone();
    if !event.prop_patch.is_none() {
        apply_prop_patch(&mut properties, &event.prop_patch)?;
    }

    Ok(FeatureState::Live(FeatureSnapshot {
        id: current.id,
        version: event.version,
        timestamp: event.timestamp,
        status: FeatureStatus::Live,
        geometry,
        properties,
    }))
}

fn delete(current: &FeatureSnapshot, event: &DeletionEvent) -> FeatureState {
    FeatureState::Deleted(FeatureSnapshot {
        version: event.version,
        timestamp: event.timestamp,
        status: FeatureStatus::Deleted,
        ..current.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::events::{GeometryPatch, LineStringPatch, PropPatch, WireGeometry};
    use crate::types::{Coord, FeatureId, Geometry, Timestamp};

    fn creation(version: i32) -> Event {
        Event::Creation(CreationEvent {
            id: FeatureId(5),
            timestamp: Timestamp(0),
            version: Version(version),
            geometry: WireGeometry::Point(Coord::new(20_000_000, 10_000_000)),
            properties: [("testKey", "testValue")].into_iter().collect(),
        })
    }

    fn modification(version: i32, patch: GeometryPatch, prop_patch: PropPatch) -> Event {
        Event::Modification(ModificationEvent {
            id: FeatureId(5),
            timestamp: Timestamp(version as i64),
            version: Version(version),
            patch,
            prop_patch,
        })
    }

    fn deletion(version: i32) -> Event {
        Event::Deletion(DeletionEvent {
            id: FeatureId(5),
            timestamp: Timestamp(0),
            version: Version(version),
        })
    }

    fn live() -> FeatureState {
        apply_event(&FeatureState::Absent, &creation(1)).unwrap()
    }

    #[test]
    fn test_create() {
        let state = live();
        let s = state.snapshot().unwrap();
        assert_eq!(s.version, Version(1));
        assert_eq!(s.geometry, Geometry::Point(Coord::new(20_000_000, 10_000_000)));
        assert_eq!(s.properties.get("testKey").map(String::as_str), Some("testValue"));
    }

    #[test]
    fn test_create_requires_version_one() {
        let err = apply_event(&FeatureState::Absent, &creation(14)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionConflict);
    }

    #[test]
    fn test_create_on_live_conflicts() {
        let err = apply_event(&live(), &creation(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionConflict);
    }

    #[test]
    fn test_modify_absent_is_unknown() {
        let event = modification(1, GeometryPatch::PointPatch(Coord::ZERO), PropPatch::None);
        let err = apply_event(&FeatureState::Absent, &event).unwrap_err();
        assert_eq!(err, StoreError::UnknownFeature(FeatureId(5)));
    }

    #[test]
    fn test_version_gap() {
        let event = modification(3, GeometryPatch::PointPatch(Coord::ZERO), PropPatch::None);
        let err = apply_event(&live(), &event).unwrap_err();
        assert_eq!(
            err,
            StoreError::VersionConflict {
                id: FeatureId(5),
                expected: Version(2),
                got: Version(3),
            }
        );
    }

    #[test]
    fn test_no_version_after_max() {
        let mut state = live();
        if let FeatureState::Live(ref mut s) = state {
            s.version = Version(i32::MAX);
        }
        let event = modification(i32::MAX, GeometryPatch::PointPatch(Coord::ZERO), PropPatch::None);
        let err = apply_event(&state, &event).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionConflict);
    }

    #[test]
    fn test_version_checked_before_patch() {
        // Both wrong version and wrong geometry type: the version wins.
        let event = modification(
            7,
            GeometryPatch::LinestringPatch(LineStringPatch::default()),
            PropPatch::None,
        );
        let err = apply_event(&live(), &event).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionConflict);
    }

    #[test]
    fn test_empty_modification_is_malformed() {
        let event = modification(2, GeometryPatch::None, PropPatch::None);
        let err = apply_event(&live(), &event).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPatch);
    }

    #[test]
    fn test_geometry_and_properties_together_are_atomic() {
        let event = modification(
            2,
            GeometryPatch::PointPatch(Coord::new(1, 1)),
            PropPatch::Delete {
                key: vec!["missing".into()],
            },
        );
        let state = live();
        let err = apply_event(&state, &event).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingPropertyKey);
        assert_eq!(state, live());
    }

    #[test]
    fn test_delete_is_terminal() {
        let deleted = apply_event(&live(), &deletion(2)).unwrap();
        assert_eq!(deleted.status(), Some(FeatureStatus::Deleted));
        assert_eq!(deleted.version(), Some(Version(2)));

        let event = modification(3, GeometryPatch::PointPatch(Coord::ZERO), PropPatch::None);
        assert_eq!(
            apply_event(&deleted, &event).unwrap_err(),
            StoreError::AlreadyDeleted(FeatureId(5))
        );
        assert_eq!(
            apply_event(&deleted, &deletion(3)).unwrap_err(),
            StoreError::AlreadyDeleted(FeatureId(5))
        );
    }
}
