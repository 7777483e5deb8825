//! Message encodings for events.

use super::Event;
use crate::error::Result;

impl Event {
    /// Encode as MessagePack with named fields.
    pub fn to_msgpack(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self> {
        Ok(rmp_serde::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{ErrorKind, StoreError};
    use crate::events::{
        Command, Event, GeometryPatch, LineStringPatch, ModificationEvent, PropPatch,
    };
    use crate::types::{Coord, FeatureId, Timestamp, Version};
    use serde_json::json;

    fn sample_modification() -> Event {
        Event::Modification(ModificationEvent {
            id: FeatureId(42),
            timestamp: Timestamp(1_672_531_200_000_000),
            version: Version(3),
            patch: GeometryPatch::LinestringPatch(LineStringPatch {
                index: vec![1, 0],
                command: vec![Command::Insert, Command::Delete],
                vector: vec![Coord::new(5, 5), Coord::ZERO],
            }),
            prop_patch: PropPatch::Delete {
                key: vec!["name".into()],
            },
        })
    }

    #[test]
    fn test_msgpack_preserves_event() {
        let event = sample_modification();
        let bytes = event.to_msgpack().unwrap();
        assert_eq!(Event::from_msgpack(&bytes).unwrap(), event);
    }

    #[test]
    fn test_absent_oneof_decodes_to_none() {
        let raw = json!({
            "modification": {
                "id": 1,
                "timestamp": 0,
                "version": 2
            }
        });
        let event = Event::from_json(&serde_json::to_vec(&raw).unwrap()).unwrap();
        match event {
            Event::Modification(m) => {
                assert_eq!(m.patch, GeometryPatch::None);
                assert_eq!(m.prop_patch, PropPatch::None);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_zero_point_patch_is_not_none() {
        let raw = json!({
            "modification": {
                "id": 1,
                "timestamp": 0,
                "version": 2,
                "patch": { "point_patch": { "lat": 0, "lon": 0 } }
            }
        });
        let event = Event::from_json(&serde_json::to_vec(&raw).unwrap()).unwrap();
        match event {
            Event::Modification(m) => assert_eq!(m.patch, GeometryPatch::PointPatch(Coord::ZERO)),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_garbage_is_codec_error() {
        let err = Event::from_msgpack(&[0xc1, 0x00]).unwrap_err();
        assert!(matches!(err, StoreError::Deserialization(_)));
        assert_eq!(err.kind(), ErrorKind::Codec);
    }
}
