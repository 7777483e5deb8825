//! # GeoChronicle
//!
//! An event-sourced store for map features. Every feature is built from an
//! ordered stream of creation, modification and deletion events; any past
//! version can be reconstructed by replay.
//!
//! ## Core Concepts
//!
//! - **Events**: Versioned wire messages carrying delta-encoded geometry and
//!   key/value property patches
//! - **Geometry**: Points, line strings and polygons in fixed-point
//!   coordinates (1e-7 degrees)
//! - **State**: A per-feature `Absent -> Live -> Deleted` state machine
//! - **Snapshots**: A bounded cache that shortens historical replay
//!
//! ## Example
//!
//! ```ignore
//! use geochronicle::{creation_event, Coord, FeatureId, FeatureStore, Geometry, Timestamp, Version};
//!
//! let store = FeatureStore::default();
//!
//! let created = creation_event(
//!     FeatureId(42),
//!     Timestamp::now(),
//!     &Geometry::Point(Coord::from_degrees(48.8566, 2.3522)),
//!     &[("name".to_string(), "Paris".to_string())].into(),
//! );
//! store.apply(created.into())?;
//!
//! let current = store.current_state(FeatureId(42));
//! let first = store.state_at_version(FeatureId(42), Version(1))?;
//! ```

pub mod error;
pub mod events;
pub mod geometry;
pub mod ingest;
pub mod properties;
pub mod state;
pub mod store;
pub mod types;

// Re-exports
pub use error::{ErrorKind, Result, StoreError};
pub use events::{
    creation_event, deletion_event, modification_events, Command, CreationEvent, DeletionEvent,
    EncodedLine, Event, GeometryPatch, LineStringPatch, ModificationEvent, PropPatch, PropertyList,
    WireGeometry,
};
pub use geometry::{apply_geometry_patch, decode_geometry, diff_geometry, encode_geometry, PatchOp};
pub use ingest::{ingest, IngestConfig, IngestReport, RejectedEvent};
pub use properties::{apply_prop_patch, diff_properties};
pub use state::{apply_event, replay, FeatureState, SnapshotCache};
pub use store::{FeatureStore, StoreConfig};
pub use types::*;
