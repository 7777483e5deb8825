//! Geometry decoding, patching, and diffing.
//!
//! Wire geometries carry delta-encoded coordinate channels; everything past
//! [`decode_geometry`] works on absolute coordinates.

pub mod codec;
pub mod diff;
pub mod patch;

pub use diff::{diff_geometry, diff_vertices};
pub use patch::{apply_geometry_patch, apply_line_patch, apply_ops, PatchOp};

use crate::error::{Result, StoreError};
use crate::events::{EncodedLine, WireGeometry};
use crate::types::Geometry;

/// Decode a wire geometry into absolute coordinates.
pub fn decode_geometry(wire: &WireGeometry) -> Result<Geometry> {
    match wire {
        WireGeometry::None => Err(StoreError::MalformedGeometry(
            "no geometry selected".into(),
        )),
        WireGeometry::Point(c) => Ok(Geometry::Point(*c)),
        WireGeometry::Linestring(line) => Ok(Geometry::LineString(codec::decode_vertices(
            &line.lat, &line.lon,
        )?)),
        WireGeometry::Polygon(ring) => Ok(Geometry::Polygon(codec::decode_vertices(
            &ring.lat, &ring.lon,
        )?)),
    }
}

/// Encode a geometry into its wire form.
pub fn encode_geometry(geometry: &Geometry) -> WireGeometry {
    match geometry {
        Geometry::Point(c) => WireGeometry::Point(*c),
        Geometry::LineString(v) => WireGeometry::Linestring(encode_line(v)),
        Geometry::Polygon(v) => WireGeometry::Polygon(encode_line(v)),
    }
}

fn encode_line(vertices: &[crate::types::Coord]) -> EncodedLine {
    let (lat, lon) = codec::encode_vertices(vertices);
    EncodedLine { lat, lon }
}
