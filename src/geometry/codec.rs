//! Delta codec for integer coordinate channels.
//!
//! Element 0 of an encoded channel is absolute; every later element is the
//! signed difference from its predecessor. Latitude and longitude are
//! separate channels of equal length.

use crate::error::{Result, StoreError};
use crate::types::Coord;

/// Running sum of a delta-encoded channel.
pub fn decode(deltas: &[i32]) -> Vec<i32> {
    let mut acc = 0i32;
    deltas
        .iter()
        .map(|&d| {
            acc = acc.wrapping_add(d);
            acc
        })
        .collect()
}

/// Inverse of [`decode`]. Total for every input.
pub fn encode(absolutes: &[i32]) -> Vec<i32> {
    let mut prev = 0i32;
    absolutes
        .iter()
        .map(|&a| {
            let d = a.wrapping_sub(prev);
            prev = a;
            d
        })
        .collect()
}

/// Decode a pair of channels into absolute vertices.
///
/// At least one vertex is required and both channels must be the same length.
pub fn decode_vertices(lat: &[i32], lon: &[i32]) -> Result<Vec<Coord>> {
    if lat.len() != lon.len() {
        return Err(StoreError::MalformedGeometry(format!(
            "lat/lon length mismatch ({} vs {})",
            lat.len(),
            lon.len()
        )));
    }
    if lat.is_empty() {
        return Err(StoreError::MalformedGeometry(
            "at least one vertex is required".into(),
        ));
    }

    Ok(decode(lat)
        .into_iter()
        .zip(decode(lon))
        .map(|(lat, lon)| Coord { lat, lon })
        .collect())
}

/// Encode vertices into `(lat, lon)` delta channels.
pub fn encode_vertices(vertices: &[Coord]) -> (Vec<i32>, Vec<i32>) {
    let lat: Vec<i32> = vertices.iter().map(|c| c.lat).collect();
    let lon: Vec<i32> = vertices.iter().map(|c| c.lon).collect();
    (encode(&lat), encode(&lon))
}
