//! Vertex patch application.
//!
//! Operations are applied one at a time, in array order, against the
//! sequence as mutated by every earlier operation. Index shifts caused by
//! earlier inserts and deletes are therefore already reflected in the
//! working length when a later operation is checked.

use crate::error::{Result, StoreError};
use crate::events::{Command, GeometryPatch, LineStringPatch};
use crate::types::{Coord, Geometry};

/// A single vertex edit with its absolute index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatchOp {
    pub index: i64,
    pub command: Command,
    pub vector: Coord,
}

impl PatchOp {
    pub fn insert(index: usize, vector: Coord) -> Self {
        Self { index: index as i64, command: Command::Insert, vector }
    }

    pub fn delete(index: usize) -> Self {
        Self { index: index as i64, command: Command::Delete, vector: Coord::ZERO }
    }

    pub fn change(index: usize, vector: Coord) -> Self {
        Self { index: index as i64, command: Command::Change, vector }
    }
}

/// Resolve the delta-encoded index array into absolute operations.
pub fn decode_ops(patch: &LineStringPatch) -> Result<Vec<PatchOp>> {
    if patch.command.len() != patch.index.len() || patch.vector.len() != patch.index.len() {
        return Err(StoreError::MalformedPatch(format!(
            "parallel arrays differ in length (index {}, command {}, vector {})",
            patch.index.len(),
            patch.command.len(),
            patch.vector.len()
        )));
    }

    let mut absolute = 0i64;
    Ok(patch
        .index
        .iter()
        .zip(&patch.command)
        .zip(&patch.vector)
        .map(|((&delta, &command), &vector)| {
            absolute += i64::from(delta);
            PatchOp { index: absolute, command, vector }
        })
        .collect())
}

/// Encode absolute operations back into the wire shape.
pub fn encode_ops(ops: &[PatchOp]) -> Result<LineStringPatch> {
    let mut patch = LineStringPatch::default();
    let mut prev = 0i64;
    for op in ops {
        let delta = i32::try_from(op.index - prev).map_err(|_| {
            StoreError::MalformedPatch(format!("index step {} does not fit i32", op.index - prev))
        })?;
        prev = op.index;
        patch.index.push(delta);
        patch.command.push(op.command);
        patch.vector.push(op.vector);
    }
    Ok(patch)
}

/// Apply operations to a copy of `vertices`.
///
/// INSERT places a new vertex at `i` (`0 <= i <= len`). At `i == 0` the
/// vector is absolute; otherwise it is a delta from the vertex currently at
/// `i`, or from the last vertex when appending at `i == len`.
pub fn apply_ops(vertices: &[Coord], ops: &[PatchOp]) -> Result<Vec<Coord>> {
    let mut work = vertices.to_vec();

    for (n, op) in ops.iter().enumerate() {
        let len = work.len() as i64;
        match op.command {
            Command::Insert => {
                if op.index < 0 || op.index > len {
                    return Err(out_of_range(n, op, "insert", len));
                }
                let i = op.index as usize;
                let vertex = if i == 0 {
                    op.vector
                } else if i < work.len() {
                    work[i].offset(op.vector)
                } else {
                    work[i - 1].offset(op.vector)
                };
                work.insert(i, vertex);
            }
            Command::Delete => {
                if !op.vector.is_zero() {
                    return Err(StoreError::MalformedPatch(format!(
                        "op {}: delete carries nonzero vector {:?}",
                        n, op.vector
                    )));
                }
                if op.index < 0 || op.index >= len {
                    return Err(out_of_range(n, op, "delete", len));
                }
                work.remove(op.index as usize);
            }
            Command::Change => {
                if op.index < 0 || op.index >= len {
                    return Err(out_of_range(n, op, "change", len));
                }
                let i = op.index as usize;
                work[i] = work[i].offset(op.vector);
            }
        }
    }

    if work.is_empty() {
        return Err(StoreError::MalformedGeometry(
            "patch removes every vertex".into(),
        ));
    }

    Ok(work)
}

fn out_of_range(n: usize, op: &PatchOp, what: &str, len: i64) -> StoreError {
    StoreError::MalformedPatch(format!(
        "op {}: {} index {} out of range (len {})",
        n, what, op.index, len
    ))
}

/// Apply a wire-shaped LineString patch.
pub fn apply_line_patch(vertices: &[Coord], patch: &LineStringPatch) -> Result<Vec<Coord>> {
    apply_ops(vertices, &decode_ops(patch)?)
}

/// Apply a geometry patch, checking it against the geometry variant.
pub fn apply_geometry_patch(geometry: &Geometry, patch: &GeometryPatch) -> Result<Geometry> {
    match (geometry, patch) {
        (_, GeometryPatch::None) => Err(StoreError::MalformedPatch(
            "no geometry patch selected".into(),
        )),
        (Geometry::Point(c), GeometryPatch::PointPatch(delta)) => {
            Ok(Geometry::Point(c.offset(*delta)))
        }
        (Geometry::LineString(v), GeometryPatch::LinestringPatch(p)) => {
            Ok(Geometry::LineString(apply_line_patch(v, p)?))
        }
        (Geometry::Polygon(v), GeometryPatch::PolygonPatch(p)) => {
            Ok(Geometry::Polygon(apply_line_patch(v, p)?))
        }
        (geometry, patch) => Err(StoreError::GeometryTypeMismatch {
            expected: geometry.kind(),
            // None was handled above
            got: patch.kind().unwrap_or(geometry.kind()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeometryKind;

    fn coords(pairs: &[(i32, i32)]) -> Vec<Coord> {
        pairs.iter().copied().map(Coord::from).collect()
    }

    #[test]
    fn test_insert_then_delete() {
        let start = coords(&[(0, 0), (10, 10), (20, 20)]);

        let after_insert = apply_ops(&start, &[PatchOp::insert(1, Coord::new(5, 5))]).unwrap();
        assert_eq!(after_insert, coords(&[(0, 0), (15, 15), (10, 10), (20, 20)]));

        let after_delete = apply_ops(&after_insert, &[PatchOp::delete(0)]).unwrap();
        assert_eq!(after_delete, coords(&[(15, 15), (10, 10), (20, 20)]));
    }

    #[test]
    fn test_insert_at_zero_is_absolute() {
        let start = coords(&[(10, 10)]);
        let out = apply_ops(&start, &[PatchOp::insert(0, Coord::new(3, 4))]).unwrap();
        assert_eq!(out, coords(&[(3, 4), (10, 10)]));
    }

    #[test]
    fn test_append_is_relative_to_last() {
        let start = coords(&[(0, 0), (10, 10)]);
        let out = apply_ops(&start, &[PatchOp::insert(2, Coord::new(1, -1))]).unwrap();
        assert_eq!(out, coords(&[(0, 0), (10, 10), (11, 9)]));
    }

    #[test]
    fn test_change_adds_vector() {
        let start = coords(&[(0, 0), (1, 1)]);
        let out = apply_ops(&start, &[PatchOp::change(0, Coord::new(2, 2))]).unwrap();
        assert_eq!(out, coords(&[(2, 2), (1, 1)]));
    }

    #[test]
    fn test_indices_are_cumulative_and_sequential() {
        // Absolute indices 1, 1, 3: insert shifts the tail, then delete the
        // inserted vertex, then change the last one.
        let patch = LineStringPatch {
            index: vec![1, 0, 2],
            command: vec![Command::Insert, Command::Delete, Command::Change],
            vector: vec![Coord::new(1, 1), Coord::ZERO, Coord::new(-1, -1)],
        };
        let ops = decode_ops(&patch).unwrap();
        assert_eq!(ops.iter().map(|o| o.index).collect::<Vec<_>>(), vec![1, 1, 3]);

        let start = coords(&[(0, 0), (10, 10), (20, 20), (30, 30)]);
        let out = apply_line_patch(&start, &patch).unwrap();
        assert_eq!(out, coords(&[(0, 0), (10, 10), (20, 20), (29, 29)]));
    }

    #[test]
    fn test_index_past_end_after_delete_fails() {
        let start = coords(&[(0, 0), (1, 1)]);
        let ops = [PatchOp::delete(1), PatchOp::change(1, Coord::new(1, 1))];
        let err = apply_ops(&start, &ops).unwrap_err();
        assert!(matches!(err, StoreError::MalformedPatch(_)));
    }

    #[test]
    fn test_negative_index_fails() {
        let patch = LineStringPatch {
            index: vec![-1],
            command: vec![Command::Change],
            vector: vec![Coord::new(1, 1)],
        };
        let err = apply_line_patch(&coords(&[(0, 0)]), &patch).unwrap_err();
        assert!(matches!(err, StoreError::MalformedPatch(_)));
    }

    #[test]
    fn test_delete_with_vector_fails() {
        let ops = [PatchOp { index: 0, command: Command::Delete, vector: Coord::new(0, 1) }];
        let err = apply_ops(&coords(&[(0, 0), (1, 1)]), &ops).unwrap_err();
        assert!(matches!(err, StoreError::MalformedPatch(_)));
    }

    #[test]
    fn test_parallel_length_mismatch() {
        let patch = LineStringPatch {
            index: vec![0, 1],
            command: vec![Command::Change],
            vector: vec![Coord::ZERO, Coord::ZERO],
        };
        assert!(matches!(decode_ops(&patch), Err(StoreError::MalformedPatch(_))));
    }

    #[test]
    fn test_deleting_every_vertex_fails() {
        let err = apply_ops(&coords(&[(0, 0)]), &[PatchOp::delete(0)]).unwrap_err();
        assert!(matches!(err, StoreError::MalformedGeometry(_)));
    }

    #[test]
    fn test_geometry_patch_type_guard() {
        let point = Geometry::Point(Coord::new(1, 1));
        let err = apply_geometry_patch(
            &point,
            &GeometryPatch::LinestringPatch(LineStringPatch::default()),
        )
        .unwrap_err();
        assert_eq!(
            err,
            StoreError::GeometryTypeMismatch {
                expected: GeometryKind::Point,
                got: GeometryKind::LineString,
            }
        );
    }

    #[test]
    fn test_point_patch_is_delta() {
        let point = Geometry::Point(Coord::new(10_000_000, 20_000_000));
        let out =
            apply_geometry_patch(&point, &GeometryPatch::PointPatch(Coord::new(10_000_000, 0)))
                .unwrap();
        assert_eq!(out, Geometry::Point(Coord::new(20_000_000, 20_000_000)));
    }

    #[test]
    fn test_polygon_patch_uses_line_semantics() {
        let ring = Geometry::Polygon(coords(&[(0, 0), (0, 10), (10, 10), (0, 0)]));
        let patch = encode_ops(&[PatchOp::insert(3, Coord::new(0, -10))]).unwrap();
        let out = apply_geometry_patch(&ring, &GeometryPatch::PolygonPatch(patch)).unwrap();
        assert_eq!(
            out,
            Geometry::Polygon(coords(&[(0, 0), (0, 10), (10, 10), (0, -10), (0, 0)]))
        );
    }
}
