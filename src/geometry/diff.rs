//! Patch generation between two geometry versions.
//!
//! The vertex diff strips the common prefix and suffix, aligns the rest by
//! longest common subsequence, and turns each unmatched run into CHANGE
//! operations followed by the leftover DELETEs or INSERTs. Vectors are
//! computed against a simulated working sequence, so the emitted patch
//! follows exactly the rules [`apply_ops`](super::patch::apply_ops) uses.

use super::patch::{encode_ops, PatchOp};
use crate::error::{Result, StoreError};
use crate::events::GeometryPatch;
use crate::types::{Coord, Geometry};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Edit {
    Keep,
    Delete,
    Insert(usize),
}

/// Compute operations that turn `old` into `new`.
///
/// The alignment table is quadratic in the size of the changed middle
/// section, not in the full vertex count.
pub fn diff_vertices(old: &[Coord], new: &[Coord]) -> Vec<PatchOp> {
    let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
    let max_suffix = old.len().min(new.len()) - prefix;
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    let a = &old[prefix..old.len() - suffix];
    let b = &new[prefix..new.len() - suffix];

    let mut work = old.to_vec();
    let mut ops = Vec::new();
    let mut pos = prefix;

    let edits = align(a, b);
    let mut i = 0;
    while i < edits.len() {
        if edits[i] == Edit::Keep {
            pos += 1;
            i += 1;
            continue;
        }

        let mut deletes = 0;
        let mut inserts = Vec::new();
        while i < edits.len() && edits[i] != Edit::Keep {
            match edits[i] {
                Edit::Delete => deletes += 1,
                Edit::Insert(j) => inserts.push(b[j]),
                Edit::Keep => {}
            }
            i += 1;
        }

        let changes = deletes.min(inserts.len());
        for &target in &inserts[..changes] {
            ops.push(PatchOp::change(pos, target.delta_from(work[pos])));
            work[pos] = target;
            pos += 1;
        }
        for _ in changes..deletes {
            ops.push(PatchOp::delete(pos));
            work.remove(pos);
        }
        for &target in &inserts[changes..] {
            let vector = if pos == 0 {
                target
            } else if pos < work.len() {
                target.delta_from(work[pos])
            } else {
                target.delta_from(work[pos - 1])
            };
            ops.push(PatchOp::insert(pos, vector));
            work.insert(pos, target);
            pos += 1;
        }
    }

    debug_assert_eq!(work, new);
    ops
}

/// Edit script aligning `a` to `b` by longest common subsequence.
fn align(a: &[Coord], b: &[Coord]) -> Vec<Edit> {
    let (n, m) = (a.len(), b.len());
    let width = m + 1;
    // lcs[i * width + j] = LCS length of a[i..] and b[j..]
    let mut lcs = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i * width + j] = if a[i] == b[j] {
                lcs[(i + 1) * width + j + 1] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
            };
        }
    }

    let mut edits = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            edits.push(Edit::Keep);
            i += 1;
            j += 1;
        } else if lcs[(i + 1) * width + j] >= lcs[i * width + j + 1] {
            edits.push(Edit::Delete);
            i += 1;
        } else {
            edits.push(Edit::Insert(j));
            j += 1;
        }
    }
    edits.extend((i..n).map(|_| Edit::Delete));
    edits.extend((j..m).map(Edit::Insert));
    edits
}

/// Compute the geometry patch between two versions of the same feature.
///
/// Returns [`GeometryPatch::None`] when the geometries are equal.
pub fn diff_geometry(old: &Geometry, new: &Geometry) -> Result<GeometryPatch> {
    match (old, new) {
        (Geometry::Point(a), Geometry::Point(b)) => Ok(if a == b {
            GeometryPatch::None
        } else {
            GeometryPatch::PointPatch(b.delta_from(*a))
        }),
        (Geometry::LineString(a), Geometry::LineString(b)) => {
            let ops = diff_vertices(a, b);
            if ops.is_empty() {
                Ok(GeometryPatch::None)
            } else {
                Ok(GeometryPatch::LinestringPatch(encode_ops(&ops)?))
            }
        }
        (Geometry::Polygon(a), Geometry::Polygon(b)) => {
            let ops = diff_vertices(a, b);
            if ops.is_empty() {
                Ok(GeometryPatch::None)
            } else {
                Ok(GeometryPatch::PolygonPatch(encode_ops(&ops)?))
            }
        }
        (old, new) => Err(StoreError::GeometryTypeMismatch {
            expected: old.kind(),
            got: new.kind(),
        }),
    }
}
