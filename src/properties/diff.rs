//! Property diff between two versions of a feature.

use crate::events::{PropPatch, PropertyList};
use crate::types::Properties;

/// Patches that turn `old` into `new`, in the order delete, update, insert.
///
/// Each patch carries a single variant, so a change that removes, rewrites
/// and adds keys at once yields three patches. Equal maps yield none.
pub fn diff_properties(old: &Properties, new: &Properties) -> Vec<PropPatch> {
    let deleted: Vec<String> = old
        .keys()
        .filter(|k| !new.contains_key(*k))
        .cloned()
        .collect();

    let mut updated = PropertyList::default();
    let mut inserted = PropertyList::default();
    for (k, v) in new {
        match old.get(k) {
            Some(prev) if prev == v => {}
            Some(_) => updated.push(k.as_str(), v.as_str()),
            None => inserted.push(k.as_str(), v.as_str()),
        }
    }

    let mut patches = Vec::new();
    if !deleted.is_empty() {
        patches.push(PropPatch::Delete { key: deleted });
    }
    if !updated.key.is_empty() {
        patches.push(PropPatch::Update(updated));
    }
    if !inserted.key.is_empty() {
        patches.push(PropPatch::Insert(inserted));
    }
    patches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::apply_prop_patch;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_equal_maps_have_no_patches() {
        let p = props(&[("a", "1")]);
        assert!(diff_properties(&p, &p).is_empty());
    }

    #[test]
    fn test_mixed_diff_applies_cleanly() {
        let old = props(&[("keep", "1"), ("gone", "2"), ("change", "3")]);
        let new = props(&[("keep", "1"), ("change", "33"), ("added", "4")]);

        let patches = diff_properties(&old, &new);
        assert_eq!(patches.len(), 3);
        assert!(matches!(patches[0], PropPatch::Delete { .. }));
        assert!(matches!(patches[1], PropPatch::Update(_)));
        assert!(matches!(patches[2], PropPatch::Insert(_)));

        let mut state = old;
        for patch in &patches {
            apply_prop_patch(&mut state, patch).unwrap();
        }
        assert_eq!(state, new);
    }
}
