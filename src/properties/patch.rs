//! Property patch application.
//!
//! Every key is validated before the map is touched, so a rejected patch
//! leaves the properties exactly as they were.

use crate::error::{Result, StoreError};
use crate::events::{PropPatch, PropertyList};
use crate::types::Properties;
use std::collections::BTreeSet;

/// Apply one property patch in place.
pub fn apply_prop_patch(properties: &mut Properties, patch: &PropPatch) -> Result<()> {
    match patch {
        PropPatch::None => Err(StoreError::MalformedPatch(
            "no property patch selected".into(),
        )),

        PropPatch::Delete { key } => {
            let mut seen = BTreeSet::new();
            for k in key {
                if !properties.contains_key(k) || !seen.insert(k.as_str()) {
                    return Err(StoreError::MissingPropertyKey(k.clone()));
                }
            }
            for k in key {
                properties.remove(k);
            }
            Ok(())
        }

        PropPatch::Insert(list) => {
            check_parallel(list)?;
            let mut seen = BTreeSet::new();
            for k in &list.key {
                if properties.contains_key(k) || !seen.insert(k.as_str()) {
                    return Err(StoreError::DuplicatePropertyKey(k.clone()));
                }
            }
            for (k, v) in list.key.iter().zip(&list.value) {
                properties.insert(k.clone(), v.clone());
            }
            Ok(())
        }

        PropPatch::Update(list) => {
            check_parallel(list)?;
            if let Some(k) = list.key.iter().find(|k| !properties.contains_key(*k)) {
                return Err(StoreError::MissingPropertyKey(k.clone()));
            }
            for (k, v) in list.key.iter().zip(&list.value) {
                properties.insert(k.clone(), v.clone());
            }
            Ok(())
        }
    }
}

fn check_parallel(list: &PropertyList) -> Result<()> {
    if list.key.len() != list.value.len() {
        return Err(StoreError::MalformedPatch(format!(
            "{} keys but {} values",
            list.key.len(),
            list.value.len()
        )));
    }
    Ok(())
}

/// Build the initial property map of a creation event.
pub fn properties_from_list(list: &PropertyList) -> Result<Properties> {
    let mut properties = Properties::new();
    apply_prop_patch(&mut properties, &PropPatch::Insert(list.clone()))?;
    Ok(properties)
}

pub fn properties_to_list(properties: &Properties) -> PropertyList {
    properties.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}
