//! Key/value property patching and diffing.

mod diff;
mod patch;

pub use diff::diff_properties;
pub use patch::{apply_prop_patch, properties_from_list, properties_to_list};
