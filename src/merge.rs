//! # Merging configuration trees
//!
//! Two flavours of the same rule are provided. When both sides hold a
//! mapping, keys are merged recursively, anything else is overwritten by the
//! later value. Lists are values, they are never appended nor deduplicated.
//!
//! - [Merge] works on the typed [VirtualMachine] tree and is what the
//!   builder uses to attach its optional sections.
//! - [deep_merge] works on untyped JSON and backs [merge_patch], for callers
//!   who need a partial nested update of an existing document.
use kubepilot_models::models::{Cpu, VirtualMachine};
use serde_json::Value;

/// Merge `other` into `self`, `other` wins on conflicting leaves.
pub trait Merge {
    fn merge(&mut self, other: Self);
}

impl<T: Merge> Merge for Option<T> {
    fn merge(&mut self, other: Option<T>) {
        if let Some(other) = other {
            match self {
                Some(current) => current.merge(other),
                None => *self = Some(other),
            }
        }
    }
}

impl Merge for u32 {
    fn merge(&mut self, other: u32) {
        *self = other;
    }
}

impl<T> Merge for Vec<T> {
    fn merge(&mut self, other: Vec<T>) {
        *self = other;
    }
}

impl Merge for Cpu {
    fn merge(&mut self, other: Cpu) {
        self.cores.merge(other.cores);
    }
}

/// Recursively merge `patch` into `target`.
///
/// ```rust
/// use serde_json::json;
/// use kubepilot::merge::deep_merge;
///
/// let mut doc = json!({"domain": {"cpu": {"cores": 1}, "machine": {"type": ""}}});
/// deep_merge(&mut doc, json!({"domain": {"cpu": {"cores": 4}}}));
/// assert_eq!(doc, json!({"domain": {"cpu": {"cores": 4}, "machine": {"type": ""}}}));
/// ```
pub fn deep_merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

/// Apply an untyped patch on a copy of `vm`, the result must still be a
/// valid [VirtualMachine].
pub fn merge_patch(vm: &VirtualMachine, patch: Value) -> Result<VirtualMachine, serde_json::Error> {
    let mut doc = serde_json::to_value(vm)?;
    deep_merge(&mut doc, patch);
    serde_json::from_value(doc)
}
