//! Deep merging of configuration layers.
//!
//! Layers are combined left to right: the later (overriding) layer wins.
//!
//! - Keys present in only one side are kept.
//! - Keys present in both sides, where both values are maps, merge recursively.
//! - Anything else (scalar vs map, array vs array, map vs scalar) is a
//!   conflict and the overriding side wins outright.
//!
//! Merging is associative: `(a <> b) <> c == a <> (b <> c)`.
//!
//! Provider links are opaque here; callers materialize layers first when the
//! linked value should take part in the merge.

use crate::types::ConfigValue;

/// Merge `overlay` on top of `base`.
///
/// Key order follows `base`, with keys new in `overlay` appended in their
/// overlay order.
pub fn deep_merge(base: ConfigValue, overlay: ConfigValue) -> ConfigValue {
    match (base, overlay) {
        (ConfigValue::Map(mut base), ConfigValue::Map(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => {
                        let existing = std::mem::take(slot);
                        *slot = deep_merge(existing, value);
                    }
                    None => {
                        base.insert(key, value);
                    }
                }
            }
            ConfigValue::Map(base)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional base with an overlay.
pub fn merge_onto(base: Option<ConfigValue>, overlay: ConfigValue) -> ConfigValue {
    match base {
        Some(base) => deep_merge(base, overlay),
        None => overlay,
    }
}

/// Fold layers in order (first = lowest priority, last = highest).
///
/// Returns `None` when there are no layers.
pub fn merge_layers<I>(layers: I) -> Option<ConfigValue>
where
    I: IntoIterator<Item = ConfigValue>,
{
    layers
        .into_iter()
        .fold(None, |acc, layer| Some(merge_onto(acc, layer)))
}

/// Merge two optional layers; absent layers contribute nothing.
pub fn merge_optional(base: Option<ConfigValue>, overlay: Option<ConfigValue>) -> Option<ConfigValue> {
    match overlay {
        Some(overlay) => Some(merge_onto(base, overlay)),
        None => base,
    }
}
