//! Deep copies of configuration trees.
//!
//! Copying any node copies the tree it belongs to, from its root down through
//! every cached descendant, and returns the counterpart of the node it was
//! called on. Provider links inside copied values are copied through the
//! same memo, so links between nodes of one tree point into the new tree
//! afterwards and a node is never copied twice.

use std::collections::HashMap;

use tracing::trace;

use crate::node::Configuration;
use crate::types::{ConfigMap, ConfigValue};

/// Table of nodes already copied, keyed by source node identity.
///
/// Seeding the memo with a `(source, copy)` pair makes every deep copy of
/// `source` through this memo return `copy` as-is, and a copied tree that
/// contains `source` holds `copy` in its place.
#[derive(Debug, Default)]
pub struct CopyMemo {
    // The source handle is kept alive so its address cannot be reused.
    copies: HashMap<usize, (Configuration, Configuration)>,
}

impl CopyMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `copy` as the counterpart of `source`.
    pub fn insert(&mut self, source: &Configuration, copy: Configuration) {
        self.copies.insert(source.address(), (source.clone(), copy));
    }

    /// The recorded counterpart of `source`, if any.
    pub fn get(&self, source: &Configuration) -> Option<Configuration> {
        self.copies
            .get(&source.address())
            .map(|(_, copy)| copy.clone())
    }

    pub fn len(&self) -> usize {
        self.copies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }
}

impl Configuration {
    /// Copy this node's tree, recording every copied node in `memo`.
    pub fn deep_copy(&self, memo: &mut CopyMemo) -> Configuration {
        if let Some(copy) = memo.get(self) {
            return copy;
        }

        let root = self.root();
        let root_copy = match memo.get(&root) {
            Some(copy) => copy,
            None => {
                let copy = root.detached_like();
                memo.insert(&root, copy.clone());
                copy_subtree(&root, &copy, memo);
                trace!(name = %root.name(), copied = memo.len(), "copied configuration tree");
                copy
            }
        };

        // Walk down from the root copy; the nodes exist unless the root copy
        // came pre-seeded, in which case they are created empty.
        let below_root = &self.segments()[root.segments().len()..];
        let copy = below_root
            .iter()
            .fold(root_copy, |node, segment| node.child_unchecked(segment));
        if memo.get(self).is_none() {
            memo.insert(self, copy.clone());
        }
        copy
    }

    /// Copy this node's tree with a fresh memo.
    pub fn deep_copy_fresh(&self) -> Configuration {
        self.deep_copy(&mut CopyMemo::new())
    }
}

fn copy_subtree(source: &Configuration, target: &Configuration, memo: &mut CopyMemo) {
    let own_value = source.own_value().map(|value| value.deep_copy(memo));
    let overrides = source
        .overridden()
        .into_iter()
        .map(|value| value.deep_copy(memo))
        .collect();
    target.restore(own_value, overrides);

    for (segment, child) in source.child_nodes() {
        let child_copy = match memo.get(&child) {
            None => {
                let copy = target.child_unchecked(&segment);
                memo.insert(&child, copy.clone());
                copy
            }
            // Already created in this copy by a link that reached it first.
            Some(existing) if target.cached_child(&segment).is_some_and(|cached| cached.ptr_eq(&existing)) => {
                existing
            }
            Some(seeded) => {
                target.attach_child(&segment, &seeded);
                continue;
            }
        };
        copy_subtree(&child, &child_copy, memo);
    }
}

impl ConfigValue {
    /// Copy this value, deep-copying linked providers through `memo`.
    pub fn deep_copy(&self, memo: &mut CopyMemo) -> ConfigValue {
        match self {
            ConfigValue::Provider(provider) => ConfigValue::Provider(provider.deep_copy(memo)),
            ConfigValue::Map(entries) => ConfigValue::Map(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.deep_copy(memo)))
                    .collect::<ConfigMap>(),
            ),
            ConfigValue::Array(items) => {
                ConfigValue::Array(items.iter().map(|item| item.deep_copy(memo)).collect())
            }
            scalar => scalar.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_is_distinct() {
        let config = Configuration::new("config");
        let copy = config.deep_copy_fresh();
        assert!(!copy.ptr_eq(&config));
        assert_eq!(copy.name(), "config");
        assert!(copy.is_root());
    }

    #[test]
    fn test_copy_is_independent() {
        let config = Configuration::new("config");
        config.update(ConfigValue::singleton("a", 1.into()));
        config.at_path("b.c").unwrap().push_override("x".into());

        let copy = config.deep_copy_fresh();
        assert_eq!(copy.resolve().unwrap(), config.resolve().unwrap());

        config.update(ConfigValue::singleton("a", 2.into()));
        assert_eq!(
            copy.at_path("a").unwrap().resolve().unwrap(),
            ConfigValue::Integer(1)
        );
        assert!(copy.at_path("b.c").unwrap().is_overridden());
    }

    #[test]
    fn test_copy_of_child_returns_counterpart() {
        let config = Configuration::new("config");
        let b = config.at_path("a.b").unwrap();
        b.update(3.into());

        let mut memo = CopyMemo::new();
        let b_copy = b.deep_copy(&mut memo);
        assert!(!b_copy.ptr_eq(&b));
        assert_eq!(b_copy.name(), "config.a.b");
        assert!(!b_copy.is_root());
        assert_eq!(b_copy.resolve().unwrap(), ConfigValue::Integer(3));

        let root_copy = memo.get(&config).unwrap();
        assert!(root_copy.at_path("a.b").unwrap().ptr_eq(&b_copy));
    }

    #[test]
    fn test_seeded_child_is_reused() {
        let config = Configuration::new("config");
        let a = config.child("a").unwrap();
        a.update(1.into());
        a.child("inner").unwrap().update(true.into());

        let seeded = Configuration::new("replacement");
        seeded.update(2.into());
        let mut memo = CopyMemo::new();
        memo.insert(&a, seeded.clone());

        let copy = config.deep_copy(&mut memo);
        assert!(copy.child("a").unwrap().ptr_eq(&seeded));
        assert!(memo.get(&a).unwrap().ptr_eq(&seeded));
        assert!(a.deep_copy(&mut memo).ptr_eq(&seeded));
        assert!(seeded.children().is_empty());
        assert_eq!(copy.resolve().unwrap(), ConfigValue::singleton("a", 2.into()));
    }

    #[test]
    fn test_memo_returns_same_instance() {
        let config = Configuration::new("config");
        let mut memo = CopyMemo::new();
        let first = config.deep_copy(&mut memo);
        let second = config.deep_copy(&mut memo);
        assert!(first.ptr_eq(&second));
    }

    #[test]
    fn test_internal_links_point_into_copy() {
        let config = Configuration::new("main");
        config.child("source").unwrap().update("value".into());
        config
            .child("alias")
            .unwrap()
            .push_override(ConfigValue::Provider(config.child("source").unwrap()));

        let copy = config.deep_copy_fresh();
        let linked = copy.child("alias").unwrap().overridden();
        let target = linked[0].as_provider().unwrap();
        assert!(target.ptr_eq(&copy.child("source").unwrap()));

        copy.child("source").unwrap().update("changed".into());
        assert_eq!(
            copy.child("alias").unwrap().resolve().unwrap(),
            ConfigValue::from("changed")
        );
        assert_eq!(
            config.child("alias").unwrap().resolve().unwrap(),
            ConfigValue::from("value")
        );
    }
}
