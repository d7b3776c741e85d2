//! Materialization of provider links into plain values.
//!
//! A value stored in the tree may contain `ConfigValue::Provider` links to
//! other nodes, at the top level or nested inside maps and arrays. Links are
//! followed lazily: while the tree is composed they stay in place unless a
//! merge needs to look inside one, and the value finally handed to a caller
//! has every remaining link replaced by the linked node's resolved value.
//!
//! # Depth Limiting
//!
//! Materialization enforces a maximum depth to prevent stack overflow from
//! deeply nested values or from provider links that form a cycle. Both map
//! nesting and provider hops count towards the limit. The default limit is
//! 256 levels.

use crate::node::Configuration;
use crate::types::{ConfigError, ConfigMap, ConfigValue};

/// Options for materialization.
#[derive(Debug, Clone)]
pub struct MaterializeOptions {
    /// Maximum nesting depth (default: 256).
    ///
    /// Resolution fails with `ConfigError::NestingTooDeep` beyond this depth.
    pub max_depth: usize,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// State threaded through one resolution.
#[derive(Debug)]
pub(crate) struct ResolveContext<'o> {
    options: &'o MaterializeOptions,
    path: Vec<String>,
}

impl<'o> ResolveContext<'o> {
    pub(crate) fn new(options: &'o MaterializeOptions) -> Self {
        Self {
            options,
            path: Vec::new(),
        }
    }

    /// Run `f` one level deeper, labelled `label` in error paths.
    pub(crate) fn descend<T>(
        &mut self,
        label: &str,
        f: impl FnOnce(&mut Self) -> Result<T, ConfigError>,
    ) -> Result<T, ConfigError> {
        if self.path.len() >= self.options.max_depth {
            let mut path = self.path.clone();
            path.push(label.to_string());
            return Err(ConfigError::NestingTooDeep {
                max_depth: self.options.max_depth,
                path,
            });
        }
        self.path.push(label.to_string());
        let result = f(self);
        self.path.pop();
        result
    }

    /// Resolve a linked provider as part of this resolution.
    pub(crate) fn follow(&mut self, provider: &Configuration) -> Result<ConfigValue, ConfigError> {
        let label = format!("<{}>", provider.name());
        self.descend(&label, |ctx| provider.resolve_in(ctx))
    }

    /// Like `follow`, but leave links inside the linked value in place.
    pub(crate) fn follow_raw(&mut self, provider: &Configuration) -> Result<ConfigValue, ConfigError> {
        let label = format!("<{}>", provider.name());
        self.descend(&label, |ctx| provider.raw_in(ctx))
    }
}

/// Replace every provider link inside `value` with its resolved value.
pub(crate) fn materialize(
    value: ConfigValue,
    ctx: &mut ResolveContext<'_>,
) -> Result<ConfigValue, ConfigError> {
    match value {
        ConfigValue::Provider(provider) => ctx.follow(&provider),
        ConfigValue::Map(entries) => {
            let mut out = ConfigMap::with_capacity(entries.len());
            for (key, child) in entries {
                let resolved = ctx.descend(&key, |ctx| materialize(child, ctx))?;
                out.insert(key, resolved);
            }
            Ok(ConfigValue::Map(out))
        }
        ConfigValue::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                out.push(ctx.descend(&index.to_string(), |ctx| materialize(item, ctx))?);
            }
            Ok(ConfigValue::Array(out))
        }
        scalar => Ok(scalar),
    }
}

/// Deep merge that looks through provider links.
///
/// Same rules as [`crate::merge::deep_merge`], except that a provider meeting
/// a map on the other side is resolved first, so it merges key by key like
/// the value it stands for. Links that meet no map stay unresolved.
pub(crate) fn merge_linked(
    base: ConfigValue,
    overlay: ConfigValue,
    ctx: &mut ResolveContext<'_>,
) -> Result<ConfigValue, ConfigError> {
    match (base, overlay) {
        (ConfigValue::Map(mut base), ConfigValue::Map(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => {
                        let existing = std::mem::take(slot);
                        *slot = ctx.descend(&key, |ctx| merge_linked(existing, value, ctx))?;
                    }
                    None => {
                        base.insert(key, value);
                    }
                }
            }
            Ok(ConfigValue::Map(base))
        }
        (ConfigValue::Provider(provider), overlay @ ConfigValue::Map(_)) => {
            let base = ctx.follow(&provider)?;
            merge_linked(base, overlay, ctx)
        }
        (base @ ConfigValue::Map(_), ConfigValue::Provider(provider)) => {
            let overlay = ctx.follow(&provider)?;
            merge_linked(base, overlay, ctx)
        }
        (_, overlay) => Ok(overlay),
    }
}

/// `merge_linked` with an optional base.
pub(crate) fn merge_linked_onto(
    base: Option<ConfigValue>,
    overlay: ConfigValue,
    ctx: &mut ResolveContext<'_>,
) -> Result<ConfigValue, ConfigError> {
    match base {
        Some(base) => merge_linked(base, overlay, ctx),
        None => Ok(overlay),
    }
}
