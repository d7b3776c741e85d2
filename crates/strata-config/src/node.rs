//! The configuration node tree.
//!
//! A [`Configuration`] is a cheap handle (`Arc`) to one node of a tree. The
//! root is created explicitly; every other node is created the first time it
//! is navigated to and then cached in its parent forever, so navigating the
//! same path twice always yields the same node.
//!
//! Each node carries two pieces of local state:
//!
//! - an optional own value, set by [`Configuration::update`] and the loaders
//! - a stack of overrides, pushed by [`Configuration::push_override`]
//!
//! Resolution composes the whole tree from the root. Each subtree is folded
//! bottom-up into its parent at the child's key, on top of whatever the
//! parent itself holds there:
//!
//! ```text
//! local   = own_value <> overrides[0] <> overrides[1] <> ...
//! subtree = local <> { segment: child subtree } <> ...
//! ```
//!
//! A node's local state therefore beats anything an ancestor supplies at its
//! path, whether that came from the ancestor's own value or its overrides.
//!
//! The root resolves to its local value. Every other node resolves to the
//! slice at its segment of its parent's value. Provider links are followed
//! only where a merge or a slice has to look inside them, and whatever links
//! remain in the final slice are materialized last.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::materialize::{MaterializeOptions, ResolveContext, materialize, merge_linked_onto};
use crate::merge::merge_onto;
use crate::types::{ConfigError, ConfigValue};

/// Name given to roots created through `Configuration::default()`.
pub const DEFAULT_NAME: &str = "config";

/// Prefix of segment names that navigation refuses.
const RESERVED_PREFIX: &str = "__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Root,
    Option,
}

#[derive(Debug, Clone)]
struct OverrideEntry {
    id: u64,
    value: ConfigValue,
}

#[derive(Debug, Default)]
struct NodeState {
    own_value: Option<ConfigValue>,
    overrides: Vec<OverrideEntry>,
    next_override_id: u64,
}

struct Node {
    /// Dotted display name (`config.a.b`).
    name: String,
    /// Segments below the root (empty for a root).
    segments: Vec<String>,
    kind: NodeKind,
    parent: Option<Weak<Node>>,
    state: RwLock<NodeState>,
    children: Mutex<IndexMap<String, Arc<Node>>>,
}

impl Node {
    fn new(name: String, segments: Vec<String>, kind: NodeKind, parent: Option<Weak<Node>>) -> Self {
        Self {
            name,
            segments,
            kind,
            parent,
            state: RwLock::new(NodeState::default()),
            children: Mutex::new(IndexMap::new()),
        }
    }

    fn state(&self) -> RwLockReadGuard<'_, NodeState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, NodeState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn children(&self) -> MutexGuard<'_, IndexMap<String, Arc<Node>>> {
        self.children.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

/// A node in a configuration tree.
///
/// Cloning a `Configuration` clones the handle, not the node: both handles
/// observe the same state. Equality is node identity. Use
/// [`Configuration::deep_copy`] for an independent tree.
#[derive(Clone)]
pub struct Configuration {
    node: Arc<Node>,
}

/// Handle to one entry on a node's override stack.
///
/// Dropping the handle keeps the override in place; call
/// [`OverrideHandle::release`] to remove just this entry.
#[derive(Debug)]
pub struct OverrideHandle {
    node: Weak<Node>,
    id: u64,
}

impl OverrideHandle {
    /// Remove this override from the stack.
    ///
    /// Returns `false` when the entry is already gone (released, or removed by
    /// a reset) or the node no longer exists.
    pub fn release(self) -> bool {
        let Some(node) = self.node.upgrade() else {
            return false;
        };
        let mut state = node.state_mut();
        let Some(index) = state.overrides.iter().position(|entry| entry.id == self.id) else {
            return false;
        };
        state.overrides.remove(index);
        trace!(name = %node.name, remaining = state.overrides.len(), "released override");
        true
    }
}

impl Configuration {
    /// Create a new root node named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            node: Arc::new(Node::new(name.into(), Vec::new(), NodeKind::Root, None)),
        }
    }

    /// Create a new root node whose own value starts as `value`.
    pub fn with_default(name: impl Into<String>, value: ConfigValue) -> Self {
        let config = Self::new(name);
        config.update(value);
        config
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Get the child node for `name`, creating and caching it on first use.
    ///
    /// Names starting with `__` are reserved and rejected with
    /// `ConfigError::ReservedName`. Every other string is accepted, including
    /// the empty string.
    pub fn child(&self, name: &str) -> Result<Configuration, ConfigError> {
        if name.starts_with(RESERVED_PREFIX) {
            return Err(ConfigError::ReservedName {
                name: name.to_string(),
                path: self.node.name.clone(),
            });
        }
        Ok(self.child_unchecked(name))
    }

    /// Navigate a dot-separated path of child names.
    ///
    /// An empty path returns this node.
    pub fn at_path(&self, path: &str) -> Result<Configuration, ConfigError> {
        if path.is_empty() {
            return Ok(self.clone());
        }
        path.split('.')
            .try_fold(self.clone(), |node, segment| node.child(segment))
    }

    pub(crate) fn child_unchecked(&self, segment: &str) -> Configuration {
        let mut children = self.node.children();
        if let Some(existing) = children.get(segment) {
            return Configuration {
                node: Arc::clone(existing),
            };
        }

        let mut segments = self.node.segments.clone();
        segments.push(segment.to_string());
        let child = Arc::new(Node::new(
            format!("{}.{}", self.node.name, segment),
            segments,
            NodeKind::Option,
            Some(Arc::downgrade(&self.node)),
        ));
        children.insert(segment.to_string(), Arc::clone(&child));
        debug!(name = %child.name, "created configuration option");

        Configuration { node: child }
    }

    /// The cached child at `segment`, without creating one.
    pub(crate) fn cached_child(&self, segment: &str) -> Option<Configuration> {
        self.node
            .children()
            .get(segment)
            .map(|node| Configuration { node: Arc::clone(node) })
    }

    /// Cache `child` as this node's child at `segment`, replacing any
    /// existing entry. `child` keeps its own name and parent.
    pub(crate) fn attach_child(&self, segment: &str, child: &Configuration) {
        self.node
            .children()
            .insert(segment.to_string(), Arc::clone(&child.node));
    }

    /// Segments of the children created so far, in creation order.
    pub fn children(&self) -> Vec<String> {
        self.node.children().keys().cloned().collect()
    }

    pub(crate) fn child_nodes(&self) -> Vec<(String, Configuration)> {
        self.node
            .children()
            .iter()
            .map(|(segment, node)| {
                (
                    segment.clone(),
                    Configuration {
                        node: Arc::clone(node),
                    },
                )
            })
            .collect()
    }

    /// The parent node, if this is a child whose parent still exists.
    pub fn parent(&self) -> Option<Configuration> {
        self.node
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|node| Configuration { node })
    }

    /// The topmost live ancestor (this node for a root).
    pub fn root(&self) -> Configuration {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Dotted name, e.g. `config.a.b.c`.
    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Segments from the root down to this node (empty for a root).
    pub fn segments(&self) -> &[String] {
        &self.node.segments
    }

    pub fn is_root(&self) -> bool {
        self.node.kind == NodeKind::Root
    }

    /// Check whether two handles refer to the same node.
    pub fn ptr_eq(&self, other: &Configuration) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    pub(crate) fn address(&self) -> usize {
        Arc::as_ptr(&self.node) as usize
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Compute the current value of this node.
    ///
    /// Unset paths resolve to `ConfigValue::Null`. Provider links are replaced
    /// by their linked values; the result never contains a
    /// `ConfigValue::Provider`.
    pub fn resolve(&self) -> Result<ConfigValue, ConfigError> {
        self.resolve_with_options(&MaterializeOptions::default())
    }

    /// Like [`Configuration::resolve`] with an explicit depth limit.
    pub fn resolve_with_options(&self, options: &MaterializeOptions) -> Result<ConfigValue, ConfigError> {
        let mut ctx = ResolveContext::new(options);
        self.resolve_in(&mut ctx)
    }

    pub(crate) fn resolve_in(&self, ctx: &mut ResolveContext<'_>) -> Result<ConfigValue, ConfigError> {
        let raw = self.raw_in(ctx)?;
        materialize(raw, ctx)
    }

    /// This node's value with provider links still in place.
    pub(crate) fn raw_in(&self, ctx: &mut ResolveContext<'_>) -> Result<ConfigValue, ConfigError> {
        match (self.parent(), self.node.segment()) {
            (Some(parent), Some(segment)) => {
                let value = parent.raw_in(ctx)?;
                slice(value, segment, ctx)
            }
            _ => Ok(self.subtree(ctx)?.unwrap_or_default()),
        }
    }

    /// Local value of this node with every child subtree merged on top.
    fn subtree(&self, ctx: &mut ResolveContext<'_>) -> Result<Option<ConfigValue>, ConfigError> {
        // Snapshot, then release the locks before following any link.
        let (own, overrides) = {
            let state = self.node.state();
            let overrides: Vec<ConfigValue> = state.overrides.iter().map(|entry| entry.value.clone()).collect();
            (state.own_value.clone(), overrides)
        };
        let children = self.child_nodes();

        let mut value = own;
        for overlay in overrides {
            value = Some(merge_linked_onto(value, overlay, ctx)?);
        }

        for (segment, child) in children {
            if let Some(child_value) = ctx.descend(&segment, |ctx| child.subtree(ctx))? {
                value = Some(merge_linked_onto(value, ConfigValue::singleton(segment, child_value), ctx)?);
            }
        }

        Ok(value)
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Replace this node's own value. The override stack is untouched.
    pub fn update(&self, value: ConfigValue) {
        self.node.state_mut().own_value = Some(value);
        trace!(name = %self.node.name, "updated value");
    }

    /// Deep-merge `incoming` into this node's own value in one step.
    pub(crate) fn merge_value(&self, incoming: ConfigValue) {
        let mut state = self.node.state_mut();
        let current = state.own_value.take();
        state.own_value = Some(merge_onto(current, incoming));
    }

    /// Drop this node's own value. The override stack is untouched.
    pub fn clear(&self) {
        self.node.state_mut().own_value = None;
        trace!(name = %self.node.name, "cleared value");
    }

    /// This node's own value, as set (not resolved).
    pub fn own_value(&self) -> Option<ConfigValue> {
        self.node.state().own_value.clone()
    }

    /// Push `value` on top of the override stack.
    ///
    /// `value` may be a `ConfigValue::Provider`, in which case this node
    /// follows the linked node's current value.
    pub fn push_override(&self, value: ConfigValue) -> OverrideHandle {
        let mut state = self.node.state_mut();
        let id = state.next_override_id;
        state.next_override_id += 1;
        state.overrides.push(OverrideEntry { id, value });
        trace!(name = %self.node.name, depth = state.overrides.len(), "pushed override");

        OverrideHandle {
            node: Arc::downgrade(&self.node),
            id,
        }
    }

    /// Remove every override of this node.
    pub fn reset_override(&self) {
        let mut state = self.node.state_mut();
        let removed = state.overrides.len();
        state.overrides.clear();
        trace!(name = %self.node.name, removed, "reset overrides");
    }

    /// Pop the most recent override, returning its value.
    pub fn reset_last_override(&self) -> Option<ConfigValue> {
        let mut state = self.node.state_mut();
        let entry = state.overrides.pop()?;
        trace!(name = %self.node.name, remaining = state.overrides.len(), "popped override");
        Some(entry.value)
    }

    /// Snapshot of the override stack, oldest first.
    pub fn overridden(&self) -> Vec<ConfigValue> {
        self.node
            .state()
            .overrides
            .iter()
            .map(|entry| entry.value.clone())
            .collect()
    }

    pub fn is_overridden(&self) -> bool {
        !self.node.state().overrides.is_empty()
    }

    /// Replace this node's whole local state.
    pub(crate) fn restore(&self, own_value: Option<ConfigValue>, overrides: Vec<ConfigValue>) {
        let mut state = self.node.state_mut();
        state.own_value = own_value;
        state.overrides.clear();
        for value in overrides {
            let id = state.next_override_id;
            state.next_override_id += 1;
            state.overrides.push(OverrideEntry { id, value });
        }
    }

    /// A new parentless node with this node's name and kind.
    pub(crate) fn detached_like(&self) -> Configuration {
        Configuration {
            node: Arc::new(Node::new(
                self.node.name.clone(),
                self.node.segments.clone(),
                self.node.kind,
                None,
            )),
        }
    }
}

/// The value at `segment` inside `value`, looking through provider links.
fn slice(value: ConfigValue, segment: &str, ctx: &mut ResolveContext<'_>) -> Result<ConfigValue, ConfigError> {
    match value {
        ConfigValue::Provider(provider) => {
            let linked = ctx.follow_raw(&provider)?;
            slice(linked, segment, ctx)
        }
        other => Ok(other.take_key(segment).unwrap_or_default()),
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new(DEFAULT_NAME)
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.node.kind {
            NodeKind::Root => "Configuration",
            NodeKind::Option => "ConfigurationOption",
        };
        write!(f, "{}({:?}) at {:p}", kind, self.node.name, Arc::as_ptr(&self.node))
    }
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Configuration {}

impl Hash for Configuration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}
