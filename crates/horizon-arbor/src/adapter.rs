//! Stateful adapter: authoritative flat list plus derived forest.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::entity::{TreeEntity, TitleResolver, default_title};
use crate::forest::Forest;
use crate::node::{NodeFlags, NodeKey};
use crate::signal::Signal;
use crate::targets;
use crate::view_state::ViewState;

/// Result of a keyed mutation.
///
/// No adapter operation raises; a mutation against a key that matches
/// no record degrades to a no-op and reports it here, so callers can
/// assert on outcomes instead of diffing before/after state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The mutation was applied and the forest rebuilt.
    Applied,
    /// No record matched the key; nothing changed.
    NotFound,
}

impl Outcome {
    /// Returns `true` for [`Outcome::Applied`].
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Signals emitted around forest rebuilds.
///
/// Every structural mutation rebuilds the forest and fires the pair;
/// flag-only operations (key-set overwrites, snapshot restore) do not.
/// Consumers holding [`NodeKey`]s must treat them as invalidated once
/// `rebuilt` fires.
pub struct AdapterSignals {
    /// Emitted just before the forest is replaced.
    pub about_to_rebuild: Signal<()>,
    /// Emitted after the forest has been replaced.
    pub rebuilt: Signal<()>,
}

impl Default for AdapterSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterSignals {
    /// Creates a new set of adapter signals.
    pub fn new() -> Self {
        Self {
            about_to_rebuild: Signal::new(),
            rebuilt: Signal::new(),
        }
    }

    /// Emits the rebuild pair around the provided function.
    pub fn emit_rebuild<F>(&self, rebuild_fn: F)
    where
        F: FnOnce(),
    {
        self.about_to_rebuild.emit(());
        rebuild_fn();
        self.rebuilt.emit(());
    }
}

static_assertions::assert_impl_all!(AdapterSignals: Send, Sync);

/// Adapter between a flat, parent-referencing record list and the
/// forest a tree view walks.
///
/// The flat list is the single source of truth; the forest is a
/// derived, disposable projection. Every structural mutation funnels
/// through "mutate flat list, rebuild forest" — O(n) per mutation, no
/// partial-update bugs. The rebuild allocates fresh node wrappers, so
/// all view-state flags reset to defaults; capture a [`ViewState`]
/// first to carry them across.
///
/// Exclusive ownership is part of the contract: mutation takes
/// `&mut self`, and the structural fields of returned nodes are
/// private, so the list and forest cannot drift apart behind the
/// adapter's back. Flag toggling through [`forest_mut`]
/// (or the key-set setters) is fine and does not rebuild.
///
/// [`forest_mut`]: TreeAdapter::forest_mut
///
/// # Example
///
/// ```
/// use horizon_arbor::{TreeAdapter, TreeEntity};
///
/// #[derive(Clone)]
/// struct Section {
///     id: String,
///     parent: Option<String>,
///     name: String,
/// }
///
/// impl TreeEntity for Section {
///     fn id(&self) -> &str {
///         &self.id
///     }
///
///     fn parent_id(&self) -> Option<&str> {
///         self.parent.as_deref()
///     }
///
///     fn name(&self) -> Option<&str> {
///         Some(&self.name)
///     }
///
///     fn with_parent(&self, parent: Option<&str>) -> Self {
///         Self {
///             parent: parent.map(str::to_owned),
///             ..self.clone()
///         }
///     }
/// }
///
/// let mut adapter = TreeAdapter::new(vec![
///     Section { id: "1".into(), parent: None, name: "Engineering".into() },
///     Section { id: "2".into(), parent: Some("1".into()), name: "Platform".into() },
/// ]);
///
/// assert_eq!(adapter.forest().roots().len(), 1);
/// let root = adapter.find("1").unwrap();
/// assert!(!adapter.forest().node(root).unwrap().is_leaf());
/// ```
pub struct TreeAdapter<T> {
    records: Vec<Arc<T>>,
    forest: Forest<T>,
    resolver: TitleResolver<T>,
    signals: AdapterSignals,
}

impl<T: TreeEntity + 'static> TreeAdapter<T> {
    /// Creates an adapter over the given records with the default title
    /// resolver, building the initial forest immediately.
    pub fn new(records: Vec<T>) -> Self {
        Self::with_resolver(records, |record: &T| default_title(record))
    }

    /// Creates an adapter with a caller-supplied title resolver.
    ///
    /// The resolver is used for this and every subsequent rebuild of
    /// this instance.
    pub fn with_resolver<F>(records: Vec<T>, resolver: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        let records: Vec<Arc<T>> = records.into_iter().map(Arc::new).collect();
        let resolver: TitleResolver<T> = Arc::new(resolver);
        let forest = Forest::from_records(&records, &resolver);
        Self {
            records,
            forest,
            resolver,
            signals: AdapterSignals::new(),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the authoritative flat list.
    ///
    /// Orphaned records are included here even while invisible in the
    /// forest.
    pub fn records(&self) -> &[Arc<T>] {
        &self.records
    }

    /// Returns the number of records in the flat list.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the flat list is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the derived forest.
    pub fn forest(&self) -> &Forest<T> {
        &self.forest
    }

    /// Returns mutable access to the forest, for in-place flag
    /// toggling on nodes.
    ///
    /// Structure cannot be edited through this handle; structural
    /// mutation goes through the adapter's methods.
    pub fn forest_mut(&mut self) -> &mut Forest<T> {
        &mut self.forest
    }

    /// Returns the rebuild signals.
    pub fn signals(&self) -> &AdapterSignals {
        &self.signals
    }

    /// Depth-first search for the attached node with the given record
    /// key.
    pub fn find(&self, key: &str) -> Option<NodeKey> {
        self.forest.find(key)
    }

    // =========================================================================
    // Flag key sets
    // =========================================================================

    /// Returns the keys of expanded nodes, in pre-order.
    pub fn expanded_keys(&self) -> Vec<String> {
        self.keys_where(|flags| flags.expanded)
    }

    /// Returns the keys of checked nodes, in pre-order.
    pub fn checked_keys(&self) -> Vec<String> {
        self.keys_where(|flags| flags.checked)
    }

    /// Returns the keys of selected nodes, in pre-order.
    pub fn selected_keys(&self) -> Vec<String> {
        self.keys_where(|flags| flags.selected)
    }

    /// Overwrites every node's expanded flag with membership in `keys`.
    ///
    /// This is a total overwrite, not a merge: nodes absent from `keys`
    /// are explicitly collapsed.
    pub fn set_expanded_keys<I>(&mut self, keys: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.overwrite_flags(keys, |flags, member| flags.expanded = member);
    }

    /// Overwrites every node's checked flag with membership in `keys`.
    pub fn set_checked_keys<I>(&mut self, keys: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.overwrite_flags(keys, |flags, member| flags.checked = member);
    }

    /// Overwrites every node's selected flag with membership in `keys`.
    pub fn set_selected_keys<I>(&mut self, keys: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.overwrite_flags(keys, |flags, member| flags.selected = member);
    }

    /// Captures the current flag key sets.
    pub fn capture_view_state(&self) -> ViewState {
        ViewState {
            expanded: self.expanded_keys(),
            checked: self.checked_keys(),
            selected: self.selected_keys(),
        }
    }

    /// Re-applies a captured snapshot, overwriting all three flag sets.
    ///
    /// Keys that no longer resolve to an attached node are ignored.
    pub fn restore_view_state(&mut self, state: &ViewState) {
        self.set_expanded_keys(&state.expanded);
        self.set_checked_keys(&state.checked);
        self.set_selected_keys(&state.selected);
    }

    fn keys_where(&self, flagged: impl Fn(&NodeFlags) -> bool) -> Vec<String> {
        self.forest
            .iter()
            .filter(|(_, node)| flagged(&node.flags))
            .map(|(_, node)| node.key().to_string())
            .collect()
    }

    fn overwrite_flags<I>(&mut self, keys: I, apply: impl Fn(&mut NodeFlags, bool))
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let members: HashSet<String> = keys
            .into_iter()
            .map(|key| key.as_ref().to_string())
            .collect();
        let node_keys: Vec<NodeKey> = self.forest.iter().map(|(key, _)| key).collect();
        for node_key in node_keys {
            if let Some(node) = self.forest.node_mut(node_key) {
                let member = members.contains(node.key());
                apply(&mut node.flags, member);
            }
        }
    }

    // =========================================================================
    // Structural mutation
    // =========================================================================

    /// Appends a record to the flat list and rebuilds.
    ///
    /// If the new record resolves a previously orphaned parent chain,
    /// the orphans reappear in the forest on this rebuild.
    pub fn add(&mut self, record: T) {
        tracing::debug!(target: targets::ADAPTER, key = record.id(), "adding record");
        self.records.push(Arc::new(record));
        self.rebuild();
    }

    /// Replaces the record with a matching id in place and rebuilds.
    ///
    /// Update is not upsert: with no matching record this is a no-op
    /// and returns [`Outcome::NotFound`] without rebuilding.
    pub fn update(&mut self, record: T) -> Outcome {
        let Some(pos) = self.position_of(record.id()) else {
            tracing::debug!(target: targets::ADAPTER, key = record.id(), "update ignored, no matching record");
            return Outcome::NotFound;
        };
        tracing::debug!(target: targets::ADAPTER, key = record.id(), "updating record");
        self.records[pos] = Arc::new(record);
        self.rebuild();
        Outcome::Applied
    }

    /// Reparents exactly one record: sets its parent reference to
    /// `new_parent` (`None` moves it to the root) and rebuilds.
    ///
    /// The new parent is not validated; pointing at an unknown id
    /// simply makes the record an orphan until that parent appears.
    /// Siblings and every other record are untouched.
    pub fn move_node(&mut self, key: &str, new_parent: Option<&str>) -> Outcome {
        let Some(pos) = self.position_of(key) else {
            tracing::debug!(target: targets::ADAPTER, key, "move ignored, no matching record");
            return Outcome::NotFound;
        };
        tracing::debug!(target: targets::ADAPTER, key, new_parent, "moving record");
        self.records[pos] = Arc::new(self.records[pos].with_parent(new_parent));
        self.rebuild();
        Outcome::Applied
    }

    /// Removes the record with the given key and its *direct* children
    /// from the flat list, then rebuilds. Returns the number of records
    /// removed.
    ///
    /// The cascade is single-level by contract: grandchildren and
    /// deeper descendants stay in the flat list as orphans, invisible
    /// in the forest until reattached or removed themselves. With no
    /// match at all this is a no-op returning 0, without rebuilding.
    pub fn remove(&mut self, key: &str) -> usize {
        let before = self.records.len();
        self.records
            .retain(|record| record.id() != key && record.parent_id() != Some(key));
        let removed = before - self.records.len();
        if removed > 0 {
            tracing::debug!(target: targets::ADAPTER, key, removed, "removed record and direct children");
            self.rebuild();
        }
        removed
    }

    /// Replaces the direct children of `key`: removes every record
    /// whose parent reference equals `key`, appends the supplied
    /// records with their parent forced to `key`, and rebuilds.
    /// Returns the number of former children removed.
    ///
    /// An empty replacement list turns the target into a leaf. The
    /// target itself is not required to exist; replacements under an
    /// unknown key are appended as orphans.
    pub fn replace_children(&mut self, key: &str, children: Vec<T>) -> usize {
        let before = self.records.len();
        self.records.retain(|record| record.parent_id() != Some(key));
        let replaced = before - self.records.len();
        self.records.extend(
            children
                .into_iter()
                .map(|child| Arc::new(child.with_parent(Some(key)))),
        );
        tracing::debug!(target: targets::ADAPTER, key, replaced, "replaced direct children");
        self.rebuild();
        replaced
    }

    /// Discards the flat list and forest entirely and rebuilds from the
    /// replacement list.
    pub fn reset(&mut self, records: Vec<T>) {
        tracing::debug!(target: targets::ADAPTER, records = records.len(), "resetting from replacement list");
        self.records = records.into_iter().map(Arc::new).collect();
        self.rebuild();
    }

    fn position_of(&self, key: &str) -> Option<usize> {
        self.records.iter().position(|record| record.id() == key)
    }

    fn rebuild(&mut self) {
        tracing::trace!(target: targets::ADAPTER, records = self.records.len(), "rebuilding forest");
        let forest = Forest::from_records(&self.records, &self.resolver);
        self.signals.emit_rebuild(|| {
            self.forest = forest;
        });
    }
}

impl<T> fmt::Debug for TreeAdapter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeAdapter")
            .field("records", &self.records.len())
            .field("forest", &self.forest)
            .finish_non_exhaustive()
    }
}
