//! Node wrapper and per-node view-state flags.

use std::fmt;
use std::sync::Arc;

use slotmap::new_key_type;

use crate::entity::TreeEntity;

new_key_type! {
    /// Arena key addressing one node wrapper inside a [`Forest`].
    ///
    /// Keys are only meaningful against the forest that produced them.
    /// Every rebuild allocates fresh wrappers, so a `NodeKey` obtained
    /// before a structural mutation must be treated as invalidated
    /// afterward; record ids are the stable identity across rebuilds.
    ///
    /// [`Forest`]: crate::Forest
    pub struct NodeKey;
}

/// Independent view-state flags carried by each node wrapper.
///
/// The flag set is closed, so this is a fixed-shape struct rather than a
/// dynamic bag. `selectable` defaults to `true`; everything else to
/// `false`. Flags live on the wrapper, not the record: a forest rebuild
/// resets them all to these defaults unless a captured
/// [`ViewState`](crate::ViewState) is re-applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeFlags {
    /// Node's checkbox is ticked.
    pub checked: bool,
    /// Node is part of the current selection.
    pub selected: bool,
    /// Node's children are shown.
    pub expanded: bool,
    /// Node can be selected.
    pub selectable: bool,
    /// Node is disabled (no interaction).
    pub disabled: bool,
    /// Node's checkbox is disabled.
    pub disable_checkbox: bool,
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeFlags {
    /// Creates flags with all defaults (selectable only).
    pub fn new() -> Self {
        Self {
            checked: false,
            selected: false,
            expanded: false,
            selectable: true,
            disabled: false,
            disable_checkbox: false,
        }
    }

    /// Sets the checked flag.
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Sets the selected flag.
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Sets the expanded flag.
    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    /// Sets the selectable flag.
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Sets the disabled flag.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Sets the disable-checkbox flag.
    pub fn with_disable_checkbox(mut self, disable_checkbox: bool) -> Self {
        self.disable_checkbox = disable_checkbox;
        self
    }
}

/// One node in the forest, wrapping a single record.
///
/// Wrappers are adapter-owned and freshly allocated on every rebuild.
/// Flags may be toggled in place through [`flags`](TreeNode::flags);
/// structural fields (children, parent link, leaf state) are private so
/// that structure can only change through the adapter's mutation
/// methods, which keep the flat list and the forest consistent.
pub struct TreeNode<T> {
    key: String,
    title: String,
    entity: Arc<T>,
    children: Vec<NodeKey>,
    parent: Option<NodeKey>,
    is_leaf: bool,
    /// Mutable view-state flags for this node.
    pub flags: NodeFlags,
}

impl<T: TreeEntity> TreeNode<T> {
    pub(crate) fn new(entity: Arc<T>, title: String) -> Self {
        Self {
            key: entity.id().to_string(),
            title,
            entity,
            children: Vec::new(),
            parent: None,
            is_leaf: true,
            flags: NodeFlags::new(),
        }
    }
}

impl<T> TreeNode<T> {
    /// Returns the node's stable key (the wrapped record's id).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the resolved display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the wrapped record.
    ///
    /// The record is shared with the adapter's flat list, not copied.
    /// Do not mutate identity fields through interior mutability; the
    /// forest's links were derived from them at the last rebuild.
    pub fn entity(&self) -> &T {
        &self.entity
    }

    /// Returns a shared handle to the wrapped record.
    pub fn entity_arc(&self) -> &Arc<T> {
        &self.entity
    }

    /// Returns the keys of this node's children, in flat-list order.
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Returns the parent node's key, or `None` for a root.
    ///
    /// This is a back-reference into the arena, not an owning link.
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Returns whether the node had no children at the last rebuild.
    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    /// Returns whether the node has children.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub(crate) fn push_child(&mut self, child: NodeKey) {
        self.children.push(child);
        self.is_leaf = false;
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeKey>) {
        self.parent = parent;
    }
}

impl<T> fmt::Debug for TreeNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("children", &self.children.len())
            .field("is_leaf", &self.is_leaf)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_defaults() {
        let flags = NodeFlags::new();
        assert!(flags.selectable);
        assert!(!flags.checked);
        assert!(!flags.selected);
        assert!(!flags.expanded);
        assert!(!flags.disabled);
        assert!(!flags.disable_checkbox);
        assert_eq!(flags, NodeFlags::default());
    }

    #[test]
    fn test_flag_builders() {
        let flags = NodeFlags::new()
            .with_checked(true)
            .with_expanded(true)
            .with_selectable(false);
        assert!(flags.checked);
        assert!(flags.expanded);
        assert!(!flags.selectable);
        assert!(!flags.selected);
    }
}
