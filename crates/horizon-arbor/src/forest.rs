//! Arena-backed forest: construction from a flat list, flattening back,
//! traversal and lookup.
//!
//! The forest is always a derived, disposable projection of the flat
//! list. Nodes live in a slot arena and reference each other by
//! [`NodeKey`], so the parent back-reference is a plain key rather than
//! a cyclic object graph.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use slotmap::SlotMap;

use crate::entity::{TreeEntity, TitleResolver, effective_parent};
use crate::node::{NodeKey, TreeNode};

/// Ordered sequence of root nodes over a slot arena of wrappers.
///
/// Construction is a two-pass, map-indexed walk over the flat list —
/// O(n) time and space, stable order, deterministic for deterministic
/// input order. Records whose parent id resolves to no known record are
/// *orphans*: their wrappers exist in the arena but are reachable from
/// no root, so traversal, lookup, and flattening all skip them. Cyclic
/// parent chains end up unreachable the same way; nothing panics and
/// nothing loops.
pub struct Forest<T> {
    nodes: SlotMap<NodeKey, TreeNode<T>>,
    roots: Vec<NodeKey>,
}

impl<T> Default for Forest<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Forest<T> {
    /// Creates an empty forest.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            roots: Vec::new(),
        }
    }

    /// Returns the root node keys in flat-list order.
    pub fn roots(&self) -> &[NodeKey] {
        &self.roots
    }

    /// Returns `true` if the forest has no roots.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Returns the node for a key, if it is still alive in this forest.
    pub fn node(&self, key: NodeKey) -> Option<&TreeNode<T>> {
        self.nodes.get(key)
    }

    /// Returns mutable access to a node, for in-place flag toggling.
    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut TreeNode<T>> {
        self.nodes.get_mut(key)
    }

    /// Returns the child keys of a node, in flat-list order.
    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.nodes.get(key).map(|n| n.children()).unwrap_or(&[])
    }

    /// Returns the parent key of a node, or `None` for roots and dead keys.
    pub fn parent_of(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|n| n.parent())
    }

    /// Depth-first pre-order traversal of the attached forest.
    ///
    /// Yields `(key, node)` pairs; roots and children in flat-list
    /// order, each node before its children. Orphaned wrappers are not
    /// visited.
    pub fn iter(&self) -> PreOrder<'_, T> {
        let mut stack: Vec<NodeKey> = self.roots.clone();
        stack.reverse();
        PreOrder {
            forest: self,
            stack,
        }
    }

    /// Depth-first search for the node with the given record key.
    ///
    /// Only attached nodes are found; an orphan's wrapper is invisible
    /// here even though its record is still in the flat list.
    pub fn find(&self, key: &str) -> Option<NodeKey> {
        self.iter().find(|(_, node)| node.key() == key).map(|(k, _)| k)
    }
}

impl<T: TreeEntity> Forest<T> {
    /// Builds a forest from a flat, parent-referencing record list.
    ///
    /// Pass one allocates a wrapper per record (titles resolved eagerly)
    /// and indexes them by record id; a duplicate id silently displaces
    /// the earlier entry — last write wins. Pass two links wrappers:
    /// a record with no parent id (or an empty one) becomes a root; a
    /// record whose parent resolves is appended to that parent's
    /// children; anything else is left unattached.
    pub fn from_records(records: &[Arc<T>], resolver: &TitleResolver<T>) -> Self {
        let mut nodes: SlotMap<NodeKey, TreeNode<T>> = SlotMap::with_key();
        let mut index: HashMap<&str, NodeKey> = HashMap::with_capacity(records.len());

        for record in records {
            let title = resolver(record);
            let key = nodes.insert(TreeNode::new(Arc::clone(record), title));
            if let Some(displaced) = index.insert(record.id(), key) {
                nodes.remove(displaced);
            }
        }

        let mut roots = Vec::new();
        for record in records {
            let Some(&key) = index.get(record.id()) else {
                continue;
            };
            match effective_parent(record.as_ref()) {
                None => roots.push(key),
                Some(parent_id) => {
                    if let Some(&parent_key) = index.get(parent_id) {
                        nodes[parent_key].push_child(key);
                        nodes[key].set_parent(Some(parent_key));
                    }
                    // Unresolved parent: attached to nothing.
                }
            }
        }

        Self { nodes, roots }
    }
}

impl<T: TreeEntity + Clone> Forest<T> {
    /// Flattens the forest back into a flat record list.
    ///
    /// Pre-order traversal emitting a copy of each attached record with
    /// its parent id overwritten from the traversal (or cleared at a
    /// root). Feeding the result back through
    /// [`from_records`](Forest::from_records) reproduces an isomorphic
    /// forest: values and order round-trip, wrapper keys do not.
    pub fn flatten(&self) -> Vec<T> {
        let mut out = Vec::new();
        for &root in &self.roots {
            self.flatten_into(root, None, &mut out);
        }
        out
    }

    fn flatten_into(&self, key: NodeKey, parent: Option<&str>, out: &mut Vec<T>) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        out.push(node.entity().with_parent(parent));
        for &child in node.children() {
            self.flatten_into(child, Some(node.key()), out);
        }
    }
}

impl<T> fmt::Debug for Forest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forest")
            .field("roots", &self.roots.len())
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

/// Iterator over a forest in depth-first pre-order.
///
/// Returned by [`Forest::iter`].
pub struct PreOrder<'a, T> {
    forest: &'a Forest<T>,
    stack: Vec<NodeKey>,
}

impl<'a, T> Iterator for PreOrder<'a, T> {
    type Item = (NodeKey, &'a TreeNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let key = self.stack.pop()?;
            if let Some(node) = self.forest.nodes.get(key) {
                self.stack.extend(node.children().iter().rev());
                return Some((key, node));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::default_title;

    #[derive(Clone, Debug, PartialEq)]
    struct Rec {
        id: String,
        parent: Option<String>,
        name: String,
    }

    impl Rec {
        fn new(id: &str, parent: Option<&str>, name: &str) -> Arc<Self> {
            Arc::new(Self {
                id: id.into(),
                parent: parent.map(Into::into),
                name: name.into(),
            })
        }
    }

    impl TreeEntity for Rec {
        fn id(&self) -> &str {
            &self.id
        }

        fn parent_id(&self) -> Option<&str> {
            self.parent.as_deref()
        }

        fn name(&self) -> Option<&str> {
            Some(&self.name)
        }

        fn with_parent(&self, parent: Option<&str>) -> Self {
            Self {
                parent: parent.map(str::to_owned),
                ..self.clone()
            }
        }
    }

    fn resolver() -> TitleResolver<Rec> {
        Arc::new(|rec: &Rec| default_title(rec))
    }

    #[test]
    fn test_build_two_level() {
        let records = vec![
            Rec::new("1", None, "Root"),
            Rec::new("2", Some("1"), "Child"),
        ];
        let forest = Forest::from_records(&records, &resolver());

        assert_eq!(forest.roots().len(), 1);
        let root = forest.node(forest.roots()[0]).unwrap();
        assert_eq!(root.key(), "1");
        assert_eq!(root.title(), "Root");
        assert!(!root.is_leaf());
        assert_eq!(root.children().len(), 1);

        let child = forest.node(root.children()[0]).unwrap();
        assert_eq!(child.key(), "2");
        assert!(child.is_leaf());
        assert_eq!(child.parent(), Some(forest.roots()[0]));
    }

    #[test]
    fn test_sibling_order_preserved() {
        let records = vec![
            Rec::new("r", None, "Root"),
            Rec::new("b", Some("r"), "B"),
            Rec::new("a", Some("r"), "A"),
            Rec::new("c", Some("r"), "C"),
        ];
        let forest = Forest::from_records(&records, &resolver());
        let keys: Vec<&str> = forest
            .children(forest.roots()[0])
            .iter()
            .map(|&k| forest.node(k).unwrap().key())
            .collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn test_orphan_invisible() {
        let records = vec![
            Rec::new("1", None, "Root"),
            Rec::new("2", Some("missing"), "Orphan"),
        ];
        let forest = Forest::from_records(&records, &resolver());

        assert_eq!(forest.roots().len(), 1);
        assert!(forest.find("1").is_some());
        assert!(forest.find("2").is_none());
        assert_eq!(forest.iter().count(), 1);
    }

    #[test]
    fn test_empty_parent_id_is_root() {
        let records = vec![Rec::new("1", Some(""), "Root")];
        let forest = Forest::from_records(&records, &resolver());
        assert_eq!(forest.roots().len(), 1);
    }

    #[test]
    fn test_cycle_is_unreachable() {
        let records = vec![
            Rec::new("a", Some("b"), "A"),
            Rec::new("b", Some("a"), "B"),
        ];
        let forest = Forest::from_records(&records, &resolver());

        assert!(forest.is_empty());
        assert_eq!(forest.iter().count(), 0);
        assert!(forest.flatten().is_empty());
    }

    #[test]
    fn test_duplicate_id_last_wins() {
        let records = vec![
            Rec::new("1", None, "First"),
            Rec::new("1", None, "Second"),
        ];
        let forest = Forest::from_records(&records, &resolver());

        let key = forest.find("1").unwrap();
        assert_eq!(forest.node(key).unwrap().title(), "Second");
    }

    #[test]
    fn test_round_trip() {
        let records = vec![
            Rec::new("1", None, "Root"),
            Rec::new("2", Some("1"), "Child"),
            Rec::new("3", Some("2"), "Grandchild"),
            Rec::new("4", Some("1"), "Child 2"),
            Rec::new("5", None, "Root 2"),
        ];
        let forest = Forest::from_records(&records, &resolver());
        let flat = forest.flatten();

        let expected: Vec<Rec> = records.iter().map(|r| (**r).clone()).collect();
        assert_eq!(flat, expected);
    }

    #[test]
    fn test_flatten_restores_traversal_parent() {
        // Whatever the record claimed, the emitted parent id comes from
        // the traversal position.
        let records = vec![
            Rec::new("1", Some(""), "Root"),
            Rec::new("2", Some("1"), "Child"),
        ];
        let forest = Forest::from_records(&records, &resolver());
        let flat = forest.flatten();

        assert_eq!(flat[0].parent, None);
        assert_eq!(flat[1].parent.as_deref(), Some("1"));
    }

    #[test]
    fn test_pre_order_iteration() {
        let records = vec![
            Rec::new("1", None, "Root"),
            Rec::new("2", Some("1"), "Child"),
            Rec::new("3", Some("2"), "Grandchild"),
            Rec::new("4", Some("1"), "Child 2"),
            Rec::new("5", None, "Root 2"),
        ];
        let forest = Forest::from_records(&records, &resolver());
        let order: Vec<&str> = forest.iter().map(|(_, n)| n.key()).collect();
        assert_eq!(order, ["1", "2", "3", "4", "5"]);
    }
}
