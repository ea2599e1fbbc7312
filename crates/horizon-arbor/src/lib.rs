//! Flat-list to forest adapter for hierarchical views.
//!
//! Horizon Arbor converts a flat, parent-referencing collection of
//! records into a navigable forest, keeps the two representations
//! consistent under structural mutation, and tracks per-node view state
//! (expanded, checked, selected) keyed by stable record identity. It is
//! the data layer behind tree views fed from server-side collections
//! where every record carries an `id` and an optional `parent_id`.
//!
//! # Core Types
//!
//! - [`TreeEntity`]: the contract caller records implement (identity,
//!   parent reference, optional name fields)
//! - [`TreeAdapter`]: stateful façade owning the authoritative flat
//!   list and the derived forest
//! - [`Forest`] / [`TreeNode`]: the arena-backed projection handed to
//!   views for traversal
//! - [`NodeFlags`] / [`ViewState`]: per-node view state and its
//!   capturable snapshot
//! - [`Signal`] / [`AdapterSignals`]: synchronous change notification
//!   around rebuilds
//!
//! # Consistency Model
//!
//! The flat list is the single source of truth; the forest is a derived
//! projection rebuilt after every structural mutation. Rebuild-on-write
//! trades O(n) per mutation for the absence of partial-update bugs:
//! there is exactly one code path that turns records into structure.
//! Two consequences matter to callers:
//!
//! - Node wrappers (and their [`NodeKey`]s) are fresh after every
//!   structural mutation; only record ids are stable.
//! - View-state flags reset on rebuild. Capture a [`ViewState`] first
//!   and re-apply it to carry flags across.
//!
//! Records whose parent id does not resolve are *orphans*: retained in
//! the flat list, invisible in the forest, and automatically reattached
//! once their parent appears. No operation panics or returns an error;
//! keyed mutations report an [`Outcome`] instead.
//!
//! # Example
//!
//! ```
//! use horizon_arbor::{TreeAdapter, TreeEntity};
//!
//! #[derive(Clone)]
//! struct Folder {
//!     id: String,
//!     parent: Option<String>,
//!     name: String,
//! }
//!
//! impl TreeEntity for Folder {
//!     fn id(&self) -> &str {
//!         &self.id
//!     }
//!
//!     fn parent_id(&self) -> Option<&str> {
//!         self.parent.as_deref()
//!     }
//!
//!     fn name(&self) -> Option<&str> {
//!         Some(&self.name)
//!     }
//!
//!     fn with_parent(&self, parent: Option<&str>) -> Self {
//!         Self {
//!             parent: parent.map(str::to_owned),
//!             ..self.clone()
//!         }
//!     }
//! }
//!
//! let mut adapter = TreeAdapter::new(vec![
//!     Folder { id: "docs".into(), parent: None, name: "Documents".into() },
//!     Folder { id: "tax".into(), parent: Some("docs".into()), name: "Taxes".into() },
//! ]);
//!
//! // Walk the derived forest.
//! let root = adapter.find("docs").unwrap();
//! assert!(adapter.forest().node(root).unwrap().has_children());
//!
//! // Reparent, then flatten back for persistence.
//! adapter.move_node("tax", None);
//! let flat = adapter.forest().flatten();
//! assert_eq!(flat.len(), 2);
//! assert!(flat.iter().all(|f| f.parent.is_none()));
//! ```

mod adapter;
mod entity;
mod forest;
mod node;
mod signal;
mod view_state;

pub use adapter::{AdapterSignals, Outcome, TreeAdapter};
pub use entity::{TitleResolver, TreeEntity, default_title};
pub use forest::{Forest, PreOrder};
pub use node::{NodeFlags, NodeKey, TreeNode};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use view_state::ViewState;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Adapter mutations and rebuilds.
    pub const ADAPTER: &str = "horizon_arbor::adapter";
}
