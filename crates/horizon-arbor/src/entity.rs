//! Record contract and title resolution.
//!
//! The adapter treats caller records as opaque apart from the identity
//! fields exposed through [`TreeEntity`]. Records live in the flat list;
//! the forest only ever holds shared handles to them.

use std::sync::Arc;

/// Contract between caller-owned records and the adapter.
///
/// A record exposes a stable identity, an optional parent reference, and
/// the optional name fields consulted by the default title resolver.
///
/// Identity rules:
///
/// - `id` must be unique within one adapter instance. Uniqueness is a
///   caller invariant; duplicate ids are not detected, and the last
///   record in list order wins the identity lookup.
/// - `parent_id` is either another record's id or absent. An empty
///   string counts as absent. A parent id that resolves to no known
///   record makes the record an *orphan*: still in the flat list,
///   invisible in the forest until the parent appears.
///
/// # Example
///
/// ```
/// use horizon_arbor::TreeEntity;
///
/// #[derive(Clone)]
/// struct Contact {
///     id: String,
///     parent: Option<String>,
///     name: String,
/// }
///
/// impl TreeEntity for Contact {
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
/// ```
pub trait TreeEntity: Send + Sync {
    /// Returns the record's unique identity.
    fn id(&self) -> &str;

    /// Returns the containing record's id, or `None` for a root.
    fn parent_id(&self) -> Option<&str>;

    /// Returns the generic name field, if the record carries one.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Returns the explicit display name, if the record carries one.
    ///
    /// Takes precedence over [`name`](TreeEntity::name) in the default
    /// title resolver.
    fn display_name(&self) -> Option<&str> {
        None
    }

    /// Returns a copy of this record with the parent reference replaced.
    ///
    /// Used by the flattener to restore traversal-derived parent ids and
    /// by the adapter when reparenting. Every other field must round-trip
    /// unchanged.
    fn with_parent(&self, parent: Option<&str>) -> Self
    where
        Self: Sized;
}

/// Type alias for a title resolver function.
///
/// The resolver maps a record to its display title. One resolver is
/// installed per adapter instance and used for every rebuild; swapping
/// resolvers between rebuilds of the same data produces title drift,
/// not an error.
pub type TitleResolver<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Default title resolution.
///
/// Prefers a non-empty `display_name`, falls back to a non-empty `name`,
/// else returns the empty string.
pub fn default_title<T: TreeEntity>(entity: &T) -> String {
    entity
        .display_name()
        .filter(|s| !s.is_empty())
        .or_else(|| entity.name().filter(|s| !s.is_empty()))
        .unwrap_or_default()
        .to_string()
}

/// Normalizes the parent reference: an empty string counts as no parent.
pub(crate) fn effective_parent<T: TreeEntity>(entity: &T) -> Option<&str> {
    entity.parent_id().filter(|p| !p.is_empty())
}
