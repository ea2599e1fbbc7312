//! Capturable snapshot of per-node view state.

/// Snapshot of the flag key sets: which record keys are expanded,
/// checked, and selected.
///
/// A forest rebuild resets every node's flags to their defaults.
/// Callers that want flags to survive a structural mutation capture a
/// snapshot first and re-apply it afterward:
///
/// ```
/// # use horizon_arbor::{TreeAdapter, TreeEntity};
/// # #[derive(Clone)]
/// # struct Rec(String, Option<String>);
/// # impl TreeEntity for Rec {
/// #     fn id(&self) -> &str { &self.0 }
/// #     fn parent_id(&self) -> Option<&str> { self.1.as_deref() }
/// #     fn with_parent(&self, p: Option<&str>) -> Self {
/// #         Rec(self.0.clone(), p.map(str::to_owned))
/// #     }
/// # }
/// # let mut adapter = TreeAdapter::new(vec![Rec("1".into(), None)]);
/// let state = adapter.capture_view_state();
/// adapter.add(Rec("2".into(), Some("1".into())));
/// adapter.restore_view_state(&state);
/// ```
///
/// Keys are record ids, so a snapshot stays meaningful across rebuilds;
/// keys that no longer resolve are ignored on restore. With the `serde`
/// feature the snapshot is serializable, e.g. to persist expansion
/// state across sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewState {
    /// Keys of expanded nodes, in pre-order at capture time.
    pub expanded: Vec<String>,
    /// Keys of checked nodes, in pre-order at capture time.
    pub checked: Vec<String>,
    /// Keys of selected nodes, in pre-order at capture time.
    pub selected: Vec<String>,
}

impl ViewState {
    /// Returns `true` if no flag is set in any key set.
    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty() && self.checked.is_empty() && self.selected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert!(ViewState::default().is_empty());

        let state = ViewState {
            expanded: vec!["1".into()],
            ..Default::default()
        };
        assert!(!state.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let state = ViewState {
            expanded: vec!["1".into(), "2".into()],
            checked: vec!["2".into()],
            selected: Vec::new(),
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: ViewState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
