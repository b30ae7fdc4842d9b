//! Group registry: merges the collapsed and expanded extractions.
//!
//! Identifier order is first appearance, scanning collapsed fragments then
//! expanded fragments. Within one state a repeated identifier keeps the
//! *last* fragment's markup.

use crate::id::GroupId;
use crate::model::{Extraction, Markup, StateKind, SvgEnvelope};
use indexmap::IndexSet;
use std::collections::HashMap;

/// Merged, deduplicated view of both states' groups.
///
/// Built fresh from two extractions; never patched incrementally.
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    ids: IndexSet<GroupId>,
    collapsed: HashMap<GroupId, Markup>,
    expanded: HashMap<GroupId, Markup>,
    collapsed_envelope: SvgEnvelope,
    expanded_envelope: SvgEnvelope,
}

impl GroupRegistry {
    /// Build the registry from both states' extraction results.
    #[must_use]
    pub fn build(collapsed: &Extraction, expanded: &Extraction) -> Self {
        let mut ids = IndexSet::new();
        for fragment in collapsed.groups.iter().chain(&expanded.groups) {
            ids.insert(fragment.id);
        }

        let registry = Self {
            ids,
            collapsed: markup_map(collapsed, StateKind::Collapsed),
            expanded: markup_map(expanded, StateKind::Expanded),
            collapsed_envelope: collapsed.envelope.clone(),
            expanded_envelope: expanded.envelope.clone(),
        };
        log::debug!("group registry built with {} identifiers", registry.len());
        registry
    }

    /// Identifiers in registry order.
    pub fn ids(&self) -> impl ExactSizeIterator<Item = GroupId> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: GroupId) -> bool {
        self.ids.contains(&id)
    }

    /// Inner markup of `id` in the given state, if that state had the group.
    pub fn markup(&self, id: GroupId, state: StateKind) -> Option<&Markup> {
        match state {
            StateKind::Collapsed => self.collapsed.get(&id),
            StateKind::Expanded => self.expanded.get(&id),
        }
    }

    pub fn envelope(&self, state: StateKind) -> &SvgEnvelope {
        match state {
            StateKind::Collapsed => &self.collapsed_envelope,
            StateKind::Expanded => &self.expanded_envelope,
        }
    }
}

fn markup_map(extraction: &Extraction, state: StateKind) -> HashMap<GroupId, Markup> {
    let mut map = HashMap::with_capacity(extraction.groups.len());
    for fragment in &extraction.groups {
        if map.insert(fragment.id, fragment.inner.clone()).is_some() {
            log::trace!(
                "duplicate group #{} in {state} state, keeping the later fragment",
                fragment.id
            );
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_groups;
    use pretty_assertions::assert_eq;

    fn names(reg: &GroupRegistry) -> Vec<String> {
        reg.ids().map(|id| id.as_str().to_string()).collect()
    }

    #[test]
    fn union_in_first_appearance_order() {
        let c = extract_groups(r#"<svg><g id="a"><rect/></g><g id="b"><rect/></g></svg>"#);
        let e = extract_groups(r#"<svg><g id="b"><circle/></g><g id="c"><circle/></g></svg>"#);
        let reg = GroupRegistry::build(&c, &e);
        assert_eq!(names(&reg), vec!["a", "b", "c"]);
    }

    #[test]
    fn missing_state_markup_is_absent() {
        let c = extract_groups(r#"<svg><g id="a"><rect/></g></svg>"#);
        let e = extract_groups(r#"<svg><g id="b"><circle/></g></svg>"#);
        let reg = GroupRegistry::build(&c, &e);
        let a = GroupId::intern("a");
        assert_eq!(reg.markup(a, StateKind::Collapsed).map(Markup::as_str), Some("<rect/>"));
        assert!(reg.markup(a, StateKind::Expanded).is_none());
    }

    #[test]
    fn duplicate_identifier_keeps_last_markup() {
        let c = extract_groups(r#"<svg><g id="d"><rect/></g><g id="d"><circle/></g></svg>"#);
        let reg = GroupRegistry::build(&c, &Extraction::default());
        assert_eq!(names(&reg), vec!["d"]);
        assert_eq!(
            reg.markup(GroupId::intern("d"), StateKind::Collapsed)
                .map(Markup::as_str),
            Some("<circle/>")
        );
    }

    #[test]
    fn empty_inputs_give_empty_registry() {
        let reg = GroupRegistry::build(&Extraction::default(), &Extraction::default());
        assert!(reg.is_empty());
        assert_eq!(reg.envelope(StateKind::Collapsed), &SvgEnvelope::default());
    }
}
