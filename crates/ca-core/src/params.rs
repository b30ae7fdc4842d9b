//! Transform parameter store.
//!
//! A `ParamTable` is an immutable, cheaply clonable snapshot. Every
//! `set_field` returns a brand-new table; entries that were not touched are
//! shared with the previous table (`Arc::ptr_eq` holds), so consumers can
//! detect changes by identity instead of deep comparison.

use crate::id::GroupId;
use crate::model::{GroupAnimationParams, StateKind, TransformField};
use indexmap::IndexMap;
use std::sync::Arc;

type Entries = IndexMap<GroupId, Arc<GroupAnimationParams>>;

#[derive(Debug, Clone, Default)]
pub struct ParamTable {
    entries: Arc<Entries>,
}

impl ParamTable {
    /// Fresh table with identity params for every identifier, in order.
    #[must_use]
    pub fn initialize(ids: impl IntoIterator<Item = GroupId>) -> Self {
        let identity = Arc::new(GroupAnimationParams::IDENTITY);
        let entries: Entries = ids
            .into_iter()
            .map(|id| (id, Arc::clone(&identity)))
            .collect();
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Table with explicit starting values (e.g. hand-tuned presets).
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (GroupId, GroupAnimationParams)>) -> Self {
        let entries: Entries = entries
            .into_iter()
            .map(|(id, params)| (id, Arc::new(params)))
            .collect();
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Return a new table with one cell changed.
    ///
    /// An unknown `id` is a caller bug: it is logged and the returned table
    /// is the same snapshot (`ptr_eq` with `self`).
    #[must_use]
    pub fn set_field(
        &self,
        id: GroupId,
        state: StateKind,
        field: TransformField,
        value: f64,
    ) -> Self {
        let Some(current) = self.entries.get(&id) else {
            log::warn!("set_field on unknown group #{id} ({state}.{field} = {value}) ignored");
            return self.clone();
        };
        let updated = Arc::new(current.with_field(state, field, value));

        let mut entries: Entries = (*self.entries).clone();
        entries.insert(id, updated);
        Self {
            entries: Arc::new(entries),
        }
    }

    pub fn get(&self, id: GroupId) -> Option<&GroupAnimationParams> {
        self.entries.get(&id).map(Arc::as_ref)
    }

    /// Shared handle to one entry, for identity comparisons.
    pub fn entry(&self, id: GroupId) -> Option<&Arc<GroupAnimationParams>> {
        self.entries.get(&id)
    }

    pub fn ids(&self) -> impl ExactSizeIterator<Item = GroupId> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (GroupId, &GroupAnimationParams)> + '_ {
        self.entries.iter().map(|(id, p)| (*id, p.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether both handles refer to the very same snapshot.
    pub fn ptr_eq(&self, other: &ParamTable) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    /// Whether `id` refers to the same shared entry in both tables.
    pub fn entry_ptr_eq(&self, other: &ParamTable, id: GroupId) -> bool {
        match (self.entry(id), other.entry(id)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
