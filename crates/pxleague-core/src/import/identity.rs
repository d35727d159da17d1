//! Per-kind identity maps built during one import run.
//!
//! Each dimension kind gets a legacy-ID→identity map and a
//! normalized-name→identity map. Rows whose names normalize equally collapse
//! onto the first identity, and their legacy IDs are remapped to it. The maps
//! are plain values handed from one pipeline stage to the next and dropped at
//! the end of the run.

use std::collections::HashMap;

use crate::dataset::EntityId;

/// Trimmed, lowercased name used for duplicate detection.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub id: EntityId,
    /// The row collapsed onto an existing identity.
    pub merged: bool,
    /// The row's legacy ID was already bound to a different identity.
    pub legacy_conflict: bool,
}

#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    by_legacy: HashMap<i64, EntityId>,
    by_name: HashMap<String, EntityId>,
    identities: Vec<EntityId>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named row. `create` runs only when no identity with the
    /// same normalized name exists yet.
    pub fn register_named<F>(&mut self, legacy_id: Option<i64>, name: &str, create: F) -> Registration
    where
        F: FnOnce() -> EntityId,
    {
        let key = normalize_name(name);
        let (id, merged) = match self.by_name.get(&key) {
            Some(&existing) => (existing, true),
            None => {
                let id = create();
                self.by_name.insert(key, id);
                self.identities.push(id);
                (id, false)
            }
        };
        let legacy_conflict = legacy_id.is_some_and(|legacy| !self.bind_legacy(legacy, id));
        Registration {
            id,
            merged,
            legacy_conflict,
        }
    }

    /// Register an unnamed entity (fixtures) under its legacy ID.
    pub fn register(&mut self, legacy_id: Option<i64>, id: EntityId) -> bool {
        self.identities.push(id);
        legacy_id.is_none_or(|legacy| self.bind_legacy(legacy, id))
    }

    /// Binds `legacy` to `id` unless it is already bound elsewhere.
    fn bind_legacy(&mut self, legacy: i64, id: EntityId) -> bool {
        match self.by_legacy.get(&legacy) {
            Some(&bound) => bound == id,
            None => {
                self.by_legacy.insert(legacy, id);
                true
            }
        }
    }

    pub fn resolve(&self, legacy_id: i64) -> Option<EntityId> {
        self.by_legacy.get(&legacy_id).copied()
    }

    pub fn resolve_name(&self, name: &str) -> Option<EntityId> {
        self.by_name.get(&normalize_name(name)).copied()
    }

    /// Deterministic stand-in for an unresolved reference: the known
    /// identities cycled by row index.
    pub fn cycle(&self, row_index: usize) -> Option<EntityId> {
        if self.identities.is_empty() {
            return None;
        }
        Some(self.identities[row_index % self.identities.len()])
    }

    /// Like [`cycle`](Self::cycle) but avoids `exclude` when another identity exists.
    pub fn cycle_excluding(&self, row_index: usize, exclude: EntityId) -> Option<EntityId> {
        let n = self.identities.len();
        (0..n)
            .map(|step| self.identities[(row_index + step) % n])
            .find(|&id| id != exclude)
            .or_else(|| self.cycle(row_index))
    }

    pub fn identities(&self) -> &[EntityId] {
        &self.identities
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn legacy_len(&self) -> usize {
        self.by_legacy.len()
    }
}

/// Identity maps produced by the dimension stage.
#[derive(Debug, Clone, Default)]
pub struct DimensionMaps {
    pub divisions: IdentityMap,
    pub venues: IdentityMap,
    pub teams: IdentityMap,
    pub players: IdentityMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> impl FnMut() -> EntityId {
        let mut next = 0;
        move || {
            next += 1;
            EntityId(next)
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Red Lion "), "red lion");
        assert_eq!(normalize_name("RED LION"), normalize_name("red lion"));
    }

    #[test]
    fn test_duplicates_collapse_and_remap() {
        let mut map = IdentityMap::new();
        let mut next = counter();

        let a = map.register_named(Some(10), "Red Lion", &mut next);
        let b = map.register_named(Some(11), " red lion ", &mut next);
        let c = map.register_named(Some(12), "Crown", &mut next);

        assert!(!a.merged);
        assert!(b.merged);
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert_eq!(map.len(), 2);
        assert_eq!(map.resolve(10), Some(a.id));
        assert_eq!(map.resolve(11), Some(a.id));
        assert_eq!(map.resolve(12), Some(c.id));
        assert_eq!(map.resolve_name("CROWN"), Some(c.id));
    }

    #[test]
    fn test_create_not_called_for_duplicate() {
        let mut map = IdentityMap::new();
        map.register_named(Some(1), "Reds", || EntityId(1));
        let r = map.register_named(Some(2), "REDS", || panic!("duplicate must not create"));
        assert_eq!(r.id, EntityId(1));
    }

    #[test]
    fn test_legacy_conflict_keeps_first_binding() {
        let mut map = IdentityMap::new();
        let mut next = counter();
        map.register_named(Some(5), "Reds", &mut next);
        let r = map.register_named(Some(5), "Blues", &mut next);
        assert!(r.legacy_conflict);
        assert_eq!(map.resolve(5), Some(EntityId(1)));
    }

    #[test]
    fn test_cycle_fallback() {
        let mut map = IdentityMap::new();
        assert_eq!(map.cycle(3), None);

        let mut next = counter();
        for name in ["A", "B", "C"] {
            map.register_named(None, name, &mut next);
        }
        assert_eq!(map.cycle(0), Some(EntityId(1)));
        assert_eq!(map.cycle(4), Some(EntityId(2)));
        assert_eq!(map.cycle_excluding(1, EntityId(2)), Some(EntityId(3)));
        assert_eq!(map.cycle_excluding(2, EntityId(3)), Some(EntityId(1)));
        assert_eq!(map.legacy_len(), 0);
    }

    #[test]
    fn test_cycle_excluding_single_identity() {
        let mut map = IdentityMap::new();
        map.register(Some(1), EntityId(7));
        assert_eq!(map.cycle_excluding(0, EntityId(7)), Some(EntityId(7)));
    }
}
