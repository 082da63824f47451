//! Process-wide registry assigning hierarchical kind ids to `Extensible` subclasses.
//!
//! `is_kind`/`refine` replace open-ended downcasting across the IR's base
//! types (`Type`, `Symbol`, `Operation`, `Builder`, ...): `is_kind` is a
//! prefix check over a kind's ancestor chain, `refine` is `is_kind` followed
//! by an unchecked cast. Kind ids are assigned once per process, on first
//! registration, behind a single global lock — the one piece of truly
//! global mutable state this crate has, matching `spec.md` §5.
//!
//! Modeled as a registry rather than a fixed enum because new `Extension`s
//! register new kinds at load time; the kind set is open-ended the same way
//! the set of `StaticStrings` in the teacher crate's interner is fixed only
//! because CPython's attribute names are fixed; here the analogous set is
//! unbounded, so the registry grows instead of being a `#[repr(u16)]` enum.

use std::sync::{Mutex, OnceLock};

/// A process-wide kind id.
///
/// Stable only within one process's lifetime; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KindId(u32);

struct KindRecord {
    name: &'static str,
    parent: Option<KindId>,
}

struct KindRegistry {
    records: Vec<KindRecord>,
}

impl KindRegistry {
    const fn new() -> Self {
        Self { records: Vec::new() }
    }

    fn register(&mut self, name: &'static str, parent: Option<KindId>) -> KindId {
        let id = KindId(u32::try_from(self.records.len()).expect("too many registered kinds"));
        self.records.push(KindRecord { name, parent });
        id
    }

    fn is_kind(&self, candidate: KindId, ancestor: KindId) -> bool {
        let mut cur = Some(candidate);
        while let Some(k) = cur {
            if k == ancestor {
                return true;
            }
            cur = self.records[k.index()].parent;
        }
        false
    }

    fn name(&self, id: KindId) -> &'static str {
        self.records[id.index()].name
    }
}

impl KindId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

fn registry() -> &'static Mutex<KindRegistry> {
    static REGISTRY: OnceLock<Mutex<KindRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(KindRegistry::new()))
}

/// Registers a new root kind (no parent), e.g. the base `Type` kind.
///
/// Extensions call this (indirectly, through [`register_subkind`]) exactly
/// once per process per distinct kind, typically from a `OnceLock`-guarded
/// static initializer colocated with the Rust type it tags.
#[must_use]
pub fn register_root_kind(name: &'static str) -> KindId {
    registry().lock().unwrap_or_else(std::sync::PoisonError::into_inner).register(name, None)
}

/// Registers `name` as a child kind of `parent`.
///
/// Contract: `is_kind(child, parent)` is true for the returned id and every
/// ancestor of `parent`, forever, once this call returns.
#[must_use]
pub fn register_subkind(name: &'static str, parent: KindId) -> KindId {
    registry()
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .register(name, Some(parent))
}

/// True if `candidate` is `ancestor` or a descendant of `ancestor` in the kind tree.
#[must_use]
pub fn is_kind(candidate: KindId, ancestor: KindId) -> bool {
    registry().lock().unwrap_or_else(std::sync::PoisonError::into_inner).is_kind(candidate, ancestor)
}

/// The human-readable name a kind was registered under.
#[must_use]
pub fn kind_name(id: KindId) -> &'static str {
    registry().lock().unwrap_or_else(std::sync::PoisonError::into_inner).name(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_is_kind_of_every_ancestor() {
        let root = register_root_kind("forgeir.test.Root");
        let mid = register_subkind("forgeir.test.Mid", root);
        let leaf = register_subkind("forgeir.test.Leaf", mid);

        assert!(is_kind(leaf, leaf));
        assert!(is_kind(leaf, mid));
        assert!(is_kind(leaf, root));
        assert!(!is_kind(root, leaf));
        assert!(!is_kind(mid, leaf));
    }

    #[test]
    fn unrelated_kinds_are_not_related() {
        let a = register_root_kind("forgeir.test.A");
        let b = register_root_kind("forgeir.test.B");
        assert!(!is_kind(a, b));
        assert!(!is_kind(b, a));
    }
}
