//! Generic scoped, deduplicating dictionary shared by `TypeDictionary`,
//! `LiteralDictionary`, and `SymbolDictionary` (`spec.md` §4.7).
//!
//! Every dictionary in the IR follows the same lookup protocol: consult the
//! local table first, then fall back to a parent. Registration always
//! targets the local table, so a nested `Context` can shadow a name from an
//! ancestor without mutating it. This is the same "local table + optional
//! fallback" shape as the teacher crate's `ChainMap` (`types/chain_map.rs`),
//! specialized here to dense `ahash` maps keyed by structural name or byte
//! payload instead of Python identifiers.

use ahash::AHashMap;
use std::hash::Hash;

/// One scope level of a dictionary: its own entries plus nothing else.
///
/// Parent delegation is modeled by the owner (`Context`, `IR`) walking a
/// chain of `ScopedDict`s, not by `ScopedDict` holding a pointer to its
/// parent — that would need a lifetime or `Rc` for no benefit, since the
/// owner already knows how to walk its own parent chain.
#[derive(Debug, Clone)]
pub struct ScopedDict<K, V> {
    own: AHashMap<K, V>,
}

impl<K, V> Default for ScopedDict<K, V> {
    fn default() -> Self {
        Self { own: AHashMap::default() }
    }
}

impl<K, V> ScopedDict<K, V>
where
    K: Eq + Hash,
    V: Copy,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `key -> value` in this level only.
    ///
    /// Returns the previous value, if this level already had one bound
    /// (idempotent re-registration of the exact same deduplication key is
    /// the common case and is not an error).
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.own.insert(key, value)
    }

    /// Looks up `key` in this level only (no parent fallback).
    #[must_use]
    pub fn get_local(&self, key: &K) -> Option<V> {
        self.own.get(key).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.own.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.own.is_empty()
    }

    /// Rewrites every stored value in place, e.g. to apply an `IRCloneMap`
    /// offset after this dictionary's owner has been appended onto another IR.
    pub(crate) fn remap_values(&mut self, mut f: impl FnMut(V) -> V) {
        for value in self.own.values_mut() {
            *value = f(*value);
        }
    }

    /// Moves every entry of `other` into this level. `other`'s entries win on
    /// key collision, matching "the last registration for a name is the live
    /// one" used everywhere else shadowing applies.
    pub(crate) fn merge_from(&mut self, other: Self) {
        self.own.extend(other.own);
    }
}
