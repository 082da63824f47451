//! Contexts: lexical scoping for Symbols and named transfer destinations
//! (`spec.md` §4.7).
//!
//! A Context does not hold a reference to its parent Context — only a
//! `ContextId` — so delegated lookups are done by the owner (`IR`) walking
//! its own `Vec<Context>` by index, the same pattern `ScopedDict` documents
//! for dictionaries generally.

use ahash::AHashMap;

use crate::clone_map::IRCloneMap;
use crate::dictionary::ScopedDict;
use crate::ids::{BuilderId, ContextId, SymbolId};

/// A lexical scope: a local symbol table, a local table of named transfer
/// destinations, and a link to the enclosing Context (if any).
pub struct Context {
    id: ContextId,
    parent: Option<ContextId>,
    symbols: ScopedDict<String, SymbolId>,
    /// Named Builder references reachable from this Context — function entry
    /// points, loop `break`/`continue` labels, and the like.
    entry_points: AHashMap<String, BuilderId>,
}

impl Context {
    #[must_use]
    pub(crate) fn new(id: ContextId, parent: Option<ContextId>) -> Self {
        Self { id, parent, symbols: ScopedDict::new(), entry_points: AHashMap::new() }
    }

    #[must_use]
    pub fn id(&self) -> ContextId {
        self.id
    }

    #[must_use]
    pub fn parent(&self) -> Option<ContextId> {
        self.parent
    }

    pub fn define_symbol(&mut self, name: &str, id: SymbolId) {
        self.symbols.insert(name.to_string(), id);
    }

    #[must_use]
    pub fn lookup_local(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get_local(&name.to_string())
    }

    pub fn register_entry_point(&mut self, name: &str, builder: BuilderId) {
        self.entry_points.insert(name.to_string(), builder);
    }

    #[must_use]
    pub fn entry_point_local(&self, name: &str) -> Option<BuilderId> {
        self.entry_points.get(name).copied()
    }

    pub(crate) fn remap(&mut self, map: &IRCloneMap) {
        self.id = map.map_context(self.id);
        self.parent = self.parent.map(|p| map.map_context(p));
        self.symbols.remap_values(|sym| map.map_symbol(sym));
        for builder in self.entry_points.values_mut() {
            *builder = map.map_builder(*builder);
        }
    }
}

/// Walks `start`'s Context chain, returning the first local symbol match.
///
/// `contexts` is indexed by `ContextId::index()`, mirroring how `IR` stores
/// its Context table.
#[must_use]
pub fn resolve_symbol(contexts: &[Context], start: ContextId, name: &str) -> Option<SymbolId> {
    let mut cursor = Some(start);
    while let Some(id) = cursor {
        let ctx = &contexts[id.index()];
        if let Some(sym) = ctx.lookup_local(name) {
            return Some(sym);
        }
        cursor = ctx.parent();
    }
    None
}

/// Same chain walk, for named transfer destinations.
#[must_use]
pub fn resolve_entry_point(contexts: &[Context], start: ContextId, name: &str) -> Option<BuilderId> {
    let mut cursor = Some(start);
    while let Some(id) = cursor {
        let ctx = &contexts[id.index()];
        if let Some(builder) = ctx.entry_point_local(name) {
            return Some(builder);
        }
        cursor = ctx.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_falls_through_to_an_ancestor() {
        let mut root = Context::new(ContextId::from_index(0), None);
        root.define_symbol("x", SymbolId::from_index(7));
        let child = Context::new(ContextId::from_index(1), Some(ContextId::from_index(0)));
        let contexts = vec![root, child];
        assert_eq!(resolve_symbol(&contexts, ContextId::from_index(1), "x"), Some(SymbolId::from_index(7)));
        assert_eq!(resolve_symbol(&contexts, ContextId::from_index(1), "y"), None);
    }

    #[test]
    fn a_local_definition_shadows_the_ancestor() {
        let mut root = Context::new(ContextId::from_index(0), None);
        root.define_symbol("x", SymbolId::from_index(7));
        let mut child = Context::new(ContextId::from_index(1), Some(ContextId::from_index(0)));
        child.define_symbol("x", SymbolId::from_index(9));
        let contexts = vec![root, child];
        assert_eq!(resolve_symbol(&contexts, ContextId::from_index(1), "x"), Some(SymbolId::from_index(9)));
    }

    #[test]
    fn entry_points_delegate_the_same_way() {
        let mut root = Context::new(ContextId::from_index(0), None);
        root.register_entry_point("loop_exit", BuilderId::from_index(3));
        let child = Context::new(ContextId::from_index(1), Some(ContextId::from_index(0)));
        let contexts = vec![root, child];
        assert_eq!(
            resolve_entry_point(&contexts, ContextId::from_index(1), "loop_exit"),
            Some(BuilderId::from_index(3))
        );
    }
}
