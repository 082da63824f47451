//! Symbols: named, typed references into a storage class (`spec.md` §3).

use crate::arena::{Arena, ArenaStr};
use crate::clone_map::IRCloneMap;
use crate::dictionary::ScopedDict;
use crate::ids::{SymbolId, TypeId};

/// Class-specific payload distinguishing the four Symbol subclasses the core names.
#[derive(Debug, Clone, Copy)]
pub enum SymbolClass {
    /// A local variable, storage-class only (no extra payload beyond type).
    Local,
    /// A formal parameter, carrying its ordinal index.
    Parameter { index: u32 },
    /// A function entry point, carrying its native entry pointer once compiled.
    Function { entry_point: Option<usize> },
    /// A field, carrying the owning struct type and a byte offset.
    Field { owner: TypeId, offset_bits: u32 },
}

/// A named, typed Symbol.
pub struct Symbol<'a> {
    id: SymbolId,
    name: ArenaStr<'a>,
    ty: TypeId,
    class: SymbolClass,
}

impl<'a> Symbol<'a> {
    pub(crate) fn new(id: SymbolId, arena: &'a Arena, name: &str, ty: TypeId, class: SymbolClass) -> Self {
        Self { id, name: arena.intern_str(name), ty, class }
    }

    #[must_use]
    pub fn id(&self) -> SymbolId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    #[must_use]
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    #[must_use]
    pub fn class(&self) -> &SymbolClass {
        &self.class
    }

    #[must_use]
    pub fn is_parameter(&self) -> bool {
        matches!(self.class, SymbolClass::Parameter { .. })
    }

    /// Sets the function entry point once a [`crate::compilation::CompiledBody`] exists.
    pub fn set_entry_point(&mut self, entry: usize) {
        if let SymbolClass::Function { entry_point } = &mut self.class {
            *entry_point = Some(entry);
        }
    }

    /// Renumbers a parameter Symbol, used by [`crate::type_replacer::TypeReplacer`]
    /// after a preceding parameter's type has been exploded into several.
    pub fn set_parameter_index(&mut self, index: u32) {
        if let SymbolClass::Parameter { index: slot } = &mut self.class {
            *slot = index;
        }
    }

    pub(crate) fn remap(&mut self, map: &IRCloneMap) {
        self.id = map.map_symbol(self.id);
        self.ty = map.map_type(self.ty);
        if let SymbolClass::Field { owner, .. } = &mut self.class {
            *owner = map.map_type(*owner);
        }
    }
}

/// `SymbolDictionary`: keyed by name within a Context chain (`spec.md` §4.7).
#[derive(Debug, Clone, Default)]
pub struct SymbolDictionary {
    by_name: ScopedDict<String, SymbolId>,
}

impl SymbolDictionary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, id: SymbolId) {
        self.by_name.insert(name.to_string(), id);
    }

    #[must_use]
    pub fn lookup_local(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get_local(&name.to_string())
    }

    pub(crate) fn remap(&mut self, map: &IRCloneMap) {
        self.by_name.remap_values(|id| map.map_symbol(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn parameter_symbol_carries_its_index() {
        let arena = Arena::new();
        let sym = Symbol::new(
            SymbolId::from_index(0),
            &arena,
            "x",
            TypeId::from_index(0),
            SymbolClass::Parameter { index: 2 },
        );
        assert!(sym.is_parameter());
        assert!(matches!(sym.class(), SymbolClass::Parameter { index: 2 }));
    }

    #[test]
    fn symbol_dictionary_shadowing_targets_local_level_only() {
        let mut parent = SymbolDictionary::new();
        parent.register("x", SymbolId::from_index(0));
        let mut child = SymbolDictionary::new();
        child.register("x", SymbolId::from_index(1));
        assert_eq!(parent.lookup_local("x"), Some(SymbolId::from_index(0)));
        assert_eq!(child.lookup_local("x"), Some(SymbolId::from_index(1)));
    }
}
