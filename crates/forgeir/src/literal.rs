//! Literals: immutable (Type, byte payload) pairs deduplicated by bit-exact value.

use crate::arena::Arena;
use crate::clone_map::IRCloneMap;
use crate::dictionary::ScopedDict;
use crate::ids::{LiteralId, TypeId};

/// An immutable typed constant. The payload is exactly
/// `type.size_in_bits() / 8` bytes, uninterpreted by the core.
pub struct Literal<'a> {
    id: LiteralId,
    ty: TypeId,
    bytes: &'a [u8],
}

impl<'a> Literal<'a> {
    pub(crate) fn new(id: LiteralId, arena: &'a Arena, ty: TypeId, bytes: &[u8]) -> Self {
        Self { id, ty, bytes: arena.intern_bytes(bytes) }
    }

    #[must_use]
    pub fn id(&self) -> LiteralId {
        self.id
    }

    #[must_use]
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub(crate) fn remap(&mut self, map: &IRCloneMap) {
        self.id = map.map_literal(self.id);
        self.ty = map.map_type(self.ty);
    }
}

/// Dedup key: (owning type, bit-exact bytes).
type LiteralKey = (TypeId, Vec<u8>);

/// `LiteralDictionary`: keyed by `(type_id, bit-exact bytes)` (`spec.md` §4.7).
#[derive(Debug, Clone, Default)]
pub struct LiteralDictionary {
    by_value: ScopedDict<LiteralKey, LiteralId>,
}

impl LiteralDictionary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, ty: TypeId, bytes: &[u8], id: LiteralId) {
        self.by_value.insert((ty, bytes.to_vec()), id);
    }

    #[must_use]
    pub fn lookup_local(&self, ty: TypeId, bytes: &[u8]) -> Option<LiteralId> {
        self.by_value.get_local(&(ty, bytes.to_vec()))
    }

    pub(crate) fn remap(&mut self, map: &IRCloneMap) {
        self.by_value.remap_values(|id| map.map_literal(id));
    }

    pub(crate) fn merge_from(&mut self, other: Self) {
        self.by_value.merge_from(other.by_value);
    }
}
