//! Id remapping for merging one `IR`'s tables into another (`spec.md` §9).
//!
//! Every cross-reference in the IR is a dense `u32` newtype id rather than a
//! pointer, so merging one IR's content into another's tables is pure
//! arithmetic: each kind of id just shifts by how many entries of that kind
//! already existed in the destination. There is no cycle-ordering problem to
//! solve (a `StructType` naming one of its own `Field` types, a `ForLoopUp`
//! whose bound body `Builder` eventually transfers back to it, ...) because
//! nothing is traversed to discover the mapping — the offsets are known
//! before a single field is rewritten.

use crate::ids::{BuilderId, ContextId, LiteralId, OperationId, ScopeId, SymbolId, TypeId, ValueId};

/// Per-kind index offsets applied when appending a source IR's tables onto a
/// destination IR's tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct IRCloneMap {
    pub(crate) type_offset: usize,
    pub(crate) literal_offset: usize,
    pub(crate) symbol_offset: usize,
    pub(crate) value_offset: usize,
    pub(crate) operation_offset: usize,
    pub(crate) builder_offset: usize,
    pub(crate) context_offset: usize,
    pub(crate) scope_offset: usize,
}

impl IRCloneMap {
    #[must_use]
    pub fn map_type(&self, id: TypeId) -> TypeId {
        TypeId::from_index(id.index() + self.type_offset)
    }

    #[must_use]
    pub fn map_literal(&self, id: LiteralId) -> LiteralId {
        LiteralId::from_index(id.index() + self.literal_offset)
    }

    #[must_use]
    pub fn map_symbol(&self, id: SymbolId) -> SymbolId {
        SymbolId::from_index(id.index() + self.symbol_offset)
    }

    #[must_use]
    pub fn map_value(&self, id: ValueId) -> ValueId {
        ValueId::from_index(id.index() + self.value_offset)
    }

    #[must_use]
    pub fn map_operation(&self, id: OperationId) -> OperationId {
        OperationId::from_index(id.index() + self.operation_offset)
    }

    #[must_use]
    pub fn map_builder(&self, id: BuilderId) -> BuilderId {
        BuilderId::from_index(id.index() + self.builder_offset)
    }

    #[must_use]
    pub fn map_context(&self, id: ContextId) -> ContextId {
        ContextId::from_index(id.index() + self.context_offset)
    }

    #[must_use]
    pub fn map_scope(&self, id: ScopeId) -> ScopeId {
        ScopeId::from_index(id.index() + self.scope_offset)
    }
}
