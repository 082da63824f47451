//! Values: typed, single-assignment producers (`spec.md` §3).

use crate::arena::{Arena, ArenaStr};
use crate::clone_map::IRCloneMap;
use crate::ids::{OperationId, TypeId, ValueId};

/// A single-assignment SSA-like Value. Every Value has exactly one defining
/// Operation and a type fixed at creation.
pub struct Value<'a> {
    id: ValueId,
    ty: TypeId,
    defining_op: OperationId,
    /// Optional debug name (e.g. mirrors a source-level variable for diagnostics).
    name: Option<ArenaStr<'a>>,
}

impl<'a> Value<'a> {
    pub(crate) fn new(id: ValueId, ty: TypeId, defining_op: OperationId) -> Self {
        Self { id, ty, defining_op, name: None }
    }

    pub(crate) fn with_name(mut self, arena: &'a Arena, name: &str) -> Self {
        self.name = Some(arena.intern_str(name));
        self
    }

    #[must_use]
    pub fn id(&self) -> ValueId {
        self.id
    }

    #[must_use]
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    #[must_use]
    pub fn defining_op(&self) -> OperationId {
        self.defining_op
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().map(ArenaStr::as_str)
    }

    pub(crate) fn remap(&mut self, map: &IRCloneMap) {
        self.id = map.map_value(self.id);
        self.ty = map.map_type(self.ty);
        self.defining_op = map.map_operation(self.defining_op);
    }
}
