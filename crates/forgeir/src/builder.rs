//! Builders: ordered sequences of Operations, plus the bound/target/control-flow
//! bookkeeping `spec.md` §4.5 requires.

use std::cell::Cell;
use std::rc::Rc;

use crate::clone_map::IRCloneMap;
use crate::error::CompilationException;
use crate::error::CompilerReturnCode;
use crate::ids::{BuilderId, OperationId, ScopeId};

/// How a Builder may be spliced into control flow elsewhere.
///
/// Can only move monotonically `Cant -> May -> Must`, never backwards
/// (`spec.md` §3 lifecycle summary).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundness {
    /// Not eligible to be bound as anyone's child region (e.g. the root entry Builder).
    Cant,
    /// May be appended elsewhere via `AppendBuilder`, but isn't yet.
    May,
    /// Bound as exactly one Operation's child region; see `bound_to`.
    Must,
}

/// What a Builder's "parent" is: either a lexical Scope root, or another Builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderParent {
    Scope(ScopeId),
    Builder(BuilderId),
}

/// An ordered, owned sequence of Operations plus boundness/target bookkeeping.
pub struct Builder {
    id: BuilderId,
    parent: BuilderParent,
    operations: Vec<OperationId>,
    boundness: Rc<Cell<Boundness>>,
    bound_to: Cell<Option<OperationId>>,
    is_target: Cell<bool>,
    control_reaches_end: Cell<bool>,
}

impl Builder {
    pub(crate) fn new(id: BuilderId, parent: BuilderParent) -> Self {
        Self {
            id,
            parent,
            operations: Vec::new(),
            boundness: Rc::new(Cell::new(Boundness::Cant)),
            bound_to: Cell::new(None),
            is_target: Cell::new(false),
            control_reaches_end: Cell::new(true),
        }
    }

    #[must_use]
    pub fn id(&self) -> BuilderId {
        self.id
    }

    #[must_use]
    pub fn parent(&self) -> BuilderParent {
        self.parent
    }

    #[must_use]
    pub fn operations(&self) -> &[OperationId] {
        &self.operations
    }

    #[must_use]
    pub fn boundness(&self) -> Boundness {
        self.boundness.get()
    }

    #[must_use]
    pub fn bound_to(&self) -> Option<OperationId> {
        self.bound_to.get()
    }

    #[must_use]
    pub fn is_target(&self) -> bool {
        self.is_target.get()
    }

    #[must_use]
    pub fn control_reaches_end(&self) -> bool {
        self.control_reaches_end.get()
    }

    /// Marks this Builder as reachable only via transfer (a Goto/IfCmp* names
    /// it as a target). Idempotent.
    pub fn mark_target(&self) {
        self.is_target.set(true);
    }

    /// Appends `op` to this Builder's sequence.
    ///
    /// `is_terminator` is true for Return/ReturnVoid/Goto — appending one of
    /// these sets `control_reaches_end` to false, the source of truth for
    /// fall-through codegen (`spec.md` §4.5).
    pub fn append(&mut self, op: OperationId, is_terminator: bool) {
        self.operations.push(op);
        if is_terminator {
            self.control_reaches_end.set(false);
        }
    }

    /// Overwrites `control_reaches_end` directly, used when replaying an
    /// already-built operation sequence (e.g. cloning) without re-deriving
    /// which appended op was the terminator.
    pub(crate) fn set_control_reaches_end(&mut self, value: bool) {
        self.control_reaches_end.set(value);
    }

    /// Directly restores bound/boundness state, used when replaying an
    /// already-built Builder (e.g. cloning) rather than re-deriving it
    /// through [`Builder::bind_to`]'s rebind checks.
    pub(crate) fn set_bound_state(&mut self, bound_to: Option<OperationId>, boundness: Boundness) {
        self.bound_to.set(bound_to);
        self.boundness.set(boundness);
    }

    /// Allows this Builder to be bound elsewhere later (`Cant -> May`).
    ///
    /// A no-op if boundness is already `May` or `Must` (monotonic).
    pub fn allow_binding(&self) {
        if self.boundness.get() == Boundness::Cant {
            self.boundness.set(Boundness::May);
        }
    }

    /// Binds this Builder as the unique child region of `op`.
    ///
    /// Fails if the Builder is already bound to a *different* Operation —
    /// "Attempting to bind a second time is a fatal construction error"
    /// (`spec.md` §4.5).
    pub fn bind_to(&self, op: OperationId) -> Result<BoundBuilderGuard, CompilationException> {
        if let Some(existing) = self.bound_to.get() {
            if existing != op {
                return Err(CompilationException::new(
                    CompilerReturnCode::FAILED,
                    format!("builder {} is already bound to {existing}; cannot rebind to {op}", self.id),
                ));
            }
        } else {
            self.bound_to.set(Some(op));
        }
        self.boundness.set(Boundness::Must);
        Ok(BoundBuilderGuard { boundness: Rc::clone(&self.boundness), builder_id: self.id })
    }

    pub(crate) fn remap(&mut self, map: &IRCloneMap) {
        self.id = map.map_builder(self.id);
        self.parent = match self.parent {
            BuilderParent::Scope(scope) => BuilderParent::Scope(map.map_scope(scope)),
            BuilderParent::Builder(builder) => BuilderParent::Builder(map.map_builder(builder)),
        };
        for op in &mut self.operations {
            *op = map.map_operation(*op);
        }
        if let Some(bound_to) = self.bound_to.get() {
            self.bound_to.set(Some(map.map_operation(bound_to)));
        }
    }
}

/// A guard returned when a Builder is bound as a child region of an
/// Operation under construction (e.g. `ForLoopUp`'s `loop_body`).
///
/// Models the source's "coroutine-like" builder-object handoff: the client
/// populates the bound Builder (through ordinary `IR` append calls keyed by
/// its `BuilderId`) and then drops the guard, which finalizes its boundness
/// as `Must`. This turns "bind exactly once" into something the type system
/// enforces at the call site rather than a runtime-only check.
pub struct BoundBuilderGuard {
    boundness: Rc<Cell<Boundness>>,
    builder_id: BuilderId,
}

impl BoundBuilderGuard {
    #[must_use]
    pub fn builder_id(&self) -> BuilderId {
        self.builder_id
    }
}

impl Drop for BoundBuilderGuard {
    fn drop(&mut self) {
        self.boundness.set(Boundness::Must);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_terminator_clears_control_reaches_end() {
        let mut b = Builder::new(BuilderId::from_index(0), BuilderParent::Scope(ScopeId::from_index(0)));
        assert!(b.control_reaches_end());
        b.append(OperationId::from_index(0), false);
        assert!(b.control_reaches_end());
        b.append(OperationId::from_index(1), true);
        assert!(!b.control_reaches_end());
    }

    #[test]
    fn binding_twice_to_different_operations_is_an_error() {
        let b = Builder::new(BuilderId::from_index(0), BuilderParent::Scope(ScopeId::from_index(0)));
        let _guard = b.bind_to(OperationId::from_index(5)).unwrap();
        assert_eq!(b.boundness(), Boundness::Must);
        let err = b.bind_to(OperationId::from_index(6));
        assert!(err.is_err());
    }

    #[test]
    fn rebinding_to_the_same_operation_is_allowed() {
        let b = Builder::new(BuilderId::from_index(0), BuilderParent::Scope(ScopeId::from_index(0)));
        let _g1 = b.bind_to(OperationId::from_index(5)).unwrap();
        let _g2 = b.bind_to(OperationId::from_index(5)).unwrap();
    }

    #[test]
    fn target_marking_is_independent_of_boundness() {
        let b = Builder::new(BuilderId::from_index(0), BuilderParent::Scope(ScopeId::from_index(0)));
        assert!(!b.is_target());
        b.mark_target();
        assert!(b.is_target());
    }
}
