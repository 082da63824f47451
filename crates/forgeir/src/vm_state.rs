//! VM-state operand-stack abstraction (`spec.md` §4.9).
//!
//! Models an interpreter's operand stack (or any other typed, depth-indexed
//! piece of VM state) as a sequence of slots, each holding the `Value`
//! currently loaded for it. The core doesn't know what the backing storage
//! for a slot actually is — that's an extension's concern (a Java-style
//! interpreter backs slots with a frame array; something else might use
//! registers) — so `commit`/`reload` take caller-supplied store/load
//! callbacks rather than emitting any concrete Operation themselves.

use crate::error::{CompilationException, CompilerReturnCode};
use crate::ids::{TypeId, ValueId};

/// One typed slot of an operand stack: the currently-loaded `Value` and its `Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandSlot {
    value: ValueId,
    ty: TypeId,
}

impl OperandSlot {
    #[must_use]
    pub fn new(value: ValueId, ty: TypeId) -> Self {
        Self { value, ty }
    }

    #[must_use]
    pub fn value(&self) -> ValueId {
        self.value
    }

    #[must_use]
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    pub fn set_value(&mut self, value: ValueId) {
        self.value = value;
    }
}

/// A named register backed by a memory cell at some address expression
/// (`spec.md` §4.9): `Load`/`Store` read and write the register's live
/// `Value`; `Adjust` re-points it at a new address; `Commit`/`Reload` push it
/// out to, or pull it back from, whatever concretely backs that address —
/// the core has no opinion on what that backing store is, same as
/// [`VirtualMachineOperandStack::commit`]/`reload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualMachineRegister {
    name: &'static str,
    address: ValueId,
    value: ValueId,
    ty: TypeId,
}

impl VirtualMachineRegister {
    #[must_use]
    pub fn new(name: &'static str, address: ValueId, value: ValueId, ty: TypeId) -> Self {
        Self { name, address, value, ty }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn address(&self) -> ValueId {
        self.address
    }

    #[must_use]
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    /// `Load`: the register's currently-held `Value`.
    #[must_use]
    pub fn load(&self) -> ValueId {
        self.value
    }

    /// `Store`: replaces the register's live `Value` without touching its backing cell.
    pub fn store(&mut self, value: ValueId) {
        self.value = value;
    }

    /// `Adjust(delta)`: re-points this register at `new_address`, a `Value`
    /// the caller has already built to express the shifted address (e.g. via
    /// an `IR::append_operation` call adding `delta` to the old address).
    pub fn adjust(&mut self, new_address: ValueId) {
        self.address = new_address;
    }

    /// `Commit`: writes this register's address/value/type out via `store`.
    pub fn commit(&self, mut store: impl FnMut(ValueId, ValueId, TypeId)) {
        store(self.address, self.value, self.ty);
    }

    /// `Reload`: replaces this register's live `Value` by calling
    /// `load(address, type) -> Value`. The address and type are unchanged.
    pub fn reload(&mut self, mut load: impl FnMut(ValueId, TypeId) -> ValueId) {
        self.value = load(self.address, self.ty);
    }
}

/// A depth-indexed stack of [`OperandSlot`]s, bottom at index 0, optionally
/// anchored to a [`VirtualMachineRegister`] tracking its top-of-stack address
/// (`spec.md` §4.9's `VirtualMachineOperandStack(initial_size, top_register,
/// element_type)`). Cloning produces an independent snapshot — the `MakeCopy`
/// operation §4.9 names for branching into two control paths that each
/// evolve the stack independently from a common point.
#[derive(Debug, Clone, Default)]
pub struct VirtualMachineOperandStack {
    slots: Vec<OperandSlot>,
    top_register: Option<VirtualMachineRegister>,
}

impl VirtualMachineOperandStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `register` as this stack's top-of-stack tracking register,
    /// re-pointed by [`Self::update_stack`].
    #[must_use]
    pub fn with_top_register(mut self, register: VirtualMachineRegister) -> Self {
        self.top_register = Some(register);
        self
    }

    #[must_use]
    pub fn top_register(&self) -> Option<&VirtualMachineRegister> {
        self.top_register.as_ref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// `Push`.
    pub fn push(&mut self, value: ValueId, ty: TypeId) {
        self.slots.push(OperandSlot::new(value, ty));
    }

    /// `Pop`.
    pub fn pop(&mut self) -> Option<OperandSlot> {
        self.slots.pop()
    }

    /// Depth-indexed read, bottom at the highest depth, top (most recently
    /// pushed) at depth 0.
    #[must_use]
    pub fn peek(&self, depth_from_top: usize) -> Option<&OperandSlot> {
        let index = self.slots.len().checked_sub(depth_from_top + 1)?;
        self.slots.get(index)
    }

    /// `Top`: the slot at depth 0, equivalent to `peek(0)`.
    #[must_use]
    pub fn top(&self) -> Option<&OperandSlot> {
        self.peek(0)
    }

    /// `Pick(depth)`: the slot at the given depth from the top, equivalent to `peek(depth)`.
    #[must_use]
    pub fn pick(&self, depth_from_top: usize) -> Option<&OperandSlot> {
        self.peek(depth_from_top)
    }

    /// `Dup`: pushes a copy of the top slot. Rejects an empty stack.
    pub fn dup(&mut self) -> Result<(), CompilationException> {
        let top = *self
            .slots
            .last()
            .ok_or_else(|| CompilationException::new(CompilerReturnCode::FAILED, "Dup on an empty operand stack"))?;
        self.slots.push(top);
        Ok(())
    }

    /// `Drop(count)`: discards the top `count` slots. `count == len()` empties
    /// the stack; `count > len()` is a construction error rather than a
    /// silent clamp.
    pub fn discard(&mut self, count: usize) -> Result<(), CompilationException> {
        if count > self.slots.len() {
            return Err(CompilationException::new(
                CompilerReturnCode::FAILED,
                format!("Drop({count}) exceeds operand stack depth {}", self.slots.len()),
            ));
        }
        self.slots.truncate(self.slots.len() - count);
        Ok(())
    }

    /// `UpdateStack(new_base)`: re-anchors this stack's top-of-stack register
    /// (if one is attached) at `new_base`. A no-op when no register is attached.
    pub fn update_stack(&mut self, new_base: ValueId) {
        if let Some(register) = &mut self.top_register {
            register.adjust(new_base);
        }
    }

    /// An independent snapshot of this stack's current state.
    #[must_use]
    pub fn make_copy(&self) -> Self {
        self.clone()
    }

    /// Writes every slot's current Value out via `store(depth, value, type)`,
    /// bottom-to-top.
    pub fn commit(&self, mut store: impl FnMut(usize, ValueId, TypeId)) {
        for (depth, slot) in self.slots.iter().enumerate() {
            store(depth, slot.value, slot.ty);
        }
    }

    /// Replaces every slot's Value by calling `load(depth, type) -> Value`,
    /// bottom-to-top. Depth count and slot types are unchanged by a reload —
    /// only the live Value each slot points at moves.
    pub fn reload(&mut self, mut load: impl FnMut(usize, TypeId) -> ValueId) {
        for (depth, slot) in self.slots.iter_mut().enumerate() {
            slot.value = load(depth, slot.ty);
        }
    }

    /// Merges `other` into `self` at a control-flow join point, calling
    /// `merge_value(depth, mine, theirs, type)` to produce the merged Value
    /// for each slot (typically a fresh phi-like Value the caller just built).
    ///
    /// Rejects the merge if the two stacks have different depths, or if any
    /// slot's element type disagrees between them — an operand stack cannot
    /// merge two paths that leave a different *shape* of VM state behind,
    /// even if both paths are individually well-typed.
    pub fn merge_into(
        &mut self,
        other: &Self,
        mut merge_value: impl FnMut(usize, ValueId, ValueId, TypeId) -> ValueId,
    ) -> Result<(), CompilationException> {
        if self.slots.len() != other.slots.len() {
            return Err(CompilationException::new(
                CompilerReturnCode::FAILED,
                format!("operand stack depth mismatch at merge: {} vs {}", self.slots.len(), other.slots.len()),
            ));
        }
        for (depth, (mine, theirs)) in self.slots.iter_mut().zip(other.slots.iter()).enumerate() {
            if mine.ty != theirs.ty {
                return Err(CompilationException::new(
                    CompilerReturnCode::FAILED,
                    format!("operand stack slot {depth} type mismatch at merge: {:?} vs {:?}", mine.ty, theirs.ty),
                ));
            }
            mine.value = merge_value(depth, mine.value, theirs.value, mine.ty);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{TypeId, ValueId};

    fn id(n: usize) -> ValueId {
        ValueId::from_index(n)
    }

    fn ty(n: usize) -> TypeId {
        TypeId::from_index(n)
    }

    #[test]
    fn push_pop_and_peek_follow_lifo_order() {
        let mut stack = VirtualMachineOperandStack::new();
        stack.push(id(1), ty(0));
        stack.push(id(2), ty(0));
        assert_eq!(stack.peek(0).unwrap().value(), id(2));
        assert_eq!(stack.pop().unwrap().value(), id(2));
        assert_eq!(stack.pop().unwrap().value(), id(1));
        assert!(stack.pop().is_none());
    }

    #[test]
    fn top_and_pick_alias_peek() {
        let mut stack = VirtualMachineOperandStack::new();
        stack.push(id(1), ty(0));
        stack.push(id(2), ty(0));
        assert_eq!(stack.top().unwrap().value(), id(2));
        assert_eq!(stack.pick(0).unwrap().value(), id(2));
        assert_eq!(stack.pick(1).unwrap().value(), id(1));
    }

    #[test]
    fn dup_pushes_a_copy_of_the_top_slot() {
        let mut stack = VirtualMachineOperandStack::new();
        stack.push(id(1), ty(0));
        stack.dup().unwrap();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.peek(0).unwrap().value(), id(1));
        assert_eq!(stack.peek(1).unwrap().value(), id(1));
    }

    #[test]
    fn dup_on_an_empty_stack_is_rejected() {
        let mut stack = VirtualMachineOperandStack::new();
        assert!(stack.dup().is_err());
    }

    #[test]
    fn drop_of_exactly_the_depth_empties_the_stack() {
        let mut stack = VirtualMachineOperandStack::new();
        stack.push(id(1), ty(0));
        stack.push(id(2), ty(0));
        stack.discard(2).unwrap();
        assert!(stack.is_empty());
    }

    #[test]
    fn drop_past_the_depth_is_a_construction_error() {
        let mut stack = VirtualMachineOperandStack::new();
        stack.push(id(1), ty(0));
        stack.push(id(2), ty(0));
        let err = stack.discard(3);
        assert!(err.is_err());
        // the failed Drop left the stack untouched
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn update_stack_adjusts_the_attached_top_register() {
        let register = VirtualMachineRegister::new("sp", id(0), id(1), ty(0));
        let mut stack = VirtualMachineOperandStack::new().with_top_register(register);
        stack.update_stack(id(9));
        assert_eq!(stack.top_register().unwrap().address(), id(9));
    }

    #[test]
    fn update_stack_without_an_attached_register_is_a_no_op() {
        let mut stack = VirtualMachineOperandStack::new();
        stack.update_stack(id(9));
        assert!(stack.top_register().is_none());
    }

    #[test]
    fn register_store_load_and_adjust_mutate_independently() {
        let mut register = VirtualMachineRegister::new("fp", id(0), id(1), ty(0));
        assert_eq!(register.load(), id(1));
        register.store(id(2));
        assert_eq!(register.load(), id(2));
        register.adjust(id(5));
        assert_eq!(register.address(), id(5));
    }

    #[test]
    fn register_commit_then_reload_round_trips_through_a_backing_store() {
        let mut register = VirtualMachineRegister::new("fp", id(0), id(1), ty(0));
        let mut backing: Option<(ValueId, ValueId, TypeId)> = None;
        register.commit(|address, value, slot_ty| backing = Some((address, value, slot_ty)));
        assert_eq!(backing, Some((id(0), id(1), ty(0))));

        register.store(id(7));
        register.reload(|_address, _slot_ty| backing.unwrap().1);
        assert_eq!(register.load(), id(1));
    }

    #[test]
    fn commit_then_reload_round_trips_through_a_backing_store() {
        let mut stack = VirtualMachineOperandStack::new();
        stack.push(id(1), ty(0));
        stack.push(id(2), ty(1));

        let mut backing: Vec<(ValueId, TypeId)> = vec![(id(0), ty(0)); 2];
        stack.commit(|depth, value, slot_ty| backing[depth] = (value, slot_ty));
        assert_eq!(backing, vec![(id(1), ty(0)), (id(2), ty(1))]);

        stack.reload(|depth, _slot_ty| backing[depth].0);
        assert_eq!(stack.peek(0).unwrap().value(), id(2));
        assert_eq!(stack.peek(1).unwrap().value(), id(1));
    }

    #[test]
    fn merging_stacks_of_equal_shape_produces_fresh_values() {
        let mut a = VirtualMachineOperandStack::new();
        a.push(id(1), ty(0));
        let mut b = VirtualMachineOperandStack::new();
        b.push(id(2), ty(0));

        a.merge_into(&b, |_depth, _mine, _theirs, _ty| ValueId::from_index(99)).unwrap();
        assert_eq!(a.peek(0).unwrap().value(), ValueId::from_index(99));
    }

    #[test]
    fn merging_stacks_with_a_type_mismatch_at_some_slot_is_rejected() {
        let mut a = VirtualMachineOperandStack::new();
        a.push(id(1), ty(0));
        let mut b = VirtualMachineOperandStack::new();
        b.push(id(2), ty(1));

        let err = a.merge_into(&b, |_depth, mine, _theirs, _ty| mine);
        assert!(err.is_err());
    }

    #[test]
    fn merging_stacks_of_different_depth_is_rejected() {
        let mut a = VirtualMachineOperandStack::new();
        a.push(id(1), ty(0));
        let b = VirtualMachineOperandStack::new();

        let err = a.merge_into(&b, |_depth, mine, _theirs, _ty| mine);
        assert!(err.is_err());
    }
}
