//! Scenarios C and D (`spec.md` §8): a counted loop's body is populated and
//! finalizes on drop; a switch binds every case plus a mandatory default and
//! carries its selector literals in case order.

mod support;

use forgeir::{
    build_for_loop_up, build_switch, ActionId, Arena, Boundness, BuilderParent, PrimitiveKind, IR,
};
use pretty_assertions::assert_eq;

#[test]
fn a_counted_loop_emits_three_body_operations() {
    let arena = Arena::new();
    let mut ir = IR::new(&arena);
    let i32_ty = ir.declare_primitive_type("core", PrimitiveKind::Int32);
    let loop_action = ActionId::register("forgeir.test.control_flow.ForLoopUp");
    let const_op = support::const_action();
    let call_op = support::call_action();

    let root = ir.new_builder(BuilderParent::Scope(ir.root_scope()));
    let start = support::emit_const(&mut ir, root, const_op, i32_ty, &0i32.to_ne_bytes());
    let end = support::emit_const(&mut ir, root, const_op, i32_ty, &3i32.to_ne_bytes());
    let step = support::emit_const(&mut ir, root, const_op, i32_ty, &1i32.to_ne_bytes());

    let handle = build_for_loop_up(&mut ir, root, "core", loop_action, i32_ty, start, end, step).unwrap();
    let body = handle.loop_body();

    // populate the body as if emitting the loop's three statically-visible iterations
    for _ in 0..3 {
        support::emit_call(&mut ir, body, call_op, &[]);
    }

    assert_eq!(ir.builder(body).operations().len(), 3);
    assert_eq!(ir.builder(body).boundness(), Boundness::Must);
    assert_eq!(ir.builder(handle.loop_break()).boundness(), Boundness::Must);
    assert_eq!(ir.builder(handle.loop_continue()).boundness(), Boundness::Must);
    assert_eq!(
        ir.operation(handle.operation).bound_builders(),
        &[body, handle.loop_break(), handle.loop_continue()]
    );
    assert_eq!(ir.operation(handle.operation).operands(), &[start, end, step]);
}

#[test]
fn a_switch_carries_its_case_literals_in_case_order_with_a_mandatory_default() {
    let arena = Arena::new();
    let mut ir = IR::new(&arena);
    let i32_ty = ir.declare_primitive_type("core", PrimitiveKind::Int32);
    let switch_action = ActionId::register("forgeir.test.control_flow.Switch");
    let const_op = support::const_action();
    let call_op = support::call_action();

    let root = ir.new_builder(BuilderParent::Scope(ir.root_scope()));
    let selector = support::emit_const(&mut ir, root, const_op, i32_ty, &1i32.to_ne_bytes());
    let zero = ir.create_literal(i32_ty, &0i32.to_ne_bytes());
    let one = ir.create_literal(i32_ty, &1i32.to_ne_bytes());

    let handle = build_switch(
        &mut ir,
        root,
        "core",
        switch_action,
        selector,
        smallvec::smallvec![zero, one],
        // case 0 falls through into case 1; case 1 exits the switch normally
        smallvec::smallvec![true, false],
    )
    .unwrap();
    assert_eq!(handle.case_count(), 2);

    support::emit_call(&mut ir, handle.case(0), call_op, &[]);
    support::emit_call(&mut ir, handle.case(1), call_op, &[]);
    support::emit_call(&mut ir, handle.default_path(), call_op, &[]);

    for i in 0..handle.case_count() {
        assert_eq!(ir.builder(handle.case(i)).boundness(), Boundness::Must);
        assert!(ir.builder(handle.case(i)).control_reaches_end());
    }
    assert_eq!(ir.builder(handle.default_path()).boundness(), Boundness::Must);
    assert_eq!(ir.operation(handle.operation).literal_operands(), &[zero, one]);
    assert_eq!(
        ir.operation(handle.operation).bound_builders(),
        &[handle.case(0), handle.case(1), handle.default_path()]
    );

    // falls_through is its own signal, independent of control_reaches_end:
    // both cases reach their own end without a terminator, but only case 0
    // is marked to proceed into the next case rather than exit the switch.
    assert!(handle.falls_through(&ir, 0));
    assert!(!handle.falls_through(&ir, 1));
}
