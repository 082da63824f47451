//! Structured control-flow constructs: `ForLoopUp`, `IfThenElse`, `Switch`
//! (`spec.md` §4.5, §4.6).
//!
//! Each constructor creates its child Builder(s), appends the Operation that
//! owns them, and binds each child to that Operation before handing back a
//! handle bundling the resulting [`BoundBuilderGuard`]s. The client populates
//! a child Builder through ordinary `IR::append_operation` calls keyed by its
//! `BuilderId`, then drops the handle (or just lets it go out of scope) to
//! finalize that Builder's boundness.

use smallvec::SmallVec;

use crate::builder::{BoundBuilderGuard, BuilderParent};
use crate::error::CompilationException;
use crate::ids::{BuilderId, OperationId, TypeId, ValueId};
use crate::ir::IR;
use crate::operation::ActionId;

/// A counted loop counting an induction variable from `start` up to (but not
/// including) `end` by `step`. Exposes three bound Builders (`spec.md` §4.6):
/// `loop_body` (the iteration body), `loop_break` (control transfers here to
/// leave the loop early), and `loop_continue` (control transfers here to
/// re-enter the bump-and-test without re-running the rest of the body).
pub struct ForLoopUpHandle {
    pub operation: OperationId,
    pub loop_body: BuilderId,
    pub loop_break: BuilderId,
    pub loop_continue: BuilderId,
    body_guard: BoundBuilderGuard,
    break_guard: BoundBuilderGuard,
    continue_guard: BoundBuilderGuard,
}

impl ForLoopUpHandle {
    #[must_use]
    pub fn loop_body(&self) -> BuilderId {
        self.body_guard.builder_id()
    }

    #[must_use]
    pub fn loop_break(&self) -> BuilderId {
        self.break_guard.builder_id()
    }

    #[must_use]
    pub fn loop_continue(&self) -> BuilderId {
        self.continue_guard.builder_id()
    }
}

pub fn build_for_loop_up(
    ir: &mut IR<'_>,
    current_builder: BuilderId,
    owning_extension: &'static str,
    action: ActionId,
    induction_type: TypeId,
    start: ValueId,
    end: ValueId,
    step: ValueId,
) -> Result<ForLoopUpHandle, CompilationException> {
    let body = ir.new_builder(BuilderParent::Builder(current_builder));
    let loop_break = ir.new_builder(BuilderParent::Builder(current_builder));
    let loop_continue = ir.new_builder(BuilderParent::Builder(current_builder));
    ir.builder(body).allow_binding();
    ir.builder(loop_break).allow_binding();
    ir.builder(loop_continue).allow_binding();

    let operands: SmallVec<[ValueId; 2]> = SmallVec::from_slice(&[start, end, step]);
    let operation = ir.append_operation(
        current_builder,
        action,
        owning_extension,
        operands,
        &[],
        SmallVec::from_slice(&[induction_type]),
        SmallVec::new(),
        SmallVec::new(),
        SmallVec::from_slice(&[body, loop_break, loop_continue]),
        SmallVec::new(),
        false,
    )?;

    let body_guard = ir.builder(body).bind_to(operation).expect("freshly created body builder cannot already be bound");
    let break_guard =
        ir.builder(loop_break).bind_to(operation).expect("freshly created break builder cannot already be bound");
    let continue_guard =
        ir.builder(loop_continue).bind_to(operation).expect("freshly created continue builder cannot already be bound");
    Ok(ForLoopUpHandle { operation, loop_body: body, loop_break, loop_continue, body_guard, break_guard, continue_guard })
}

/// A two-way conditional with a bound Builder per branch.
pub struct IfThenElseHandle {
    pub operation: OperationId,
    then_guard: BoundBuilderGuard,
    else_guard: BoundBuilderGuard,
}

impl IfThenElseHandle {
    #[must_use]
    pub fn then_path(&self) -> BuilderId {
        self.then_guard.builder_id()
    }

    #[must_use]
    pub fn else_path(&self) -> BuilderId {
        self.else_guard.builder_id()
    }
}

pub fn build_if_then_else(
    ir: &mut IR<'_>,
    current_builder: BuilderId,
    owning_extension: &'static str,
    action: ActionId,
    condition: ValueId,
) -> Result<IfThenElseHandle, CompilationException> {
    let then_path = ir.new_builder(BuilderParent::Builder(current_builder));
    let else_path = ir.new_builder(BuilderParent::Builder(current_builder));
    ir.builder(then_path).allow_binding();
    ir.builder(else_path).allow_binding();

    let operands: SmallVec<[ValueId; 2]> = SmallVec::from_slice(&[condition]);
    let operation = ir.append_operation(
        current_builder,
        action,
        owning_extension,
        operands,
        &[],
        SmallVec::new(),
        SmallVec::new(),
        SmallVec::new(),
        SmallVec::from_slice(&[then_path, else_path]),
        SmallVec::new(),
        false,
    )?;

    let then_guard = ir.builder(then_path).bind_to(operation).expect("freshly created then-path cannot already be bound");
    let else_guard = ir.builder(else_path).bind_to(operation).expect("freshly created else-path cannot already be bound");
    Ok(IfThenElseHandle { operation, then_guard, else_guard })
}

/// A multi-way branch with one bound Builder per case plus a mandatory
/// default. Case selector literals live in the Operation's `literal_operands`,
/// positionally matched to `bound_builders[..case_count]`; the default is the
/// final entry in `bound_builders`. Each case also carries a `falls_through`
/// flag (`spec.md` §4.6): when true, control proceeds to the *next* case
/// instead of exiting the switch once that case's builder runs off its end.
pub struct SwitchHandle {
    pub operation: OperationId,
    case_guards: Vec<BoundBuilderGuard>,
    default_guard: BoundBuilderGuard,
}

impl SwitchHandle {
    #[must_use]
    pub fn case(&self, index: usize) -> BuilderId {
        self.case_guards[index].builder_id()
    }

    #[must_use]
    pub fn case_count(&self) -> usize {
        self.case_guards.len()
    }

    #[must_use]
    pub fn default_path(&self) -> BuilderId {
        self.default_guard.builder_id()
    }

    /// Whether case `index` falls through to the next case (`spec.md` §4.6).
    #[must_use]
    pub fn falls_through(&self, ir: &IR<'_>, index: usize) -> bool {
        ir.operation(self.operation).case_falls_through()[index]
    }
}

pub fn build_switch(
    ir: &mut IR<'_>,
    current_builder: BuilderId,
    owning_extension: &'static str,
    action: ActionId,
    selector: ValueId,
    case_literals: SmallVec<[crate::ids::LiteralId; 1]>,
    falls_through: SmallVec<[bool; 2]>,
) -> Result<SwitchHandle, CompilationException> {
    assert_eq!(
        case_literals.len(),
        falls_through.len(),
        "build_switch requires one falls_through flag per case literal"
    );
    let case_count = case_literals.len();
    let mut case_builders: SmallVec<[BuilderId; 2]> = SmallVec::with_capacity(case_count);
    for _ in 0..case_count {
        let case = ir.new_builder(BuilderParent::Builder(current_builder));
        ir.builder(case).allow_binding();
        case_builders.push(case);
    }
    let default = ir.new_builder(BuilderParent::Builder(current_builder));
    ir.builder(default).allow_binding();
    let mut bound_builders = case_builders.clone();
    bound_builders.push(default);

    let operands: SmallVec<[ValueId; 2]> = SmallVec::from_slice(&[selector]);
    let operation = ir.append_operation(
        current_builder,
        action,
        owning_extension,
        operands,
        &[],
        SmallVec::new(),
        case_literals,
        SmallVec::new(),
        bound_builders,
        SmallVec::new(),
        false,
    )?;
    ir.operation_mut(operation).set_case_falls_through(falls_through);

    let case_guards = case_builders
        .iter()
        .map(|&b| ir.builder(b).bind_to(operation).expect("freshly created case builder cannot already be bound"))
        .collect();
    let default_guard = ir.builder(default).bind_to(operation).expect("freshly created default builder cannot already be bound");

    Ok(SwitchHandle { operation, case_guards, default_guard })
}
