//! A minimal in-tree extension used only by the integration tests: a
//! handful of Action IDs and an arithmetic checker, standing in for the
//! ArithmeticOperations/ControlOperations extensions `spec.md` treats as
//! external collaborators.

#![expect(dead_code, reason = "not every test file exercises every helper")]

use forgeir::{
    ActionId, BuilderId, Checker, CompilationException, CompilerReturnCode, DiagnosticBuilder, IR, OperationId,
    ProposedOperation, TypeId, ValueId,
};
use smallvec::SmallVec;

pub fn const_action() -> ActionId {
    ActionId::register("support.Const")
}

pub fn add_action() -> ActionId {
    ActionId::register("support.Add")
}

pub fn call_action() -> ActionId {
    ActionId::register("support.Call")
}

/// Emits a `Const` Operation producing one Value of `ty` holding `bytes`.
pub fn emit_const(ir: &mut IR<'_>, builder: BuilderId, action: ActionId, ty: TypeId, bytes: &[u8]) -> ValueId {
    let literal = ir.create_literal(ty, bytes);
    let op = ir
        .append_operation(
            builder,
            action,
            "support",
            SmallVec::new(),
            &[ty],
            SmallVec::new(),
            SmallVec::from_slice(&[literal]),
            SmallVec::new(),
            SmallVec::new(),
            SmallVec::new(),
            false,
        )
        .expect("Const is unchecked");
    ir.operation(op).results()[0]
}

/// Emits a zero-result `Call` Operation against `callee`, passing `args` as operands.
pub fn emit_call(ir: &mut IR<'_>, builder: BuilderId, action: ActionId, args: &[ValueId]) -> OperationId {
    ir.append_operation(
        builder,
        action,
        "support",
        SmallVec::from_slice(args),
        &[],
        SmallVec::new(),
        SmallVec::new(),
        SmallVec::new(),
        SmallVec::new(),
        SmallVec::new(),
        false,
    )
    .expect("Call is unchecked")
}

/// Mirrors the supplied arithmetic extension's `Add` rule (`spec.md` §4.4):
/// if either operand is `Address`, the other must be `Int64` (word-sized on
/// a 64-bit host); otherwise both operands' types must match exactly.
pub struct ArithmeticAddChecker {
    pub bad_input_types: CompilerReturnCode,
}

impl Default for ArithmeticAddChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl ArithmeticAddChecker {
    #[must_use]
    pub fn new() -> Self {
        Self { bad_input_types: CompilerReturnCode::register("CompileFail_BadInputTypes_Add") }
    }
}

impl Checker for ArithmeticAddChecker {
    fn check(&self, proposal: &ProposedOperation<'_>) -> Result<bool, CompilationException> {
        let [left, right] = proposal.operand_types else {
            return Ok(false);
        };
        let ok = if *left == "Address" {
            *right == "Int64"
        } else if *right == "Address" {
            *left == "Int64"
        } else {
            left == right
        };
        if ok {
            return Ok(true);
        }
        let mut diagnostic = DiagnosticBuilder::new();
        diagnostic.line("Add: operand types are not compatible").row("left", left, "matching right, or Address/Int64").row(
            "right",
            right,
            "matching left, or Address/Int64",
        );
        Err(CompilationException::new(self.bad_input_types, diagnostic.build()))
    }
}

pub fn install_add_checker(ir: &mut IR<'_>, action: ActionId) -> CompilerReturnCode {
    let checker = ArithmeticAddChecker::new();
    let code = checker.bad_input_types;
    ir.register_checker(action, Box::new(checker));
    code
}

/// Emits an `Add` Operation, letting the registered checker chain validate it.
pub fn emit_add(
    ir: &mut IR<'_>,
    builder: BuilderId,
    action: ActionId,
    result_ty: TypeId,
    left: ValueId,
    right: ValueId,
) -> Result<ValueId, CompilationException> {
    let op = ir.append_operation(
        builder,
        action,
        "support",
        SmallVec::from_slice(&[left, right]),
        &[result_ty],
        SmallVec::new(),
        SmallVec::new(),
        SmallVec::new(),
        SmallVec::new(),
        SmallVec::new(),
        false,
    )?;
    Ok(ir.operation(op).results()[0])
}
