//! Operations: the fundamental IR node, plus the checker chain that
//! validates them at construction time (`spec.md` §4.4).
//!
//! Operations are data, not an inheritance hierarchy: one `Operation`
//! struct holds everything every concrete operation needs (action id,
//! operand/result/type/literal/symbol/builder arrays, owning extension,
//! parent Builder, optional source location). The "shape classes" the
//! source names (`OperationR1V2`, `OperationB1R0V2`, ...) become
//! [`OperationShape`]: a small arity descriptor used only to validate that
//! an extension built its arrays to the right lengths, not a family of Rust
//! types — exactly as `spec.md` §4.4 itself frames it.

use std::sync::{Mutex, OnceLock};

use smallvec::SmallVec;

use crate::clone_map::IRCloneMap;
use crate::error::{CompilationException, CompilerReturnCode};
use crate::error::SourceLocation;
use crate::ids::{BuilderId, LiteralId, OperationId, SymbolId, TypeId, ValueId};

/// Dense integer naming a specific Operation shape registered by an Extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(u32);

struct ActionRegistry {
    names: Vec<&'static str>,
}

fn action_registry() -> &'static Mutex<ActionRegistry> {
    static REGISTRY: OnceLock<Mutex<ActionRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(ActionRegistry { names: Vec::new() }))
}

impl ActionId {
    /// Registers a brand-new action id under `name`. Called once per
    /// distinct Operation shape by the owning Extension's `load`.
    #[must_use]
    pub fn register(name: &'static str) -> Self {
        let mut reg = action_registry().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let id = Self(u32::try_from(reg.names.len()).expect("too many registered actions"));
        reg.names.push(name);
        id
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        action_registry().lock().unwrap_or_else(std::sync::PoisonError::into_inner).names[self.0 as usize]
    }
}

/// Arity descriptor for an Operation shape: how many operands/results/etc. it carries.
///
/// Used only to validate construction; the `Operation` itself always stores
/// its categories as plain `SmallVec`s regardless of shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationShape {
    pub operands: usize,
    pub results: usize,
    pub type_operands: usize,
    pub literal_operands: usize,
    pub symbol_operands: usize,
    pub bound_builders: usize,
}

/// The fundamental IR node.
#[derive(Clone)]
pub struct Operation {
    id: OperationId,
    action: ActionId,
    owning_extension: &'static str,
    parent_builder: BuilderId,
    location: Option<SourceLocation>,
    operands: SmallVec<[ValueId; 2]>,
    results: SmallVec<[ValueId; 1]>,
    type_operands: SmallVec<[TypeId; 1]>,
    literal_operands: SmallVec<[LiteralId; 1]>,
    symbol_operands: SmallVec<[SymbolId; 1]>,
    /// Bound child Builders this Operation owns (e.g. a loop body); target
    /// Builders (Goto/IfCmp*) are *not* listed here since the Operation does
    /// not own them (`spec.md` §4.5).
    bound_builders: SmallVec<[BuilderId; 2]>,
    /// Unowned target Builders this Operation may transfer control to.
    targets: SmallVec<[BuilderId; 2]>,
    /// For a `Switch`: `case_falls_through[i]` is true when case `i` transfers
    /// control to case `i + 1` rather than exiting the switch (`spec.md`
    /// §4.6). Empty for every Operation that isn't a `Switch`.
    case_falls_through: SmallVec<[bool; 2]>,
}

impl Operation {
    #[must_use]
    pub(crate) fn new(
        id: OperationId,
        action: ActionId,
        owning_extension: &'static str,
        parent_builder: BuilderId,
        operands: SmallVec<[ValueId; 2]>,
        results: SmallVec<[ValueId; 1]>,
        type_operands: SmallVec<[TypeId; 1]>,
        literal_operands: SmallVec<[LiteralId; 1]>,
        symbol_operands: SmallVec<[SymbolId; 1]>,
        bound_builders: SmallVec<[BuilderId; 2]>,
        targets: SmallVec<[BuilderId; 2]>,
    ) -> Self {
        Self {
            id,
            action,
            owning_extension,
            parent_builder,
            location: None,
            operands,
            results,
            type_operands,
            literal_operands,
            symbol_operands,
            bound_builders,
            targets,
            case_falls_through: SmallVec::new(),
        }
    }

    pub(crate) fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Records `Switch`'s per-case `falls_through` flags, positionally
    /// matched to `bound_builders[..case_count]`.
    pub(crate) fn set_case_falls_through(&mut self, falls_through: SmallVec<[bool; 2]>) {
        self.case_falls_through = falls_through;
    }

    #[must_use]
    pub fn id(&self) -> OperationId {
        self.id
    }

    #[must_use]
    pub fn action(&self) -> ActionId {
        self.action
    }

    #[must_use]
    pub fn owning_extension(&self) -> &'static str {
        self.owning_extension
    }

    #[must_use]
    pub fn parent_builder(&self) -> BuilderId {
        self.parent_builder
    }

    #[must_use]
    pub fn location(&self) -> Option<SourceLocation> {
        self.location
    }

    #[must_use]
    pub fn operands(&self) -> &[ValueId] {
        &self.operands
    }

    #[must_use]
    pub fn results(&self) -> &[ValueId] {
        &self.results
    }

    #[must_use]
    pub fn type_operands(&self) -> &[TypeId] {
        &self.type_operands
    }

    #[must_use]
    pub fn literal_operands(&self) -> &[LiteralId] {
        &self.literal_operands
    }

    #[must_use]
    pub fn symbol_operands(&self) -> &[SymbolId] {
        &self.symbol_operands
    }

    #[must_use]
    pub fn bound_builders(&self) -> &[BuilderId] {
        &self.bound_builders
    }

    #[must_use]
    pub fn targets(&self) -> &[BuilderId] {
        &self.targets
    }

    /// A `Switch`'s per-case `falls_through` flags, in case order. Empty for
    /// every Operation that isn't a `Switch` (`spec.md` §4.6).
    #[must_use]
    pub fn case_falls_through(&self) -> &[bool] {
        &self.case_falls_through
    }

    /// Renders this Operation's one-line textual log form:
    /// `<action-name> <operand-list> <result-list>` (`spec.md` §6).
    #[must_use]
    pub fn log_line(&self) -> String {
        let operands = self.operands.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
        let results = self.results.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
        format!("{} {operands} -> {results}", self.action.name())
    }

    pub(crate) fn remap(&mut self, map: &IRCloneMap) {
        self.id = map.map_operation(self.id);
        self.parent_builder = map.map_builder(self.parent_builder);
        for operand in &mut self.operands {
            *operand = map.map_value(*operand);
        }
        for result in &mut self.results {
            *result = map.map_value(*result);
        }
        for type_operand in &mut self.type_operands {
            *type_operand = map.map_type(*type_operand);
        }
        for literal_operand in &mut self.literal_operands {
            *literal_operand = map.map_literal(*literal_operand);
        }
        for symbol_operand in &mut self.symbol_operands {
            *symbol_operand = map.map_symbol(*symbol_operand);
        }
        for bound in &mut self.bound_builders {
            *bound = map.map_builder(*bound);
        }
        for target in &mut self.targets {
            *target = map.map_builder(*target);
        }
    }
}

/// What a checker is given to validate: every category an Operation carries,
/// before the Operation itself is constructed.
pub struct ProposedOperation<'a> {
    pub action: ActionId,
    pub operand_types: &'a [&'a str],
    pub operands: &'a [ValueId],
}

/// Validates a proposed Operation's inputs at construction time.
///
/// Checkers are registered LIFO and tried in that order; the first to
/// return `Ok(true)` ("I validated this, stop") wins. Returning `Ok(false)`
/// means "not my concern, try the next checker"; returning `Err` rejects
/// construction outright with a structured diagnostic.
pub trait Checker: Send + Sync {
    fn check(&self, proposal: &ProposedOperation<'_>) -> Result<bool, CompilationException>;
}

/// LIFO chain of checkers registered for one `ActionId`.
///
/// Extensions that specialize or override validation of an operation they
/// do not own push their checker after the owner's, so it runs first.
#[derive(Default)]
pub struct CheckerChain {
    checkers: Vec<Box<dyn Checker>>,
}

impl CheckerChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `checker` to run before every checker already in the chain.
    pub fn push(&mut self, checker: Box<dyn Checker>) {
        self.checkers.push(checker);
    }

    /// Runs the chain LIFO. Returns `Ok(())` if some checker accepted the
    /// proposal; `Err` with the generic "no checker accepted" code if the
    /// chain is exhausted without acceptance, or the first checker-raised
    /// error otherwise.
    pub fn validate(&self, proposal: &ProposedOperation<'_>) -> Result<(), CompilationException> {
        for checker in self.checkers.iter().rev() {
            if checker.check(proposal)? {
                return Ok(());
            }
        }
        Err(CompilationException::new(
            CompilerReturnCode::FAILED,
            format!("no checker accepted action '{}'", proposal.action.name()),
        ))
    }
}
