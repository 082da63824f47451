#![doc = include_str!("../../../README.md")]
#![expect(clippy::too_many_arguments, reason = "construction APIs mirror the Operation shapes they build")]

mod arena;
mod builder;
mod clone_map;
mod compilation;
mod compiler;
mod config;
mod context;
mod control;
mod dictionary;
mod error;
mod extension;
mod ids;
mod ir;
mod kind;
mod literal;
mod log;
mod operation;
mod scope;
mod symbol;
mod type_replacer;
mod types;
mod value;
mod vm_state;

pub use crate::arena::{Arena, ArenaStr};
pub use crate::builder::{BoundBuilderGuard, Boundness, Builder, BuilderParent};
pub use crate::clone_map::IRCloneMap;
pub use crate::compilation::{CompileUnit, CompiledBody, Compilation, NativeEntry, Pass, Strategy, StrategyId};
pub use crate::compiler::Compiler;
pub use crate::config::{BudgetTracker, CompilationBudget, CompilationConfig, CompilerConfig, CompilerConfigBuilder};
pub use crate::context::Context;
pub use crate::control::{
    ForLoopUpHandle, IfThenElseHandle, SwitchHandle, build_for_loop_up, build_if_then_else, build_switch,
};
pub use crate::dictionary::ScopedDict;
pub use crate::error::{
    CompilationException, CompilerReturnCode, DiagnosticBuilder, ExtensionLoadError, SourceLocation,
};
pub use crate::extension::{Extension, ExtensionDependency, ExtensionRegistry};
pub use crate::ids::{BuilderId, ContextId, LiteralId, OperationId, ScopeId, SymbolId, TypeId, ValueId};
pub use crate::ir::IR;
pub use crate::kind::{KindId, is_kind, kind_name, register_root_kind, register_subkind};
pub use crate::literal::{Literal, LiteralDictionary};
pub use crate::log::{NoopLogger, RecordingLogger, StderrLogger, TextLogger};
pub use crate::operation::{ActionId, Checker, CheckerChain, Operation, OperationShape, ProposedOperation};
pub use crate::scope::Scope;
pub use crate::symbol::{Symbol, SymbolClass, SymbolDictionary};
pub use crate::type_replacer::{renumber_parameters, ExpandHook, ExplodedValues, TypeReplacer};
pub use crate::types::{
    function_structural_name, pointer_structural_name, FieldSlot, PrimitiveKind, Type, TypeDictionary, TypeShape,
};
pub use crate::value::Value;
pub use crate::vm_state::{OperandSlot, VirtualMachineOperandStack, VirtualMachineRegister};
