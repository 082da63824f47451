//! Compilation pipeline: `Strategy`, `Pass`, `Compilation`, and `CompileUnit`
//! (`spec.md` §4.10).

use ahash::AHashMap;

use crate::arena::Arena;
use crate::config::{BudgetTracker, CompilationConfig};
use crate::error::{CompilationException, CompilerReturnCode};
use crate::ir::IR;
use crate::log::{NoopLogger, TextLogger};

/// Dense id for a registered `Strategy`, scoped to one `Compiler` (not one
/// `IR` — strategies outlive any single compilation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrategyId(u32);

impl StrategyId {
    #[must_use]
    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).expect("too many registered strategies"))
    }
}

/// One step of a `Strategy`: a named transformation or analysis over a
/// `Compilation`'s `IR`.
pub trait Pass: Send + Sync {
    fn name(&self) -> &'static str;

    fn perform(&self, compilation: &mut Compilation<'_>) -> Result<(), CompilerReturnCode>;
}

/// A named, ordered list of Passes.
pub struct Strategy {
    id: StrategyId,
    name: &'static str,
    passes: Vec<Box<dyn Pass>>,
}

impl Strategy {
    #[must_use]
    pub(crate) fn new(id: StrategyId, name: &'static str) -> Self {
        Self { id, name, passes: Vec::new() }
    }

    #[must_use]
    pub fn id(&self) -> StrategyId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn push_pass(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    /// Runs every Pass in order, logging entry/exit through the
    /// `Compilation`'s logger. Stops at the first failing Pass.
    pub fn run(&self, compilation: &mut Compilation<'_>) -> Result<(), CompilerReturnCode> {
        for pass in &self.passes {
            compilation.logger_mut().pass_start(pass.name());
            let result = pass.perform(compilation);
            let outcome = match &result {
                Ok(()) => CompilerReturnCode::SUCCESS.name(),
                Err(code) => code.name(),
            };
            compilation.logger_mut().pass_end(pass.name(), &outcome);
            result?;
        }
        Ok(())
    }
}

/// One contiguous range of emitted native code, naming the Symbol (usually a
/// `Function`) it implements.
#[derive(Debug, Clone, Copy)]
pub struct NativeEntry {
    pub offset: usize,
    pub length: usize,
}

/// The output of running a `Strategy` to completion: emitted bytes plus
/// where each compiled function landed within them.
#[derive(Debug, Clone, Default)]
pub struct CompiledBody {
    pub code: Vec<u8>,
    pub entries: Vec<NativeEntry>,
}

impl CompiledBody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Caches a `CompiledBody` per `Strategy`, so recompiling the same unit under
/// a `Strategy` it already ran is a cache hit (`spec.md` §4.10).
#[derive(Default)]
pub struct CompileUnit {
    cache: AHashMap<StrategyId, CompiledBody>,
}

impl CompileUnit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn cached(&self, strategy: StrategyId) -> Option<&CompiledBody> {
        self.cache.get(&strategy)
    }

    pub fn insert(&mut self, strategy: StrategyId, body: CompiledBody) {
        self.cache.insert(strategy, body);
    }

    /// Runs `strategy` against `compilation` unless a cached body already
    /// exists for it, inserting and returning the fresh result otherwise.
    pub fn get_or_compile(
        &mut self,
        strategy: &Strategy,
        compilation: &mut Compilation<'_>,
        emit: impl FnOnce(&mut Compilation<'_>) -> CompiledBody,
    ) -> Result<&CompiledBody, CompilerReturnCode> {
        if !self.cache.contains_key(&strategy.id()) {
            strategy.run(compilation)?;
            let body = emit(compilation);
            self.cache.insert(strategy.id(), body);
        }
        Ok(&self.cache[&strategy.id()])
    }
}

/// One compilation's worth of mutable state: its `IR`, logger, budget
/// tracker, and resolved configuration.
pub struct Compilation<'a> {
    ir: IR<'a>,
    logger: Box<dyn TextLogger>,
    config: CompilationConfig,
    budget: BudgetTracker,
}

impl<'a> Compilation<'a> {
    #[must_use]
    pub fn new(arena: &'a Arena, config: CompilationConfig) -> Self {
        Self { ir: IR::new(arena), logger: Box::new(NoopLogger), config, budget: BudgetTracker::default() }
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Box<dyn TextLogger>) -> Self {
        self.logger = logger;
        self
    }

    #[must_use]
    pub fn ir(&self) -> &IR<'a> {
        &self.ir
    }

    #[must_use]
    pub fn ir_mut(&mut self) -> &mut IR<'a> {
        &mut self.ir
    }

    #[must_use]
    pub fn logger(&self) -> &dyn TextLogger {
        self.logger.as_ref()
    }

    #[must_use]
    pub fn logger_mut(&mut self) -> &mut dyn TextLogger {
        self.logger.as_mut()
    }

    #[must_use]
    pub fn config(&self) -> &CompilationConfig {
        &self.config
    }

    /// Charges one Operation against the compilation budget, failing once
    /// the configured ceiling is exceeded (`spec.md` §6's `CompilationBudget`).
    pub fn record_operation(&mut self) -> Result<(), CompilationException> {
        self.budget.record_operation(&self.config.budget)
    }

    /// Charges one Builder against the compilation budget.
    pub fn record_builder(&mut self) -> Result<(), CompilationException> {
        self.budget.record_builder(&self.config.budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilationBudget;

    struct NoopPass;
    impl Pass for NoopPass {
        fn name(&self) -> &'static str {
            "forgeir.test.noop"
        }
        fn perform(&self, _compilation: &mut Compilation<'_>) -> Result<(), CompilerReturnCode> {
            Ok(())
        }
    }

    struct FailingPass;
    impl Pass for FailingPass {
        fn name(&self) -> &'static str {
            "forgeir.test.failing"
        }
        fn perform(&self, _compilation: &mut Compilation<'_>) -> Result<(), CompilerReturnCode> {
            Err(CompilerReturnCode::FAILED)
        }
    }

    #[test]
    fn a_strategy_runs_its_passes_in_order_and_stops_on_failure() {
        let arena = Arena::new();
        let config = CompilationConfig { target_triple: "x86_64-test".to_string(), budget: CompilationBudget::unbounded() };
        let mut compilation = Compilation::new(&arena, config);

        let mut strategy = Strategy::new(StrategyId::from_index(0), "test-strategy");
        strategy.push_pass(Box::new(NoopPass));
        assert!(strategy.run(&mut compilation).is_ok());

        let mut failing_strategy = Strategy::new(StrategyId::from_index(1), "failing-strategy");
        failing_strategy.push_pass(Box::new(NoopPass));
        failing_strategy.push_pass(Box::new(FailingPass));
        assert!(failing_strategy.run(&mut compilation).is_err());
    }

    #[test]
    fn compile_unit_caches_by_strategy() {
        let arena = Arena::new();
        let config = CompilationConfig { target_triple: "x86_64-test".to_string(), budget: CompilationBudget::unbounded() };
        let mut compilation = Compilation::new(&arena, config);
        let strategy = Strategy::new(StrategyId::from_index(0), "cached-strategy");

        let mut unit = CompileUnit::new();
        let mut emit_calls = 0;
        {
            let body = unit.get_or_compile(&strategy, &mut compilation, |_| {
                CompiledBody { code: vec![0x90], entries: vec![NativeEntry { offset: 0, length: 1 }] }
            });
            assert!(body.is_ok());
        }
        emit_calls += 1;
        let cached = unit.get_or_compile(&strategy, &mut compilation, |_| {
            panic!("should not recompile a cached strategy");
        });
        assert!(cached.is_ok());
        assert_eq!(emit_calls, 1);
    }
}
