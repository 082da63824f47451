//! `Compiler`: the process-lifetime root owning registered Extensions and
//! Strategies (`spec.md` §4.1, §6).

use crate::compilation::{Strategy, StrategyId};
use crate::config::CompilerConfig;
use crate::error::ExtensionLoadError;
use crate::extension::{Extension, ExtensionRegistry};

/// The compiler root. One `Compiler` typically lives for a whole process:
/// Extensions are loaded once, Strategies are registered once, and each
/// individual compile request spins up its own short-lived
/// [`crate::compilation::Compilation`] against an `Arena` it owns.
///
/// Extensions here are loaded as in-process trait objects rather than
/// dynamic libraries resolved by path — the safe-Rust substitute for the
/// source's `loadExtension(name)` shared-library lookup.
pub struct Compiler {
    name: String,
    config: CompilerConfig,
    extensions: ExtensionRegistry,
    strategies: Vec<Strategy>,
}

impl Compiler {
    #[must_use]
    pub fn new(name: impl Into<String>, config: CompilerConfig) -> Self {
        Self { name: name.into(), config, extensions: ExtensionRegistry::new(), strategies: Vec::new() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    #[must_use]
    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    #[must_use]
    pub fn extensions_mut(&mut self) -> &mut ExtensionRegistry {
        &mut self.extensions
    }

    pub fn load_extension(&mut self, extension: &dyn Extension) -> Result<(), ExtensionLoadError> {
        self.extensions.load(extension)
    }

    /// Registers a new, initially pass-less `Strategy` under `name` and
    /// returns a handle the caller pushes Passes onto.
    pub fn register_strategy(&mut self, name: &'static str) -> &mut Strategy {
        let id = StrategyId::from_index(self.strategies.len());
        self.strategies.push(Strategy::new(id, name));
        self.strategies.last_mut().expect("just pushed")
    }

    #[must_use]
    pub fn strategy(&self, name: &str) -> Option<&Strategy> {
        self.strategies.iter().find(|s| s.name() == name)
    }

    #[must_use]
    pub fn strategy_mut(&mut self, name: &str) -> Option<&mut Strategy> {
        self.strategies.iter_mut().find(|s| s.name() == name)
    }
}
