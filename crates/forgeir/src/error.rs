//! Error taxonomy: `CompilerReturnCode` registry, construction-time
//! `CompilationException`, and pass-stage errors.
//!
//! Like the teacher crate's `ReplError`/`ResourceError`/`ExcType`, every
//! error type here is a hand-written enum or struct with manual `Display`
//! and `std::error::Error` impls — this workspace does not depend on
//! `thiserror` or `anyhow` anywhere, and this crate keeps that convention.

use std::fmt;
use std::sync::{Mutex, OnceLock};

/// An opaque, process-wide-unique return code identifying a compiler outcome.
///
/// Core codes occupy `0..1000`; extensions register additional codes
/// starting at `1000` so that an extension's codes can never collide with
/// a core one without a runtime check on every registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompilerReturnCode(u32);

const EXTENSION_CODE_BASE: u32 = 1000;

struct CodeRegistry {
    names: Vec<String>,
    next_extension_code: u32,
}

impl CodeRegistry {
    fn new() -> Self {
        let mut names = Vec::new();
        names.push("CompileSuccessful".to_string());
        names.push("CompileNotStarted".to_string());
        names.push("CompileFailed".to_string());
        Self { names, next_extension_code: EXTENSION_CODE_BASE }
    }
}

fn registry() -> &'static Mutex<CodeRegistry> {
    static REGISTRY: OnceLock<Mutex<CodeRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(CodeRegistry::new()))
}

impl CompilerReturnCode {
    /// `CompileSuccessful`, reserved code 0.
    pub const SUCCESS: Self = Self(0);
    /// `CompileNotStarted`, reserved code 1.
    pub const NOT_STARTED: Self = Self(1);
    /// `CompileFailed`, reserved code 2 — the generic pass-failure code used
    /// when a pass fails without registering a more specific code.
    pub const FAILED: Self = Self(2);

    /// Registers a new extension-defined return code under `name`.
    ///
    /// Called once per distinct code by `Extension::load`, the same way an
    /// `Extension` registers new `ActionId`s.
    pub fn register(name: impl Into<String>) -> Self {
        let mut reg = registry().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let code = reg.next_extension_code;
        reg.next_extension_code += 1;
        reg.names.push(name.into());
        Self(code)
    }

    /// True for [`Self::SUCCESS`], false for every other code.
    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    /// The human-readable name this code was registered under.
    #[must_use]
    pub fn name(self) -> String {
        let reg = registry().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let idx = if self.0 < EXTENSION_CODE_BASE { self.0 as usize } else { (self.0 - EXTENSION_CODE_BASE) as usize + 3 };
        reg.names.get(idx).cloned().unwrap_or_else(|| format!("UnknownReturnCode({})", self.0))
    }
}

impl fmt::Display for CompilerReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Helper for rendering the multi-line "input / actual type / expected type"
/// diagnostics that checkers raise (`spec.md` §4.4, scenario A in §8).
#[derive(Debug, Default, Clone)]
pub struct DiagnosticBuilder {
    lines: Vec<String>,
}

impl DiagnosticBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one row describing a single operand/result that failed validation.
    pub fn row(&mut self, label: &str, actual_type: &str, expected: &str) -> &mut Self {
        self.lines.push(format!("{label}: type={actual_type}, expected={expected}"));
        self
    }

    /// Records a free-form line (e.g. a summary sentence at the top).
    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(text.into());
        self
    }

    #[must_use]
    pub fn build(&self) -> String {
        self.lines.join("\n")
    }
}

/// A source location hint attached to an Operation or exception, for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

/// Raised when an Operation or Builder is constructed in violation of its
/// extension's validation rules, or when a core construction invariant
/// (double-binding a Builder, duplicate Switch case literal, ...) is violated.
///
/// Not recovered inside the core; propagated to the client exactly as
/// `spec.md` §7.1 specifies.
#[derive(Debug, Clone)]
pub struct CompilationException {
    pub code: CompilerReturnCode,
    pub diagnostic: String,
    pub location: Option<SourceLocation>,
}

impl CompilationException {
    #[must_use]
    pub fn new(code: CompilerReturnCode, diagnostic: impl Into<String>) -> Self {
        Self { code, diagnostic: diagnostic.into(), location: None }
    }

    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for CompilationException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.diagnostic)
    }
}

impl std::error::Error for CompilationException {}

/// Errors an [`crate::extension::Extension`] can raise while being loaded
/// (e.g. an unsatisfied dependency version range).
#[derive(Debug, Clone)]
pub enum ExtensionLoadError {
    /// `dependency` advertises a version `found` that does not satisfy `required`.
    UnsatisfiedDependency { dependency: &'static str, required: String, found: String },
    /// An extension with this name is already loaded on this `Compiler`.
    AlreadyLoaded { name: &'static str },
}

impl fmt::Display for ExtensionLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsatisfiedDependency { dependency, required, found } => write!(
                f,
                "extension dependency '{dependency}' requires {required}, but {found} is loaded"
            ),
            Self::AlreadyLoaded { name } => write!(f, "extension '{name}' is already loaded"),
        }
    }
}

impl std::error::Error for ExtensionLoadError {}
