//! Structured text logging for the compilation pipeline.
//!
//! Mirrors the teacher crate's `VmTracer` architecture: a trait with
//! default no-op methods so [`NoopLogger`] compiles away entirely via
//! monomorphization, plus a handful of concrete implementations
//! ([`StderrLogger`], [`RecordingLogger`]) that collect different kinds of
//! output. A `Compilation` is generic over `L: TextLogger`; production
//! callers pick [`NoopLogger`], diagnostic callers pick one of the others.
//!
//! `spec.md` §6 fixes the line shape core lines must have:
//! `<indent>[ <tag> <body> ]`, with a globally consistent indent. This
//! module owns indent tracking; `log_op`/`log_line` callers only supply the
//! tag and body for one line.

use std::fmt::Write as _;

/// Hook points a pass or the pipeline itself calls into while compiling.
///
/// All methods have default no-op bodies; implementations override only the
/// hooks they care about, exactly like `VmTracer` in the teacher crate.
pub trait TextLogger {
    /// Called once when a [`crate::compilation::Pass`] starts running.
    fn pass_start(&mut self, _name: &str) {}
    /// Called once when a pass finishes, with its outcome name.
    fn pass_end(&mut self, _name: &str, _outcome: &str) {}
    /// Called to emit one structured IR line: `[ <tag> <body> ]` at the
    /// logger's current indent.
    fn line(&mut self, _tag: &str, _body: &str) {}
    /// Increases the indent used by subsequent `line` calls (e.g. entering a
    /// bound child Builder's region).
    fn indent(&mut self) {}
    /// Decreases the indent used by subsequent `line` calls.
    fn dedent(&mut self) {}
}

/// Zero-cost logger: every method is a no-op and compiles away entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl TextLogger for NoopLogger {}

/// Human-readable logger that writes each line to stderr as it is produced.
#[derive(Debug, Default)]
pub struct StderrLogger {
    depth: usize,
}

impl StderrLogger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn prefix(&self) -> String {
        "  ".repeat(self.depth)
    }
}

impl TextLogger for StderrLogger {
    fn pass_start(&mut self, name: &str) {
        eprintln!("{}[ pass-start {name} ]", self.prefix());
    }

    fn pass_end(&mut self, name: &str, outcome: &str) {
        eprintln!("{}[ pass-end {name} {outcome} ]", self.prefix());
    }

    fn line(&mut self, tag: &str, body: &str) {
        eprintln!("{}[ {tag} {body} ]", self.prefix());
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Collects every emitted line into an in-memory buffer instead of printing it.
///
/// Used by tests that assert on the text-log format (`spec.md` §6 requires
/// the format be stable enough for test suites to assert against, modulo
/// whitespace).
#[derive(Debug, Default)]
pub struct RecordingLogger {
    depth: usize,
    buffer: String,
}

impl RecordingLogger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rendered(&self) -> &str {
        &self.buffer
    }
}

impl TextLogger for RecordingLogger {
    fn pass_start(&mut self, name: &str) {
        let _ = writeln!(self.buffer, "{}[ pass-start {name} ]", "  ".repeat(self.depth));
    }

    fn pass_end(&mut self, name: &str, outcome: &str) {
        let _ = writeln!(self.buffer, "{}[ pass-end {name} {outcome} ]", "  ".repeat(self.depth));
    }

    fn line(&mut self, tag: &str, body: &str) {
        let _ = writeln!(self.buffer, "{}[ {tag} {body} ]", "  ".repeat(self.depth));
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_logger_indents_nested_lines() {
        let mut logger = RecordingLogger::new();
        logger.line("Type", "i32");
        logger.indent();
        logger.line("Builder", "entry");
        logger.dedent();
        logger.line("Type", "i64");

        let rendered = logger.rendered();
        assert_eq!(rendered.lines().collect::<Vec<_>>(), vec![
            "[ Type i32 ]",
            "  [ Builder entry ]",
            "[ Type i64 ]",
        ]);
    }

    #[test]
    fn noop_logger_accepts_every_hook() {
        let mut logger = NoopLogger;
        logger.pass_start("strategyCodegen");
        logger.line("Type", "i32");
        logger.indent();
        logger.dedent();
        logger.pass_end("strategyCodegen", "CompileSuccessful");
    }
}
