//! Error types used by the slotvisor runtime.
//!
//! Every lifecycle operation (`init`, `run`, `stop`, `handle_error`) returns
//! `Result<(), Error>`: absence of an error is `Ok(())`, never an empty node.
//!
//! [`Error`] is a recursive tree node:
//! - [`ErrorKind`] a category tag (spawn, init, run, ...);
//! - [`Severity`] an ordered level;
//! - a human-readable message;
//! - an ordered list of sub-errors.
//!
//! Fan-outs collect their children's failures and compose them with [`aggregate`]
//! into one [`ErrorKind::ErrorList`] node, so a single returned value tells which
//! fraction of a fan-out failed and why.
//!
//! ## Rendering
//! `Display` prints the whole tree, two spaces of indentation per level:
//! ```text
//! ErrorList: worker-pool ingest: run (2 errors)
//!   RunError: upstream closed
//!   RuntimeError: worker should be initialized; got: nil (slot 3)
//! ```

use std::fmt;

/// Category tag of an [`Error`] node.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Composite node aggregating sibling failures from a fan-out.
    ErrorList,
    /// A factory could not build a worker or receptor.
    Spawn,
    /// Initialization of a unit of work failed.
    Init,
    /// Execution of a unit of work failed.
    Run,
    /// Stopping a unit of work failed.
    Stop,
    /// The error handler itself failed (or re-raised).
    HandleError,
    /// Internal invariant violation (empty slot reached by run, panicked unit, ...).
    Runtime,
    /// Graceful shutdown did not complete within its grace period.
    Shutdown,
}

impl ErrorKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use slotvisor::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::ErrorList.as_label(), "error_list");
    /// assert_eq!(ErrorKind::Runtime.as_label(), "runtime_error");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ErrorKind::ErrorList => "error_list",
            ErrorKind::Spawn => "spawn_error",
            ErrorKind::Init => "init_error",
            ErrorKind::Run => "run_error",
            ErrorKind::Stop => "stop_error",
            ErrorKind::HandleError => "handle_error_error",
            ErrorKind::Runtime => "runtime_error",
            ErrorKind::Shutdown => "shutdown_error",
        }
    }

    /// Returns the tag printed in rendered error trees.
    pub fn as_tag(&self) -> &'static str {
        match self {
            ErrorKind::ErrorList => "ErrorList",
            ErrorKind::Spawn => "SpawnError",
            ErrorKind::Init => "InitError",
            ErrorKind::Run => "RunError",
            ErrorKind::Stop => "StopError",
            ErrorKind::HandleError => "HandleErrorError",
            ErrorKind::Runtime => "RuntimeError",
            ErrorKind::Shutdown => "ShutdownError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Severity level of an [`Error`], lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    #[default]
    Error,
    Fatal,
    Panic,
}

/// Recursive error node returned by every lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    severity: Severity,
    message: String,
    sub_errors: Vec<Error>,
}

impl Error {
    /// Creates a leaf error with default severity ([`Severity::Error`]).
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::default(),
            message: message.into(),
            sub_errors: Vec::new(),
        }
    }

    pub fn spawn(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Spawn, message)
    }

    pub fn init(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Init, message)
    }

    pub fn run(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Run, message)
    }

    pub fn stop(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Stop, message)
    }

    /// Internal invariant violation.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime, message)
    }

    /// Returns the node with the given severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Returns the node with `subs` appended to its sub-errors.
    pub fn with_sub_errors(mut self, subs: impl IntoIterator<Item = Error>) -> Self {
        self.sub_errors.extend(subs);
        self
    }

    /// Wraps `cause` as the single sub-error of this node.
    pub fn caused_by(self, cause: Error) -> Self {
        self.with_sub_errors([cause])
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn sub_errors(&self) -> &[Error] {
        &self.sub_errors
    }

    /// True for [`ErrorKind::ErrorList`] nodes.
    pub fn is_composite(&self) -> bool {
        self.kind == ErrorKind::ErrorList
    }

    /// Counts non-composite nodes reachable through composite ones.
    ///
    /// A leaf with its own causes counts once: causes of a leaf describe it, they
    /// are not separate failures.
    pub fn count_failures(&self) -> usize {
        if self.is_composite() {
            self.sub_errors.iter().map(Error::count_failures).sum()
        } else {
            1
        }
    }

    /// One-line summary without sub-errors (`Tag: message`).
    pub fn headline(&self) -> String {
        if self.message.is_empty() {
            self.kind.as_tag().to_string()
        } else {
            format!("{}: {}", self.kind, self.message)
        }
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:width$}{}", "", self.headline(), width = depth * 2)?;
        for sub in &self.sub_errors {
            writeln!(f)?;
            sub.write_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

impl std::error::Error for Error {}

/// Composes errors collected from a fan-out.
///
/// Returns `Ok(())` iff `errors` is empty; otherwise exactly one
/// [`ErrorKind::ErrorList`] node wrapping every error in the given order
/// (completion order for fan-outs). The composite takes the highest child severity.
///
/// # Example
/// ```
/// use slotvisor::{aggregate, Error};
///
/// assert!(aggregate("pool: run", Vec::new()).is_ok());
///
/// let err = aggregate("pool: run", vec![Error::run("a"), Error::run("b")]).unwrap_err();
/// assert!(err.is_composite());
/// assert_eq!(err.sub_errors().len(), 2);
/// ```
pub fn aggregate(context: impl Into<String>, errors: Vec<Error>) -> Result<(), Error> {
    if errors.is_empty() {
        return Ok(());
    }
    let severity = errors
        .iter()
        .map(Error::severity)
        .max()
        .unwrap_or_default();
    let message = format!(
        "{} ({} error{})",
        context.into(),
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    );
    Err(Error::new(ErrorKind::ErrorList, message)
        .with_severity(severity)
        .with_sub_errors(errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_empty_is_ok() {
        assert_eq!(aggregate("noop", vec![]), Ok(()));
    }

    #[test]
    fn aggregate_keeps_order_and_takes_max_severity() {
        let err = aggregate(
            "fan-out",
            vec![
                Error::init("first").with_severity(Severity::Warn),
                Error::run("second").with_severity(Severity::Fatal),
                Error::stop("third"),
            ],
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ErrorList);
        assert_eq!(err.severity(), Severity::Fatal);
        let messages: Vec<&str> = err.sub_errors().iter().map(Error::message).collect();
        assert_eq!(messages, ["first", "second", "third"]);
    }

    #[test]
    fn renders_indented_tree() {
        let inner = aggregate("pool p: init", vec![Error::spawn("boom")]).unwrap_err();
        let outer = aggregate("orchestrator o: init", vec![inner]).unwrap_err();

        let rendered = outer.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ErrorList: orchestrator o: init (1 error)");
        assert_eq!(lines[1], "  ErrorList: pool p: init (1 error)");
        assert_eq!(lines[2], "    SpawnError: boom");
    }

    #[test]
    fn count_failures_skips_composites_and_causes() {
        let leaf = Error::spawn("factory").caused_by(Error::run("connect refused"));
        let nested = aggregate("inner", vec![leaf, Error::init("x")]).unwrap_err();
        let top = aggregate("outer", vec![nested, Error::stop("y")]).unwrap_err();
        assert_eq!(top.count_failures(), 3);
    }

    #[test]
    fn headline_without_message_is_tag() {
        assert_eq!(Error::new(ErrorKind::Run, "").headline(), "RunError");
    }
}
