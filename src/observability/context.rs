//! Thread-local context tracking for crash reports.
//!
//! Records which phase of a command the current thread is in and which
//! document it is working on, plus global counters of checks started and
//! finished. The panic hook reads all of it.
//!
//! ## Thread Safety
//!
//! - Thread-local context: each thread has its own context (via `thread_local!`)
//! - Global counters: atomics, updated from any thread
//! - Context guards use RAII for automatic cleanup on drop

use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicUsize, Ordering};

static CHECKS_STARTED: AtomicUsize = AtomicUsize::new(0);
static CHECKS_FINISHED: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static CURRENT_CONTEXT: RefCell<CheckContext> = const { RefCell::new(CheckContext::new()) };
    static PANICS_CONTAINED: Cell<bool> = const { Cell::new(false) };
}

/// Snapshot of what the current thread was doing.
#[derive(Debug, Clone, Default)]
pub struct CheckContext {
    pub phase: Option<CheckPhase>,
    /// Display name of the document being checked
    pub document: Option<String>,
}

impl CheckContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: None,
            document: None,
        }
    }
}

/// Phases of the check and configure commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckPhase {
    /// Reading the selection or document text
    ReadingText,
    /// Resolving and validating the document language
    ResolvingLanguage,
    /// Running the rule engine
    Checking,
    /// Handing the result to the presenter
    Presenting,
    /// Driving the configuration session
    Configuring,
}

impl std::fmt::Display for CheckPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadingText => write!(f, "reading_text"),
            Self::ResolvingLanguage => write!(f, "resolving_language"),
            Self::Checking => write!(f, "checking"),
            Self::Presenting => write!(f, "presenting"),
            Self::Configuring => write!(f, "configuring"),
        }
    }
}

/// RAII guard restoring the previous context on drop.
pub struct ContextGuard {
    previous: CheckContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = self.previous.clone();
        });
    }
}

/// Set the current phase until the returned guard drops.
#[must_use]
pub fn set_phase(phase: CheckPhase) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().phase = Some(phase);
        ContextGuard { previous }
    })
}

/// Set the current document until the returned guard drops.
#[must_use]
pub fn set_document(name: impl Into<String>) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().document = Some(name.into());
        ContextGuard { previous }
    })
}

#[must_use]
pub fn get_current_context() -> CheckContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

pub fn record_check_started() {
    CHECKS_STARTED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_check_finished() {
    CHECKS_FINISHED.fetch_add(1, Ordering::Relaxed);
}

/// (started, finished) check counts for this process.
#[must_use]
pub fn get_check_counts() -> (usize, usize) {
    (
        CHECKS_STARTED.load(Ordering::Relaxed),
        CHECKS_FINISHED.load(Ordering::Relaxed),
    )
}

/// Guard marking panics on this thread as contained by a `catch_unwind`.
pub struct ContainmentGuard {
    previous: bool,
}

impl Drop for ContainmentGuard {
    fn drop(&mut self) {
        PANICS_CONTAINED.with(|flag| flag.set(self.previous));
    }
}

/// Mark panics raised on this thread as caught further up, so the panic hook
/// logs them instead of printing a crash report.
#[must_use]
pub fn contain_panics() -> ContainmentGuard {
    PANICS_CONTAINED.with(|flag| {
        let previous = flag.replace(true);
        ContainmentGuard { previous }
    })
}

#[must_use]
pub fn panics_contained() -> bool {
    PANICS_CONTAINED.with(Cell::get)
}

/// Reset the current thread's context to empty.
///
/// Useful for testing.
pub fn reset_context() {
    CURRENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = CheckContext::new();
    });
}
