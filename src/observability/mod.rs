//! Observability: tracing setup, crash reports and context tracking.
//!
//! ## Usage
//!
//! ```ignore
//! use proofcheck::observability::{init_tracing, install_panic_hook};
//!
//! fn main() {
//!     init_tracing(0);
//!     install_panic_hook();
//!     // ... dispatch commands
//! }
//! ```
//!
//! Track context while running a command:
//!
//! ```ignore
//! use proofcheck::observability::{set_phase, CheckPhase};
//!
//! let _phase = set_phase(CheckPhase::ReadingText);
//! let request = source.selection_or_document_text()?;
//! ```

pub mod context;
pub mod panic_hook;
pub mod tracing;

pub use context::{
    contain_panics, get_check_counts, get_current_context, panics_contained,
    record_check_finished, record_check_started, set_document, set_phase, CheckContext,
    CheckPhase, ContainmentGuard, ContextGuard,
};
pub use panic_hook::install_panic_hook;
pub use self::tracing::init_tracing;
