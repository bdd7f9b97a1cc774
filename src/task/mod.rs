//! Background execution for slow collaborator work.
//!
//! - [`AsyncTaskRunner`] runs one unit of work on a dedicated thread and hands
//!   back a [`TaskHandle`] whose result is delivered through a one-shot
//!   channel. Callers either block on it ([`TaskHandle::wait`],
//!   [`TaskHandle::wait_timeout`]) or poll it from their own event loop
//!   ([`TaskHandle::poll`]).
//! - [`InFlightSlot`] is the single-slot guard that keeps at most one task of
//!   a command kind running at any instant.

mod runner;
mod slot;

pub(crate) use runner::panic_message;
pub use runner::{AsyncTaskRunner, TaskError, TaskHandle, TaskState};
pub use slot::{InFlightSlot, SlotGuard};
