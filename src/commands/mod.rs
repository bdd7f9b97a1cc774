//! CLI command implementations.
//!
//! Available commands:
//! - **check**: Check a document (or a range of its lines) in the background
//! - **configure**: Apply configuration edits for a language and save them
//! - **trigger**: Send a raw host event to the dispatcher
//! - **rules**: List the built-in rules for a language
//! - **init**: Write a commented `.proofcheck.toml`
//!
//! `check`, `configure` and `trigger` all go through a [`Session`], the same
//! path an editor host uses.

pub mod check;
pub mod configure;
pub mod init;
pub mod rules;
pub mod session;
pub mod trigger;

pub use check::handle_check;
pub use configure::handle_configure;
pub use init::init_config;
pub use rules::handle_rules;
pub use session::{presenter_for, GlobalOptions, Session, SessionOutcome, SessionRequest};
pub use trigger::handle_trigger;
