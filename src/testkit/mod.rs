//! Test doubles for the collaborators around the orchestrators.
//!
//! - **[`ScriptedEngine`]**: a [`RuleEngine`](crate::engine::RuleEngine) that
//!   returns fixed matches, counts its calls and can be held mid-check, made
//!   to fail or made to panic
//! - **[`RecordingPresenter`]**: a [`ResultPresenter`](crate::presenter::ResultPresenter)
//!   that keeps everything it was shown
//! - **[`ScriptedConfigurationUi`]**: a configuration session with a fixed
//!   result that can also be held open
//! - **[`Gate`]**: holds a gated double mid-call until released
//! - **Fixtures**: sample text and a ready-made match report
//!
//! # Quick Start
//!
//! ```rust
//! use proofcheck::config::SharedConfig;
//! use proofcheck::document::StaticTextSource;
//! use proofcheck::language::DeclaredLanguageResolver;
//! use proofcheck::orchestrator::{CheckOrchestrator, CheckStatus};
//! use proofcheck::testkit::{RecordingPresenter, ScriptedEngine};
//! use proofcheck::ui::ui_channel;
//! use std::sync::Arc;
//!
//! let engine = ScriptedEngine::new();
//! let (sender, ui) = ui_channel();
//! let orchestrator = CheckOrchestrator::new(Arc::new(engine.clone()), SharedConfig::default(), sender);
//!
//! let status = orchestrator.run_check(
//!     &StaticTextSource::new("doc", "This is a test."),
//!     &DeclaredLanguageResolver::new(None),
//! );
//!
//! let mut presenter = RecordingPresenter::default();
//! ui.run_pending(&mut presenter);
//! assert_eq!(status, CheckStatus::NoIssues);
//! assert_eq!(engine.calls(), 1);
//! assert_eq!(presenter.infos(), vec!["No errors or warnings found (document language: English)"]);
//! ```

mod configuration_ui;
mod engine;
mod fixtures;
mod gate;
mod presenter;

pub use configuration_ui::ScriptedConfigurationUi;
pub use engine::ScriptedEngine;
pub use fixtures::{sample_report, SAMPLE_TEXT};
pub use gate::Gate;
pub use presenter::{Presented, RecordingPresenter};
