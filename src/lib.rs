// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod engine;
pub mod error_log;
pub mod errors;
pub mod formatting;
pub mod language;
pub mod observability;
pub mod orchestrator;
pub mod presenter;
pub mod progress;
pub mod task;
pub mod testkit;
pub mod ui;

// Re-export commonly used types
pub use crate::config::{Configuration, SharedConfig};
pub use crate::dispatch::{Command, DispatchOutcome, Dispatcher};
pub use crate::document::{CheckRequest, DocumentRef, SelectionRange, TextSource};
pub use crate::engine::{PatternRuleEngine, RuleEngine, RuleMatch, RuleSet};
pub use crate::error_log::ErrorLog;
pub use crate::errors::{CheckError, ErrorCode};
pub use crate::language::{Language, LanguageResolver};
pub use crate::orchestrator::{
    CheckOrchestrator, CheckStatus, ConfigurationUi, ConfigureOrchestrator, ConfigureStatus,
};
pub use crate::presenter::{MatchReport, ResultPresenter};
pub use crate::task::{AsyncTaskRunner, TaskError, TaskHandle};
pub use crate::ui::{ui_channel, UiLoop, UiSender};
