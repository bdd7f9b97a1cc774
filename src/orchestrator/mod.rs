//! The two user commands, run off the interactive thread.
//!
//! Both orchestrators follow the same shape: acquire their in-flight slot,
//! gather inputs synchronously, hand the slow part to the
//! [`AsyncTaskRunner`](crate::task::AsyncTaskRunner), wait for it without
//! busy-waiting, then post the result through the
//! [`UiSender`](crate::ui::UiSender).

mod check;
mod configure;

pub use check::{CheckOrchestrator, CheckStart, CheckStatus, PendingCheck};
pub use configure::{ConfigEdits, ConfigurationUi, ConfigureOrchestrator, ConfigureStatus};

use crate::document::SelectionRange;
use crate::engine::{RuleMatch, RuleSet};
use crate::errors::CheckError;
use crate::error_log::ErrorLog;
use crate::language::Language;
use crate::task::TaskError;
use crate::ui::UiSender;

/// What the background check produces.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub matches: Vec<RuleMatch>,
    pub source_text: String,
    pub selection: Option<SelectionRange>,
    pub language: Language,
    pub rules: RuleSet,
}

/// Turn a task failure into a [`CheckError`], keeping classified errors that
/// the work itself raised.
pub(crate) fn classify(err: TaskError) -> CheckError {
    match err {
        TaskError::Failed(inner) => match inner.downcast::<CheckError>() {
            Ok(classified) => classified,
            Err(inner) => CheckError::from(TaskError::Failed(inner)),
        },
        other => CheckError::from(other),
    }
}

/// Route a failure to the user, and to the error log if it was unexpected.
pub(crate) fn report_failure(err: &CheckError, ui: &UiSender, error_log: &ErrorLog) {
    if err.is_unexpected() {
        error_log.record_check_error(err);
    } else {
        tracing::warn!(code = %err.code(), "{}", err);
    }
    ui.error(err.user_message());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_classify_keeps_check_errors_raised_by_work() {
        let raised = anyhow::Error::new(CheckError::config("unknown rule 'NOPE'"));
        let err = classify(TaskError::Failed(raised));
        assert_eq!(err.code(), ErrorCode::CONFIG);
        assert!(!err.is_unexpected());
    }

    #[test]
    fn test_classify_wraps_other_failures() {
        let err = classify(TaskError::Failed(anyhow::anyhow!("dictionary missing")));
        assert_eq!(err.code(), ErrorCode::ENGINE_FAILURE);

        let err = classify(TaskError::Panicked("boom".into()));
        assert_eq!(err.code(), ErrorCode::ENGINE_FAILURE);
        assert!(err.user_message().contains("boom"));
    }
}
