//! Rendering of check results.
//!
//! A [`ResultPresenter`] is the host's UI. It is only ever called on the
//! thread that drains the [`UiLoop`](crate::ui::UiLoop), never from a
//! background task.

mod json;
mod terminal;

pub use json::JsonPresenter;
pub use terminal::TerminalPresenter;

use crate::config::Configuration;
use crate::document::{DocumentRef, SelectionRange};
use crate::engine::{RuleMatch, RuleSet};
use crate::language::Language;
use serde::Serialize;

/// Everything the results view needs to show a non-empty check.
///
/// The text is the snapshot the engine checked; match offsets point into it.
/// `selection` is present only when a selection was checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub document: DocumentRef,
    pub language: Language,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionRange>,
    pub matches: Vec<RuleMatch>,
    pub rules: RuleSet,
    pub config: Configuration,
}

impl MatchReport {
    pub fn is_selection(&self) -> bool {
        self.selection.is_some()
    }
}

pub trait ResultPresenter {
    fn show_info(&mut self, message: &str);
    fn show_error(&mut self, message: &str);
    fn show_matches(&mut self, report: MatchReport);
}

impl<P: ResultPresenter + ?Sized> ResultPresenter for &mut P {
    fn show_info(&mut self, message: &str) {
        (**self).show_info(message)
    }

    fn show_error(&mut self, message: &str) {
        (**self).show_error(message)
    }

    fn show_matches(&mut self, report: MatchReport) {
        (**self).show_matches(report)
    }
}

impl<P: ResultPresenter + ?Sized> ResultPresenter for Box<P> {
    fn show_info(&mut self, message: &str) {
        (**self).show_info(message)
    }

    fn show_error(&mut self, message: &str) {
        (**self).show_error(message)
    }

    fn show_matches(&mut self, report: MatchReport) {
        (**self).show_matches(report)
    }
}

/// 1-based line and column (in characters) of byte `offset` in `text`.
pub fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let offset = floor_char_boundary(text, offset);
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = text[line_start..offset].chars().count() + 1;
    (line, column)
}

fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
