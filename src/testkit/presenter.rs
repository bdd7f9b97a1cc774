use crate::presenter::{MatchReport, ResultPresenter};

/// One call made on a [`RecordingPresenter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Presented {
    Info(String),
    Error(String),
    Matches(MatchReport),
}

/// Presenter that records everything it is shown, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    events: Vec<Presented>,
}

impl RecordingPresenter {
    pub fn events(&self) -> &[Presented] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn infos(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Presented::Info(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Presented::Error(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn reports(&self) -> Vec<&MatchReport> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Presented::Matches(report) => Some(report),
                _ => None,
            })
            .collect()
    }
}

impl ResultPresenter for RecordingPresenter {
    fn show_info(&mut self, message: &str) {
        self.events.push(Presented::Info(message.to_string()));
    }

    fn show_error(&mut self, message: &str) {
        self.events.push(Presented::Error(message.to_string()));
    }

    fn show_matches(&mut self, report: MatchReport) {
        self.events.push(Presented::Matches(report));
    }
}
