use super::{MatchReport, ResultPresenter};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum JsonEvent<'a> {
    Info { message: &'a str },
    Error { message: &'a str },
    Matches(&'a MatchReport),
}

/// Writes one JSON document per line for each presentation.
pub struct JsonPresenter<W: Write = io::Stdout> {
    out: W,
}

impl JsonPresenter {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for JsonPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> JsonPresenter<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &JsonEvent<'_>) {
        if let Err(e) = self.write_event(event) {
            tracing::warn!("Failed to write JSON output: {}", e);
        }
    }

    fn write_event(&mut self, event: &JsonEvent<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> ResultPresenter for JsonPresenter<W> {
    fn show_info(&mut self, message: &str) {
        self.emit(&JsonEvent::Info { message });
    }

    fn show_error(&mut self, message: &str) {
        self.emit(&JsonEvent::Error { message });
    }

    fn show_matches(&mut self, report: MatchReport) {
        self.emit(&JsonEvent::Matches(&report));
    }
}
