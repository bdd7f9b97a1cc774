//! Hand-off of results to the thread that owns the presenter.
//!
//! Orchestrators never call a [`ResultPresenter`] themselves. They post a
//! [`Presentation`] through a [`UiSender`]; the host drains the matching
//! [`UiLoop`] on its interactive thread. This is the single "post to UI"
//! primitive of the crate.

use crate::presenter::{MatchReport, ResultPresenter};
use crossbeam::channel::{self, Receiver, Sender};
use std::cell::Cell;
use std::time::Duration;

/// Something the user should see.
#[derive(Debug, Clone)]
pub enum Presentation {
    Info(String),
    Error(String),
    Matches(Box<MatchReport>),
}

impl Presentation {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Deliver to `presenter`.
    pub fn present(self, presenter: &mut dyn ResultPresenter) {
        match self {
            Self::Info(message) => presenter.show_info(&message),
            Self::Error(message) => presenter.show_error(&message),
            Self::Matches(report) => presenter.show_matches(*report),
        }
    }
}

/// Posting side, cloned into every orchestrator.
#[derive(Debug, Clone)]
pub struct UiSender {
    tx: Sender<Presentation>,
}

impl UiSender {
    /// Post a presentation. Returns `false` if the UI loop is gone, in which
    /// case the presentation is dropped.
    pub fn post(&self, presentation: Presentation) -> bool {
        match self.tx.send(presentation) {
            Ok(()) => true,
            Err(channel::SendError(dropped)) => {
                tracing::warn!(?dropped, "UI loop closed; presentation dropped");
                false
            }
        }
    }

    pub fn info(&self, message: impl Into<String>) -> bool {
        self.post(Presentation::Info(message.into()))
    }

    pub fn error(&self, message: impl Into<String>) -> bool {
        self.post(Presentation::Error(message.into()))
    }

    pub fn matches(&self, report: MatchReport) -> bool {
        self.post(Presentation::Matches(Box::new(report)))
    }
}

/// Receiving side, owned by the interactive thread.
#[derive(Debug)]
pub struct UiLoop {
    rx: Receiver<Presentation>,
    presented: Cell<usize>,
    errors: Cell<usize>,
}

/// Create a connected sender/loop pair.
pub fn ui_channel() -> (UiSender, UiLoop) {
    let (tx, rx) = channel::unbounded();
    (
        UiSender { tx },
        UiLoop {
            rx,
            presented: Cell::new(0),
            errors: Cell::new(0),
        },
    )
}

impl UiLoop {
    /// Present everything already posted, without blocking.
    pub fn run_pending(&self, presenter: &mut dyn ResultPresenter) -> usize {
        let mut count = 0;
        while let Ok(presentation) = self.rx.try_recv() {
            self.deliver(presentation, presenter);
            count += 1;
        }
        count
    }

    /// Present until every [`UiSender`] has been dropped.
    pub fn run_until_closed(&self, presenter: &mut dyn ResultPresenter) -> usize {
        let mut count = 0;
        for presentation in self.rx.iter() {
            self.deliver(presentation, presenter);
            count += 1;
        }
        count
    }

    /// Wait up to `timeout` for one presentation and deliver it.
    pub fn run_next(&self, presenter: &mut dyn ResultPresenter, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(presentation) => {
                self.deliver(presentation, presenter);
                true
            }
            Err(_) => false,
        }
    }

    /// Take everything already posted without presenting it.
    pub fn drain(&self) -> Vec<Presentation> {
        self.rx.try_iter().collect()
    }

    /// Number of presentations delivered so far.
    pub fn presented(&self) -> usize {
        self.presented.get()
    }

    /// Number of error presentations delivered so far.
    pub fn errors_presented(&self) -> usize {
        self.errors.get()
    }

    fn deliver(&self, presentation: Presentation, presenter: &mut dyn ResultPresenter) {
        self.presented.set(self.presented.get() + 1);
        if presentation.is_error() {
            self.errors.set(self.errors.get() + 1);
        }
        presentation.present(presenter);
    }
}
