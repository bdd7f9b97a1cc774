use crossbeam::channel::{self, Receiver, Sender};
use std::time::Duration;

/// Scripted side of a [`Gate`].
#[derive(Debug, Clone)]
pub(crate) struct Latch {
    entered: Sender<()>,
    release: Receiver<()>,
}

impl Latch {
    /// Announce the call and block until the gate lets it through.
    pub(crate) fn hold(&self) {
        let _ = self.entered.send(());
        let _ = self.release.recv();
    }
}

/// Holds a scripted collaborator inside its call until released.
///
/// Dropping the gate releases every waiting and future call.
#[derive(Debug)]
pub struct Gate {
    entered: Receiver<()>,
    release: Sender<()>,
}

impl Gate {
    pub(crate) fn new() -> (Latch, Gate) {
        let (entered_tx, entered_rx) = channel::unbounded();
        let (release_tx, release_rx) = channel::unbounded();
        (
            Latch {
                entered: entered_tx,
                release: release_rx,
            },
            Gate {
                entered: entered_rx,
                release: release_tx,
            },
        )
    }

    /// Wait until a call has entered the collaborator.
    pub fn wait_entered(&self, timeout: Duration) -> bool {
        self.entered.recv_timeout(timeout).is_ok()
    }

    /// Let one waiting (or the next) call continue.
    pub fn release(&self) {
        let _ = self.release.send(());
    }
}
