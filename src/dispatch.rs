//! Named-event entry point, the way a host forwards menu and toolbar
//! commands.
//!
//! Faults never cross this boundary: unknown events are ignored, and a panic
//! while handling a known one is contained, logged and presented as an
//! error.

use crate::document::TextSource;
use crate::error_log::ErrorLog;
use crate::language::LanguageResolver;
use crate::observability::contain_panics;
use crate::orchestrator::{CheckOrchestrator, CheckStatus, ConfigureOrchestrator, ConfigureStatus};
use crate::task::panic_message;
use crate::ui::UiSender;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use tracing::{debug, warn};

/// A command the host can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Check the selection or the whole document.
    Execute,
    /// Open the configuration session.
    Configure,
}

impl Command {
    pub const ALL: [Command; 2] = [Command::Execute, Command::Configure];

    pub fn event_name(self) -> &'static str {
        match self {
            Self::Execute => "execute",
            Self::Configure => "configure",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|command| command.event_name() == s)
            .ok_or_else(|| format!("unknown event '{s}'"))
    }
}

/// What [`Dispatcher::trigger`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Checked(CheckStatus),
    Configured(ConfigureStatus),
    /// The event name is not known; nothing happened.
    Ignored,
    /// Handling panicked; the fault was contained and presented.
    Faulted,
}

/// Routes host events to the orchestrators.
pub struct Dispatcher {
    check: CheckOrchestrator,
    configure: ConfigureOrchestrator,
    source: Box<dyn TextSource>,
    resolver: Box<dyn LanguageResolver>,
    ui: UiSender,
    error_log: ErrorLog,
}

impl Dispatcher {
    pub fn new(
        check: CheckOrchestrator,
        configure: ConfigureOrchestrator,
        source: Box<dyn TextSource>,
        resolver: Box<dyn LanguageResolver>,
        ui: UiSender,
    ) -> Self {
        Self {
            check,
            configure,
            source,
            resolver,
            ui,
            error_log: ErrorLog::disabled(),
        }
    }

    pub fn with_error_log(mut self, error_log: ErrorLog) -> Self {
        self.error_log = error_log;
        self
    }

    pub fn check_orchestrator(&self) -> &CheckOrchestrator {
        &self.check
    }

    pub fn configure_orchestrator(&self) -> &ConfigureOrchestrator {
        &self.configure
    }

    /// Handle a named event.
    pub fn trigger(&self, event: &str) -> DispatchOutcome {
        let command = match event.parse::<Command>() {
            Ok(command) => command,
            Err(reason) => {
                warn!("Ignoring {}", reason);
                return DispatchOutcome::Ignored;
            }
        };
        debug!(%command, "Dispatching");

        let _contained = contain_panics();
        match panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(command))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                let err = anyhow::anyhow!("{} command panicked: {}", command, message);
                self.error_log.record(&err);
                self.ui.error(format!("An error has occurred:\n{err}"));
                DispatchOutcome::Faulted
            }
        }
    }

    fn dispatch(&self, command: Command) -> DispatchOutcome {
        match command {
            Command::Execute => {
                DispatchOutcome::Checked(self.check.run_check(&*self.source, &*self.resolver))
            }
            Command::Configure => {
                DispatchOutcome::Configured(self.configure.run_configure_for(&*self.resolver))
            }
        }
    }
}
