//! Progress feedback while a check runs.
//!
//! The check orchestrator shows a spinner between starting the background
//! task and receiving its result, using the `indicatif` library.
//!
//! # Progress Behavior
//!
//! - **Quiet Mode**: No progress output (respects `PROOFCHECK_QUIET` env var and `--quiet` flag)
//! - **Non-TTY**: Spinners are hidden in CI and piped output
//!
//! # Examples
//!
//! ```rust,no_run
//! use proofcheck::progress::{ProgressConfig, ProgressManager};
//!
//! let manager = ProgressManager::new(ProgressConfig::from_env(false, 0));
//! let spinner = manager.create_spinner("Checking notes.txt (English)");
//! // Wait for the check...
//! spinner.finish_and_clear();
//! ```

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

pub const QUIET_ENV_VAR: &str = "PROOFCHECK_QUIET";
pub const TEMPLATE_SPINNER: &str = "{spinner} {msg} ({elapsed})";

/// Configuration for progress display behavior
#[derive(Debug, Clone, Default)]
pub struct ProgressConfig {
    /// Whether to suppress all progress output
    pub quiet_mode: bool,
    /// Verbosity level (0 = basic, 1 = detailed, 2 = very detailed)
    pub verbosity: u8,
}

impl ProgressConfig {
    /// Create progress configuration from environment and CLI arguments
    pub fn from_env(quiet: bool, verbosity: u8) -> Self {
        let env_quiet = std::env::var(QUIET_ENV_VAR).is_ok();
        Self {
            quiet_mode: quiet || env_quiet,
            verbosity,
        }
    }

    /// Never show anything. Used by tests and embedding hosts.
    pub fn silent() -> Self {
        Self {
            quiet_mode: true,
            verbosity: 0,
        }
    }

    /// Determine if progress should be displayed
    pub fn should_show_progress(&self) -> bool {
        if self.quiet_mode {
            return false;
        }

        use std::io::IsTerminal;
        std::io::stderr().is_terminal()
    }
}

/// Hands out spinners that share one terminal region.
#[derive(Clone)]
pub struct ProgressManager {
    multi: MultiProgress,
    config: ProgressConfig,
}

impl ProgressManager {
    pub fn new(config: ProgressConfig) -> Self {
        Self {
            multi: MultiProgress::new(),
            config,
        }
    }

    /// Create a spinner with the given message
    ///
    /// Returns a hidden progress bar if progress should not be shown
    pub fn create_spinner(&self, msg: &str) -> ProgressBar {
        if !self.config.should_show_progress() {
            return ProgressBar::hidden();
        }

        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template(TEMPLATE_SPINNER)
                .expect("Invalid spinner template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn verbosity(&self) -> u8 {
        self.config.verbosity
    }

    /// Clear all spinners before printing final output.
    pub fn clear(&self) -> std::io::Result<()> {
        self.multi.clear()
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(ProgressConfig::silent())
    }
}
