//! Custom panic hook for structured crash reports.
//!
//! A crash report names the command phase and document the panicking thread
//! was working on. Panics raised inside contained background work (see
//! [`contain_panics`](super::contain_panics)) are caught and reported as
//! task failures, so the hook only logs them.

use super::context::{get_check_counts, get_current_context, panics_contained, CheckContext};
use std::panic::PanicHookInfo;
use tracing::Span;

const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Inner width of the report box
const WIDTH: usize = 78;

/// Install the custom panic hook.
///
/// Call early in `main()`, after tracing is initialised.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        if panics_contained() {
            log_contained_panic(info);
        } else {
            let (started, finished) = get_check_counts();
            let report = CrashReport::from_panic(info, get_current_context(), started, finished);
            eprintln!();
            eprint!("{}", report.render());
            if std::env::var("RUST_BACKTRACE").is_ok() {
                eprintln!();
                eprintln!("{}", std::backtrace::Backtrace::capture());
            }
        }
    }));
}

fn log_contained_panic(info: &PanicHookInfo<'_>) {
    tracing::error!(
        panic = %payload_message(info.payload()),
        location = %location_of(info),
        "background task panicked"
    );
}

/// Everything printed in a crash report.
#[derive(Debug, Clone)]
struct CrashReport {
    message: String,
    location: Option<String>,
    context: CheckContext,
    span: Option<&'static str>,
    started: usize,
    finished: usize,
}

impl CrashReport {
    fn from_panic(
        info: &PanicHookInfo<'_>,
        context: CheckContext,
        started: usize,
        finished: usize,
    ) -> Self {
        Self {
            message: payload_message(info.payload()),
            location: info.location().map(|_| location_of(info)),
            context,
            span: Span::current().metadata().map(|meta| meta.name()),
            started,
            finished,
        }
    }

    fn render(&self) -> String {
        let mut out = String::new();
        let rule = "═".repeat(WIDTH);
        out.push_str(&format!("╔{rule}╗\n"));
        out.push_str(&centered("PROOFCHECK CRASH REPORT"));
        out.push_str(&format!("╠{rule}╣\n"));
        out.push_str(&row("Version", VERSION));
        out.push_str(&row("Platform", std::env::consts::OS));
        out.push_str(&row(
            "Time",
            &chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ));
        out.push_str(&format!("╠{rule}╣\n"));
        out.push_str(&row("PANIC", &self.message));
        if let Some(location) = &self.location {
            out.push_str(&row("Location", location));
        }
        out.push_str(&format!("╠{rule}╣\n"));
        out.push_str(&line("OPERATION CONTEXT:"));
        let phase = self.context.phase.map_or_else(
            || "(not set - crash occurred outside a command)".to_string(),
            |phase| phase.to_string(),
        );
        out.push_str(&row("  Phase", &phase));
        if let Some(span) = self.span {
            out.push_str(&row("  Span", span));
        }
        if let Some(document) = &self.context.document {
            out.push_str(&row("  Document", document));
        }
        out.push_str(&row(
            "  Checks",
            &format!("{} started, {} finished", self.started, self.finished),
        ));
        out.push_str(&format!("╠{rule}╣\n"));
        out.push_str(&line("Run with RUST_BACKTRACE=1 for stack trace"));
        out.push_str(&format!("╚{rule}╝\n"));
        out
    }
}

fn line(text: &str) -> String {
    let body = truncate(text, WIDTH - 2);
    let pad = WIDTH - 2 - body.chars().count();
    format!("║  {body}{}║\n", " ".repeat(pad))
}

fn row(label: &str, value: &str) -> String {
    line(&format!("{label}: {value}"))
}

fn centered(text: &str) -> String {
    let left = (WIDTH - text.chars().count()) / 2;
    let right = WIDTH - text.chars().count() - left;
    format!("║{}{text}{}║\n", " ".repeat(left), " ".repeat(right))
}

fn location_of(info: &PanicHookInfo<'_>) -> String {
    info.location()
        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
        .unwrap_or_default()
}

fn payload_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
