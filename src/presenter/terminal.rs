use super::{line_col, MatchReport, ResultPresenter};
use crate::engine::RuleMatch;
use crate::formatting::{FormattingConfig, Styler};
use std::fmt::Write as _;
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

/// Human-readable output: informational notices on stdout, errors on stderr,
/// matches as a list with a source excerpt and caret underline.
pub struct TerminalPresenter<W: Write = io::Stdout, E: Write = io::Stderr> {
    out: W,
    err: E,
    styler: Styler,
}

impl TerminalPresenter {
    pub fn new(formatting: FormattingConfig) -> Self {
        Self::with_writers(io::stdout(), io::stderr(), Styler::new(formatting))
    }
}

impl<W: Write, E: Write> TerminalPresenter<W, E> {
    pub fn with_writers(out: W, err: E, styler: Styler) -> Self {
        Self { out, err, styler }
    }

    pub fn into_writers(self) -> (W, E) {
        (self.out, self.err)
    }
}

impl<W: Write, E: Write> ResultPresenter for TerminalPresenter<W, E> {
    fn show_info(&mut self, message: &str) {
        let line = self.styler.info(message);
        write_or_warn(&mut self.out, &line);
    }

    fn show_error(&mut self, message: &str) {
        let line = self.styler.error(message);
        write_or_warn(&mut self.err, &line);
    }

    fn show_matches(&mut self, report: MatchReport) {
        let rendered = format_report(&report, &self.styler);
        write_or_warn(&mut self.out, rendered.trim_end());
    }
}

fn write_or_warn(target: &mut impl Write, text: &str) {
    if let Err(e) = writeln!(target, "{text}").and_then(|()| target.flush()) {
        tracing::warn!("Failed to write to terminal: {}", e);
    }
}

/// Render a match report as plain or colored text.
pub fn format_report(report: &MatchReport, styler: &Styler) -> String {
    let mut out = String::new();
    let count = report.matches.len();
    let noun = if count == 1 { "issue" } else { "issues" };
    let scope = if report.is_selection() {
        format!("in selected text (language: {})", report.language)
    } else {
        format!("(document language: {})", report.language)
    };
    let _ = writeln!(
        out,
        "{}: {count} {noun} {scope}",
        styler.header(&report.document.to_string()),
    );

    for m in &report.matches {
        out.push('\n');
        format_match(&mut out, &report.text, m, styler);
    }

    let active = report.rules.active().count();
    let _ = writeln!(
        out,
        "\n{}",
        styler.dim(&format!(
            "{} of {} rules active for {}",
            active,
            report.rules.len(),
            report.rules.language
        ))
    );
    out
}

fn format_match(out: &mut String, text: &str, m: &RuleMatch, styler: &Styler) {
    let (line_no, column) = line_col(text, m.start);
    let _ = writeln!(
        out,
        "  {}  {}  {}",
        styler.bold(&format!("{line_no}:{column}")),
        styler.warning(&m.rule_id),
        m.message
    );

    let Some((line, caret_offset, caret_width)) = excerpt(text, m) else {
        return;
    };
    let gutter = line_no.to_string().len();
    let pad = " ".repeat(gutter);
    let mut underline = format!("{}{}", " ".repeat(caret_offset), "^".repeat(caret_width));
    if let Some(suggestion) = m.suggestions.first() {
        let _ = write!(underline, " suggestion: {:?}", suggestion);
    }

    let _ = writeln!(out, "  {pad} {}", styler.dim("|"));
    let _ = writeln!(out, "  {line_no} {} {line}", styler.dim("|"));
    let _ = writeln!(out, "  {pad} {} {}", styler.dim("|"), styler.error(&underline));
}

/// The line containing the match start, plus display offset and width of the
/// caret run. A match running past the end of its first line is cut there.
fn excerpt<'a>(text: &'a str, m: &RuleMatch) -> Option<(&'a str, usize, usize)> {
    let start = m.start.min(text.len());
    if !text.is_char_boundary(start) {
        return None;
    }
    let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[start..].find('\n').map_or(text.len(), |i| start + i);
    let end = m.end.clamp(start, line_end);
    let flagged = text.get(start..end)?;

    let line = &text[line_start..line_end];
    let caret_offset = text[line_start..start].width();
    let caret_width = flagged.width().max(1);
    Some((line, caret_offset, caret_width))
}
