//! Text acquisition: what gets checked and where it came from.
//!
//! A [`TextSource`] produces one immutable [`CheckRequest`] per trigger:
//! the current selection if there is one, the whole document otherwise.
//! Text is always read completely; there is no size ceiling.

use crate::errors::CheckError;
use anyhow::Context;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Identity of the document being checked, passed through to the presenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum DocumentRef {
    File(PathBuf),
    Stdin,
    Memory(String),
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stdin => write!(f, "<stdin>"),
            Self::Memory(name) => write!(f, "{}", name),
        }
    }
}

/// Byte range of the user's selection within the document.
///
/// This is the cursor reference a results view uses to highlight matches;
/// the orchestrator only carries it along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionRange {
    pub start: usize,
    pub end: usize,
}

impl SelectionRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Text snapshot taken at trigger time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    text: String,
    is_selection: bool,
    selection: Option<SelectionRange>,
}

impl CheckRequest {
    /// Request for the whole document.
    pub fn document(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_selection: false,
            selection: None,
        }
    }

    /// Request for a selection at `range`.
    pub fn selection(text: impl Into<String>, range: SelectionRange) -> Self {
        Self {
            text: text.into(),
            is_selection: true,
            selection: Some(range),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_selection(&self) -> bool {
        self.is_selection
    }

    pub fn selection_range(&self) -> Option<SelectionRange> {
        self.selection
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The same request with line endings normalised.
    pub fn into_normalized(self) -> Self {
        if !self.text.contains('\r') {
            return self;
        }
        let text = normalize_line_endings(&self.text).into_owned();
        Self { text, ..self }
    }

    /// Split into (text, selection range).
    pub fn into_parts(self) -> (String, Option<SelectionRange>) {
        (self.text, self.selection)
    }
}

/// Convert `\r\n` and lone `\r` to `\n`.
///
/// Match offsets are computed against the normalised text, so hosts that hand
/// out platform line endings still get offsets that line up with what the
/// engine saw. Idempotent; borrows when there is nothing to change.
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Supplies the text to check.
pub trait TextSource {
    fn document(&self) -> DocumentRef;

    /// The current selection, or the whole document when nothing is selected.
    fn selection_or_document_text(&self) -> Result<CheckRequest, CheckError>;
}

impl<S: TextSource + ?Sized> TextSource for &S {
    fn document(&self) -> DocumentRef {
        (**self).document()
    }

    fn selection_or_document_text(&self) -> Result<CheckRequest, CheckError> {
        (**self).selection_or_document_text()
    }
}

/// 1-based inclusive line range, parsed from `A-B` or `A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub first: usize,
    pub last: usize,
}

impl FromStr for LineRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid line number '{}'", part.trim()))
        };
        let (first, last) = match s.split_once('-') {
            Some((first, last)) => (parse(first)?, parse(last)?),
            None => {
                let line = parse(s)?;
                (line, line)
            }
        };
        if first == 0 || last < first {
            return Err(format!("invalid line range '{s}'"));
        }
        Ok(Self { first, last })
    }
}

/// Byte range covering `lines` in `text`, without the final line break.
fn line_range_offsets(text: &str, lines: LineRange) -> Option<SelectionRange> {
    let mut start = None;
    let mut offset = 0;
    for (index, line) in text.split_inclusive('\n').enumerate() {
        let number = index + 1;
        if number == lines.first {
            start = Some(offset);
        }
        if number == lines.last {
            let body = line.trim_end_matches('\n').trim_end_matches('\r');
            return start.map(|start| SelectionRange::new(start, offset + body.len()));
        }
        offset += line.len();
    }
    // range runs past the end of the document
    start.map(|start| SelectionRange::new(start, text.len()))
}

/// Decode raw bytes as a plain-text document.
fn decode_text(bytes: Vec<u8>) -> Result<String, CheckError> {
    if bytes.contains(&0) {
        return Err(CheckError::unsupported_document("binary content"));
    }
    String::from_utf8(bytes).map_err(|_| CheckError::unsupported_document("not valid UTF-8 text"))
}

fn request_for(text: String, lines: Option<LineRange>) -> CheckRequest {
    let range = lines.and_then(|lines| line_range_offsets(&text, lines));
    match range {
        Some(range) if !text[range.start..range.end].is_empty() => {
            CheckRequest::selection(&text[range.start..range.end], range)
        }
        // empty selection means "check everything"
        _ => CheckRequest::document(text),
    }
}

/// Text file on disk, optionally with a line selection.
#[derive(Debug, Clone)]
pub struct FileTextSource {
    path: PathBuf,
    lines: Option<LineRange>,
}

impl FileTextSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lines: None,
        }
    }

    pub fn with_lines(mut self, lines: Option<LineRange>) -> Self {
        self.lines = lines;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextSource for FileTextSource {
    fn document(&self) -> DocumentRef {
        DocumentRef::File(self.path.clone())
    }

    fn selection_or_document_text(&self) -> Result<CheckRequest, CheckError> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        Ok(request_for(decode_text(bytes)?, self.lines))
    }
}

/// Standard input, read to the end on first use.
#[derive(Debug, Clone, Default)]
pub struct StdinTextSource {
    lines: Option<LineRange>,
}

impl StdinTextSource {
    pub fn new(lines: Option<LineRange>) -> Self {
        Self { lines }
    }
}

impl TextSource for StdinTextSource {
    fn document(&self) -> DocumentRef {
        DocumentRef::Stdin
    }

    fn selection_or_document_text(&self) -> Result<CheckRequest, CheckError> {
        let mut bytes = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("failed to read standard input")?;
        Ok(request_for(decode_text(bytes)?, self.lines))
    }
}

/// In-memory document, for embedding hosts and tests.
#[derive(Debug, Clone)]
pub struct StaticTextSource {
    name: String,
    content: Result<String, String>,
    selection: Option<SelectionRange>,
}

impl StaticTextSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Ok(text.into()),
            selection: None,
        }
    }

    /// Select a byte range of the text.
    pub fn with_selection(mut self, range: SelectionRange) -> Self {
        self.selection = Some(range);
        self
    }

    /// A document that is not a text document.
    pub fn unsupported(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Err(reason.into()),
            selection: None,
        }
    }
}

impl TextSource for StaticTextSource {
    fn document(&self) -> DocumentRef {
        DocumentRef::Memory(self.name.clone())
    }

    fn selection_or_document_text(&self) -> Result<CheckRequest, CheckError> {
        let text = self
            .content
            .as_ref()
            .map_err(|reason| CheckError::unsupported_document(reason.clone()))?;
        let selected = self
            .selection
            .and_then(|range| text.get(range.start..range.end).map(|s| (range, s)))
            .filter(|(_, s)| !s.is_empty());
        Ok(match selected {
            Some((range, s)) => CheckRequest::selection(s, range),
            None => CheckRequest::document(text.clone()),
        })
    }
}
