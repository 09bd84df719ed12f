//! Log entries and the text segmenter that wraps them into physical rows.
//!
//! A [`LogEntry`] is a flat run of [`Segment`]s: text runs interleaved with
//! style markers. A style marker replaces the active style for every text run
//! that follows it, including runs that end up on later rows after wrapping.
//! The segmenter turns one entry into [`WrappedLine`]s that each start with an
//! explicit style, so a row never depends on the row above it.

use std::rc::Rc;

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::error::ConsoleError;

/// One element of a [`LogEntry`] or [`WrappedLine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A run of text drawn with the active style.
    Text(String),
    /// Replace the active style for the runs that follow.
    Style(Style),
}

impl From<&str> for Segment {
    fn from(text: &str) -> Self {
        Segment::Text(text.to_owned())
    }
}

impl From<String> for Segment {
    fn from(text: String) -> Self {
        Segment::Text(text)
    }
}

impl From<Style> for Segment {
    fn from(style: Style) -> Self {
        Segment::Style(style)
    }
}

/// A single entry in the header, log, or footer region.
///
/// Entries are immutable once appended; the compositor only reads them.
///
/// # Example
///
/// ```
/// use ratatui::style::{Color, Style};
/// use snapconsole_core::segment::LogEntry;
///
/// let entry = LogEntry::new()
///     .text("status: ")
///     .styled(Style::default().fg(Color::Green), "ok");
/// assert_eq!(entry.segments().len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEntry {
    segments: Vec<Segment>,
}

impl LogEntry {
    /// Create an empty entry. It still occupies one (blank) row when drawn.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text run drawn with the currently active style.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.segments.push(Segment::Text(text.into()));
        self
    }

    /// Append a style marker.
    pub fn style(mut self, style: Style) -> Self {
        self.segments.push(Segment::Style(style));
        self
    }

    /// Append a style marker followed by a text run.
    pub fn styled(self, style: Style, text: impl Into<String>) -> Self {
        self.style(style).text(text)
    }

    /// The segments making up this entry, in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl From<&str> for LogEntry {
    fn from(text: &str) -> Self {
        LogEntry::new().text(text)
    }
}

impl From<String> for LogEntry {
    fn from(text: String) -> Self {
        LogEntry::new().text(text)
    }
}

impl From<Vec<Segment>> for LogEntry {
    fn from(segments: Vec<Segment>) -> Self {
        LogEntry { segments }
    }
}

/// One physical terminal row produced by wrapping a [`LogEntry`].
///
/// The first segment is always a [`Segment::Style`] holding the style that was
/// active where the row begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedLine {
    segments: Vec<Segment>,
}

impl WrappedLine {
    /// Build a row that starts with `start` followed by `segments`.
    pub fn new(start: Style, segments: Vec<Segment>) -> Self {
        let mut all = Vec::with_capacity(segments.len() + 1);
        all.push(Segment::Style(start));
        all.extend(segments);
        Self { segments: all }
    }

    /// An empty row in the default style, used for padding.
    pub fn blank() -> Self {
        Self::new(Style::default(), Vec::new())
    }

    /// The row's segments, starting with its explicit style.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The text runs of this row paired with the style each is drawn in.
    pub fn runs(&self) -> Vec<(Style, &str)> {
        let mut style = Style::default();
        let mut runs = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Style(s) => style = *s,
                Segment::Text(t) => runs.push((style, t.as_str())),
            }
        }
        runs
    }

    /// Rendered width in characters.
    pub fn width(&self) -> usize {
        self.runs().iter().map(|(_, t)| t.chars().count()).sum()
    }

    /// The row's text with styling stripped.
    pub fn plain_text(&self) -> String {
        self.runs().into_iter().map(|(_, t)| t).collect()
    }
}

impl From<&WrappedLine> for Line<'static> {
    fn from(line: &WrappedLine) -> Self {
        Line::from(
            line.runs()
                .into_iter()
                .map(|(style, text)| Span::styled(text.to_owned(), style))
                .collect::<Vec<_>>(),
        )
    }
}

/// A segmentation function: entry and column width to rows of segments.
///
/// The rows returned by a segmenter do not carry their start style yet;
/// [`wrap_entry`] adds it.
pub type Segmenter = Rc<dyn Fn(&LogEntry, usize) -> Result<Vec<Vec<Segment>>, ConsoleError>>;

/// The built-in segmenter, [`split_entry`], behind a [`Segmenter`] handle.
pub fn default_segmenter() -> Segmenter {
    Rc::new(split_entry)
}

#[derive(Debug)]
enum Token {
    Text(String),
    Style(Style),
    Break,
}

/// Wrap `entry` to rows of at most `width` characters.
///
/// Text runs are split on `\n`, stripped of control characters, and packed
/// greedily. A run that overflows the current row is sliced at exactly the
/// remaining room and continues on the next row. Style markers stay where
/// they were. Empty text runs are dropped from the result; style markers are
/// always kept so the style carried into the next row is correct.
///
/// Returns [`ConsoleError::InvalidLayout`] when `width` is zero.
pub fn split_entry(entry: &LogEntry, width: usize) -> Result<Vec<Vec<Segment>>, ConsoleError> {
    if width == 0 {
        return Err(ConsoleError::InvalidLayout { width });
    }

    let mut tokens = Vec::with_capacity(entry.segments().len());
    for segment in entry.segments() {
        match segment {
            Segment::Style(style) => tokens.push(Token::Style(*style)),
            Segment::Text(text) => {
                for (i, piece) in text.split('\n').enumerate() {
                    if i > 0 {
                        tokens.push(Token::Break);
                    }
                    tokens.push(Token::Text(printable(piece)));
                }
            }
        }
    }

    let mut packed = Vec::with_capacity(tokens.len());
    let mut column = 0;
    // A row that reached `width` only breaks once more text arrives, so an
    // entry of exactly `width` characters stays a single row.
    let mut row_full = false;
    for token in tokens {
        match token {
            Token::Style(style) => packed.push(Token::Style(style)),
            Token::Break => {
                packed.push(Token::Break);
                column = 0;
                row_full = false;
            }
            Token::Text(text) => {
                let chars: Vec<char> = text.chars().collect();
                if chars.is_empty() {
                    packed.push(Token::Text(text));
                    continue;
                }
                let mut start = 0;
                while start < chars.len() {
                    if row_full {
                        packed.push(Token::Break);
                        column = 0;
                        row_full = false;
                    }
                    let end = (start + width - column).min(chars.len());
                    packed.push(Token::Text(chars[start..end].iter().collect()));
                    column += end - start;
                    start = end;
                    row_full = column == width;
                }
            }
        }
    }

    let mut rows = vec![Vec::new()];
    for token in packed {
        match token {
            Token::Break => rows.push(Vec::new()),
            Token::Style(style) => push_row(&mut rows, Segment::Style(style)),
            Token::Text(text) if !text.is_empty() => push_row(&mut rows, Segment::Text(text)),
            Token::Text(_) => {}
        }
    }
    Ok(rows)
}

fn push_row(rows: &mut [Vec<Segment>], segment: Segment) {
    if let Some(row) = rows.last_mut() {
        row.push(segment);
    }
}

fn printable(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

/// Run `segmenter` over `entry` and prefix every row with the style active
/// where it starts.
pub fn wrap_entry(
    entry: &LogEntry,
    width: usize,
    segmenter: &Segmenter,
) -> Result<Vec<WrappedLine>, ConsoleError> {
    let rows = segmenter(entry, width)?;
    let mut active = Style::default();
    let mut lines = Vec::with_capacity(rows.len());
    for row in rows {
        let start = active;
        for segment in &row {
            if let Segment::Style(style) = segment {
                active = *style;
            }
        }
        lines.push(WrappedLine::new(start, row));
    }
    Ok(lines)
}
