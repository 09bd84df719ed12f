//! Builds the rows of the display region from the header, log, and footer
//! entries.
//!
//! Rows are allotted in a fixed priority order: the footer first, then the
//! header, then the logs with whatever space is left. Each region truncates
//! differently when space runs out:
//!
//! | Region | Filled | Dropped first |
//! |--------|--------|---------------|
//! | footer | newest entry first | earliest rows |
//! | header | oldest entry first | latest rows |
//! | logs   | newest entry first | oldest rows |

use crate::error::ConsoleError;
use crate::segment::{default_segmenter, wrap_entry, LogEntry, Segmenter, WrappedLine};

/// Composes header, logs, and footer into exactly one frame of rows.
#[derive(Clone)]
pub struct Compositor {
    segmenter: Segmenter,
    logs_at_top: bool,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(default_segmenter())
    }
}

impl Compositor {
    /// Create a compositor that wraps entries with `segmenter` and anchors
    /// logs to the bottom of their space.
    pub fn new(segmenter: Segmenter) -> Self {
        Self {
            segmenter,
            logs_at_top: false,
        }
    }

    /// Anchor logs directly under the header instead of above the footer.
    pub fn with_logs_at_top(mut self, logs_at_top: bool) -> Self {
        self.logs_at_top = logs_at_top;
        self
    }

    /// Change the log anchoring.
    pub fn set_logs_at_top(&mut self, logs_at_top: bool) {
        self.logs_at_top = logs_at_top;
    }

    /// Whether logs are anchored under the header.
    pub fn logs_at_top(&self) -> bool {
        self.logs_at_top
    }

    /// The segmenter used to wrap entries.
    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    /// Produce exactly `height` rows for a display `width` columns wide.
    ///
    /// A height of zero yields no rows and never invokes the segmenter.
    /// Errors from the segmenter (e.g. a zero `width`) are returned as is.
    pub fn compose(
        &self,
        header: &[LogEntry],
        logs: &[LogEntry],
        footer: &[LogEntry],
        height: usize,
        width: usize,
    ) -> Result<Vec<WrappedLine>, ConsoleError> {
        if height == 0 {
            return Ok(Vec::new());
        }
        let mut left = height;

        let footer_rows = self.newest_first(footer, left, width)?;
        left -= footer_rows.len();

        let mut header_rows = Vec::new();
        for entry in header {
            if header_rows.len() >= left {
                break;
            }
            header_rows.extend(wrap_entry(entry, width, &self.segmenter)?);
        }
        header_rows.truncate(left);
        left -= header_rows.len();

        let log_rows = self.newest_first(logs, left, width)?;
        left -= log_rows.len();

        let padding = std::iter::repeat_with(WrappedLine::blank).take(left);
        let mut frame = Vec::with_capacity(height);
        frame.extend(header_rows);
        if self.logs_at_top {
            frame.extend(log_rows);
            frame.extend(padding);
        } else {
            frame.extend(padding);
            frame.extend(log_rows);
        }
        frame.extend(footer_rows);
        Ok(frame)
    }

    /// Wrap entries from the newest backwards until `limit` rows are filled,
    /// keeping the most recent rows, in chronological order.
    fn newest_first(
        &self,
        entries: &[LogEntry],
        limit: usize,
        width: usize,
    ) -> Result<Vec<WrappedLine>, ConsoleError> {
        let mut rows = Vec::new();
        for entry in entries.iter().rev() {
            if rows.len() >= limit {
                break;
            }
            rows.extend(wrap_entry(entry, width, &self.segmenter)?.into_iter().rev());
        }
        rows.truncate(limit);
        rows.reverse();
        Ok(rows)
    }
}
