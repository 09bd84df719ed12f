//! Error types shared by every console component.

/// Errors that can occur while laying out, driving, or tearing down a
/// [`Console`](crate::Console).
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// A wrap width of zero was requested.
    #[error("invalid layout: wrap width must be positive (got {width})")]
    InvalidLayout {
        /// The rejected width.
        width: usize,
    },
    /// A recall or item index lies beyond the end of a sequence.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The length of the sequence at the time of the call.
        len: usize,
    },
    /// The operation is not allowed in the console's current state.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
    /// The user pressed Ctrl+C while the input field had focus.
    #[error("input interrupted")]
    Interrupted,
    /// An I/O error from terminal setup, event reading, or painting.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single draw call that could not be honoured.
///
/// Draw errors are swallowed by the painter: one bad segment never aborts
/// the rest of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    /// The write started outside the surface.
    #[error("draw at ({row}, {col}) is outside the surface")]
    OutOfBounds {
        /// Requested row.
        row: u16,
        /// Requested column.
        col: u16,
    },
}
