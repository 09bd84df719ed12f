//! Splits the terminal into the display area, the prompt glyph, and the input
//! field.

use ratatui::layout::Rect;

/// Width reserved for the prompt glyph in front of the input field.
pub const PROMPT_WIDTH: u16 = 2;

/// Terminal dimensions reported to resize callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsoleSize {
    /// Columns.
    pub width: u16,
    /// Rows.
    pub height: u16,
}

/// The three screen regions of a console.
///
/// The display region spans every row except the input row. The input row is
/// the first or last row of the terminal and holds a two-column prompt
/// followed by the input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Regions {
    /// Header, logs, and footer.
    pub display: Rect,
    /// The prompt glyph (`"> "`).
    pub prompt: Rect,
    /// The editable input field.
    pub field: Rect,
}

impl Regions {
    /// Lay out a `height` × `width` terminal.
    ///
    /// Terminals with no rows or fewer than three columns get zero-area
    /// regions; painters skip those without error.
    ///
    /// # Example
    ///
    /// ```
    /// use ratatui::layout::Rect;
    /// use snapconsole_core::layout::Regions;
    ///
    /// let regions = Regions::compute(24, 80, false);
    /// assert_eq!(regions.display, Rect::new(0, 0, 80, 23));
    /// assert_eq!(regions.field, Rect::new(2, 23, 78, 1));
    /// ```
    pub fn compute(height: u16, width: u16, input_at_top: bool) -> Self {
        if height < 1 || width < PROMPT_WIDTH + 1 {
            return Self::default();
        }
        let input_row = if input_at_top { 0 } else { height - 1 };
        let display_top = if input_at_top { 1 } else { 0 };
        Self {
            display: Rect::new(0, display_top, width, height - 1),
            prompt: Rect::new(0, input_row, PROMPT_WIDTH, 1),
            field: Rect::new(PROMPT_WIDTH, input_row, width - PROMPT_WIDTH, 1),
        }
    }

    /// Whether every region has zero area.
    pub fn is_degenerate(&self) -> bool {
        self.display.is_empty() && self.prompt.is_empty() && self.field.is_empty()
    }
}
