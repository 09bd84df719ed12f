//! Off-screen drawing surfaces.
//!
//! Each console region paints into its own [`Surface`] in local coordinates;
//! the backend then copies the surface onto the screen at the region's
//! position.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

use crate::error::DrawError;

/// An off-screen buffer of styled cells plus a cursor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    buffer: Buffer,
    cursor: (u16, u16),
}

impl Surface {
    /// Create a blank `height` × `width` surface. Either may be zero.
    pub fn new(height: u16, width: u16) -> Self {
        Self {
            buffer: Buffer::empty(Rect::new(0, 0, width, height)),
            cursor: (0, 0),
        }
    }

    /// Resize to `height` × `width` and blank every cell.
    pub fn resize(&mut self, height: u16, width: u16) {
        self.buffer.resize(Rect::new(0, 0, width, height));
        self.buffer.reset();
        self.cursor = self.clamp(self.cursor.0, self.cursor.1);
    }

    /// Blank every cell.
    pub fn erase(&mut self) {
        self.buffer.reset();
    }

    /// The surface bounds, always anchored at the origin.
    pub fn area(&self) -> Rect {
        self.buffer.area
    }

    /// Height in rows.
    pub fn height(&self) -> u16 {
        self.buffer.area.height
    }

    /// Width in columns.
    pub fn width(&self) -> u16 {
        self.buffer.area.width
    }

    /// Write `text` starting at (`row`, `col`), clipped at the right edge.
    ///
    /// Fails with [`DrawError::OutOfBounds`] when the start lies outside the
    /// surface; nothing is written in that case.
    pub fn draw_text(&mut self, row: u16, col: u16, text: &str, style: Style) -> Result<(), DrawError> {
        let area = self.buffer.area;
        if row >= area.height || col >= area.width {
            return Err(DrawError::OutOfBounds { row, col });
        }
        self.buffer
            .set_stringn(col, row, text, usize::from(area.width - col), style);
        Ok(())
    }

    /// Place the cursor, clamped to the surface bounds.
    pub fn move_cursor(&mut self, row: u16, col: u16) {
        self.cursor = self.clamp(row, col);
    }

    /// Cursor position as (`row`, `col`).
    pub fn cursor(&self) -> (u16, u16) {
        self.cursor
    }

    /// The underlying cells.
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    fn clamp(&self, row: u16, col: u16) -> (u16, u16) {
        let area = self.buffer.area;
        (
            row.min(area.height.saturating_sub(1)),
            col.min(area.width.saturating_sub(1)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn row_text(surface: &Surface, row: u16) -> String {
        (0..surface.width())
            .map(|x| surface.buffer()[(x, row)].symbol().to_owned())
            .collect()
    }

    #[test]
    fn draw_text_writes_cells() {
        let mut surface = Surface::new(2, 6);
        surface.draw_text(1, 1, "hi", Style::default()).unwrap();
        assert_eq!(row_text(&surface, 0), "      ");
        assert_eq!(row_text(&surface, 1), " hi   ");
    }

    #[test]
    fn draw_text_clips_at_right_edge() {
        let mut surface = Surface::new(1, 4);
        surface.draw_text(0, 2, "abcdef", Style::default()).unwrap();
        assert_eq!(row_text(&surface, 0), "  ab");
    }

    #[test]
    fn out_of_bounds_start_is_reported() {
        let mut surface = Surface::new(2, 4);
        assert_eq!(
            surface.draw_text(2, 0, "x", Style::default()),
            Err(DrawError::OutOfBounds { row: 2, col: 0 })
        );
        assert_eq!(
            surface.draw_text(0, 4, "x", Style::default()),
            Err(DrawError::OutOfBounds { row: 0, col: 4 })
        );
        assert_eq!(row_text(&surface, 0), "    ");
    }

    #[test]
    fn zero_sized_surface_rejects_every_draw() {
        let mut surface = Surface::new(0, 0);
        assert!(surface.draw_text(0, 0, "x", Style::default()).is_err());
        surface.move_cursor(3, 3);
        assert_eq!(surface.cursor(), (0, 0));
    }

    #[test]
    fn style_is_applied() {
        let mut surface = Surface::new(1, 3);
        let red = Style::default().fg(Color::Red);
        surface.draw_text(0, 0, "r", red).unwrap();
        assert_eq!(surface.buffer()[(0, 0)].fg, Color::Red);
        assert_eq!(surface.buffer()[(1, 0)].fg, Color::Reset);
    }

    #[test]
    fn resize_blanks_and_clamps_cursor() {
        let mut surface = Surface::new(3, 10);
        surface.draw_text(0, 0, "text", Style::default()).unwrap();
        surface.move_cursor(2, 9);
        surface.resize(2, 5);
        assert_eq!(surface.area(), Rect::new(0, 0, 5, 2));
        assert_eq!(row_text(&surface, 0), "     ");
        assert_eq!(surface.cursor(), (1, 4));
    }

    #[test]
    fn erase_blanks_cells() {
        let mut surface = Surface::new(1, 3);
        surface.draw_text(0, 0, "abc", Style::default()).unwrap();
        surface.erase();
        assert_eq!(row_text(&surface, 0), "   ");
    }
}
