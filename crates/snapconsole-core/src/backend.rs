//! The terminal collaborator behind a [`Console`](crate::Console).
//!
//! The console never talks to the terminal directly. It paints [`Surface`]s,
//! hands them to a [`Backend`] to place on screen, and asks the backend for
//! classified input events. [`TerminalBackend`] is the crossterm/ratatui
//! implementation; [`ScriptedBackend`](crate::testing::ScriptedBackend) is the
//! headless one used in tests.

use std::io::{self, stderr, stdout, Stderr, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::Terminal;

use crate::event::ConsoleEvent;
use crate::surface::Surface;

/// Screen-level operations the console needs from a terminal.
pub trait Backend {
    /// Take over the terminal. Called once, before the first draw.
    fn init(&mut self) -> io::Result<()>;

    /// Restore the terminal to its prior state.
    fn shutdown(&mut self) -> io::Result<()>;

    /// Current terminal size as (`height`, `width`).
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Queue a copy of `surface` onto the screen region `dest`.
    ///
    /// Cells falling outside either the surface or `dest` are skipped.
    /// Nothing reaches the terminal until [`flush`](Backend::flush).
    fn overwrite(&mut self, surface: &Surface, dest: Rect);

    /// Queue a move of the visible cursor to screen position (`row`, `col`).
    fn set_cursor(&mut self, row: u16, col: u16);

    /// Push every queued change to the terminal.
    fn flush(&mut self) -> io::Result<()>;

    /// Read one input event.
    ///
    /// With `blocking` set, waits until a real event arrives. Otherwise
    /// returns [`ConsoleEvent::NoEvent`] immediately when nothing is pending.
    fn read_event(&mut self, blocking: bool) -> io::Result<ConsoleEvent>;
}

/// Copy the cells of `surface` into `screen` at `dest`.
pub(crate) fn blit(screen: &mut Buffer, surface: &Surface, dest: Rect) {
    let source = surface.buffer();
    let rows = dest.height.min(source.area.height);
    let cols = dest.width.min(source.area.width);
    for y in 0..rows {
        for x in 0..cols {
            let target = Position::new(dest.x + x, dest.y + y);
            if screen.area.contains(target) {
                screen[target] = source[(x, y)].clone();
            }
        }
    }
}

/// Output target for the terminal UI.
///
/// By default the console renders to **stdout**. When stdout is piped, switch
/// to [`Stderr`](OutputTarget::Stderr) so the console still reaches the
/// terminal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to stdout (default).
    #[default]
    Stdout,
    /// Write to stderr.
    Stderr,
}

/// The standard stream selected by an [`OutputTarget`].
enum Output {
    Stdout(Stdout),
    Stderr(Stderr),
}

impl Output {
    fn new(target: OutputTarget) -> Self {
        match target {
            OutputTarget::Stdout => Output::Stdout(stdout()),
            OutputTarget::Stderr => Output::Stderr(stderr()),
        }
    }

    fn stream(&mut self) -> &mut dyn Write {
        match self {
            Output::Stdout(out) => out,
            Output::Stderr(err) => err,
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream().flush()
    }
}

/// Configuration for a [`TerminalBackend`].
///
/// # Example
///
/// ```
/// use snapconsole_core::backend::{OutputTarget, TerminalOptions};
///
/// let opts = TerminalOptions {
///     output: OutputTarget::Stderr,
///     ..TerminalOptions::default()
/// };
/// assert!(opts.alt_screen);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TerminalOptions {
    /// Run in the alternate screen (default: true).
    pub alt_screen: bool,
    /// Restore the terminal from a panic hook (default: true).
    pub catch_panics: bool,
    /// Output target: stdout (default) or stderr.
    pub output: OutputTarget,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            alt_screen: true,
            catch_panics: true,
            output: OutputTarget::default(),
        }
    }
}

/// A [`Backend`] driving the real terminal through crossterm.
///
/// Surfaces are composed into an in-memory screen buffer; [`flush`] hands
/// that buffer to a ratatui [`Terminal`], which diffs it against the previous
/// frame and writes only the changed cells.
///
/// [`flush`]: Backend::flush
pub struct TerminalBackend {
    options: TerminalOptions,
    terminal: Option<Terminal<CrosstermBackend<Output>>>,
    screen: Buffer,
    cursor: Option<Position>,
}

impl Default for TerminalBackend {
    fn default() -> Self {
        Self::new(TerminalOptions::default())
    }
}

impl TerminalBackend {
    /// Create a backend. The terminal is not touched until [`Backend::init`].
    pub fn new(options: TerminalOptions) -> Self {
        Self {
            options,
            terminal: None,
            screen: Buffer::empty(Rect::default()),
            cursor: None,
        }
    }

    /// The options this backend was created with.
    pub fn options(&self) -> &TerminalOptions {
        &self.options
    }
}

impl Backend for TerminalBackend {
    fn init(&mut self) -> io::Result<()> {
        if self.terminal.is_none() {
            self.terminal = Some(init_terminal(&self.options)?);
        }
        Ok(())
    }

    fn shutdown(&mut self) -> io::Result<()> {
        if self.terminal.take().is_some() {
            restore_terminal(&self.options)?;
        }
        Ok(())
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        let (columns, rows) = crossterm::terminal::size()?;
        Ok((rows, columns))
    }

    fn overwrite(&mut self, surface: &Surface, dest: Rect) {
        let needed = self.screen.area.union(dest);
        if needed != self.screen.area {
            self.screen.resize(needed);
        }
        blit(&mut self.screen, surface, dest);
    }

    fn set_cursor(&mut self, row: u16, col: u16) {
        self.cursor = Some(Position::new(col, row));
    }

    fn flush(&mut self) -> io::Result<()> {
        let Some(terminal) = self.terminal.as_mut() else {
            return Ok(());
        };
        let screen = &self.screen;
        let cursor = self.cursor;
        terminal.draw(|frame| {
            let area = frame.area().intersection(screen.area);
            let buffer = frame.buffer_mut();
            for y in area.top()..area.bottom() {
                for x in area.left()..area.right() {
                    buffer[(x, y)] = screen[(x, y)].clone();
                }
            }
            if let Some(position) = cursor {
                frame.set_cursor_position(position);
            }
        })?;
        Ok(())
    }

    fn read_event(&mut self, blocking: bool) -> io::Result<ConsoleEvent> {
        if !blocking && !event::poll(Duration::ZERO)? {
            return Ok(ConsoleEvent::NoEvent);
        }
        Ok(ConsoleEvent::from_crossterm(event::read()?))
    }
}

impl Drop for TerminalBackend {
    fn drop(&mut self) {
        if self.terminal.is_some() {
            restore_terminal(&self.options).ok();
        }
    }
}

fn init_terminal(options: &TerminalOptions) -> io::Result<Terminal<CrosstermBackend<Output>>> {
    if options.catch_panics {
        install_restore_hook(options.alt_screen, options.output);
    }

    enable_raw_mode()?;
    let mut writer = Output::new(options.output);
    if options.alt_screen {
        execute!(writer, EnterAlternateScreen)?;
    }
    execute!(writer, EnableBracketedPaste)?;

    Terminal::new(CrosstermBackend::new(writer))
}

/// Chain a panic hook that puts the terminal back before the panic message
/// is printed. Installed at most once per process.
fn install_restore_hook(alt_screen: bool, target: OutputTarget) {
    static RESTORE_HOOK: std::sync::Once = std::sync::Once::new();
    RESTORE_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_streams(alt_screen, target).ok();
            previous(info);
        }));
    });
}

fn restore_terminal(options: &TerminalOptions) -> io::Result<()> {
    restore_streams(options.alt_screen, options.output)
}

fn restore_streams(alt_screen: bool, target: OutputTarget) -> io::Result<()> {
    // Every step runs even if an earlier one fails; the raw-mode error wins.
    let raw = disable_raw_mode();
    let mut writer = Output::new(target);
    execute!(writer, DisableBracketedPaste).ok();
    execute!(writer, cursor::Show).ok();
    if alt_screen {
        execute!(writer, LeaveAlternateScreen).ok();
    }
    raw
}
