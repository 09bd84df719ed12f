use std::cell::Cell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use crate::backend::{blit, Backend};
use crate::event::ConsoleEvent;
use crate::surface::Surface;

/// A headless [`Backend`] that replays a scripted queue of events.
///
/// `ScriptedBackend` lets you drive a [`Console`](crate::Console) in a plain
/// `#[test]` function: no TTY required. Surfaces are copied into an
/// in-memory screen that can be inspected with
/// [`screen_string`](ScriptedBackend::screen_string).
///
/// A blocking read on an exhausted script fails with
/// [`io::ErrorKind::UnexpectedEof`]; a non-blocking one yields
/// [`ConsoleEvent::NoEvent`]. A scripted [`ConsoleEvent::Resize`] also
/// resizes the screen before it is handed to the console.
///
/// The shutdown count lives behind an `Rc` so a test can keep reading it
/// after the console, and the backend with it, has been dropped. Clones share
/// the same counter.
///
/// # Example
///
/// ```
/// use snapconsole_core::testing::ScriptedBackend;
/// use snapconsole_core::{Console, ConsoleOptions};
///
/// let backend = ScriptedBackend::new(5, 20).with_line("help");
/// let console = Console::new(backend, ConsoleOptions::default());
/// console.start().unwrap();
///
/// assert_eq!(console.get_input().unwrap(), "help");
/// console.logs().push("no help available");
/// let screen = console.with_backend(|b| b.screen_string());
/// assert!(screen.contains("no help available"));
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    events: VecDeque<ConsoleEvent>,
    screen: Buffer,
    cursor: (u16, u16),
    fail_init: bool,
    fail_size: bool,
    initialized: bool,
    init_count: usize,
    shutdown_count: Rc<Cell<usize>>,
    draw_count: usize,
    flush_count: usize,
}

impl ScriptedBackend {
    /// Create a backend whose terminal is `height` × `width`.
    pub fn new(height: u16, width: u16) -> Self {
        Self {
            events: VecDeque::new(),
            screen: Buffer::empty(Rect::new(0, 0, width, height)),
            cursor: (0, 0),
            fail_init: false,
            fail_size: false,
            initialized: false,
            init_count: 0,
            shutdown_count: Rc::new(Cell::new(0)),
            draw_count: 0,
            flush_count: 0,
        }
    }

    /// Queue events to be read in order.
    pub fn with_events(mut self, events: impl IntoIterator<Item = ConsoleEvent>) -> Self {
        self.push_events(events);
        self
    }

    /// Queue the characters of `line` followed by a submit.
    pub fn with_line(mut self, line: &str) -> Self {
        self.push_line(line);
        self
    }

    /// Make [`Backend::init`] fail.
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Make [`Backend::size`] fail while `init` still succeeds.
    pub fn failing_size(mut self) -> Self {
        self.fail_size = true;
        self
    }

    /// Queue one event.
    pub fn push_event(&mut self, event: ConsoleEvent) {
        self.events.push_back(event);
    }

    /// Queue several events.
    pub fn push_events(&mut self, events: impl IntoIterator<Item = ConsoleEvent>) {
        self.events.extend(events);
    }

    /// Queue the characters of `line` followed by a submit.
    pub fn push_line(&mut self, line: &str) {
        self.events.extend(line.chars().map(ConsoleEvent::Char));
        self.events.push_back(ConsoleEvent::Submit);
    }

    /// Events not yet read.
    pub fn pending(&self) -> usize {
        self.events.len()
    }

    /// The in-memory screen.
    pub fn screen(&self) -> &Buffer {
        &self.screen
    }

    /// Render the screen as plain text.
    ///
    /// Each row of the screen is concatenated into a line; rows are separated
    /// by newlines. Trailing whitespace within each row is preserved.
    pub fn screen_string(&self) -> String {
        let area = self.screen.area;
        let mut output = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                output.push_str(self.screen[(x, y)].symbol());
            }
            if y + 1 < area.bottom() {
                output.push('\n');
            }
        }
        output
    }

    /// One screen row with trailing blanks removed.
    pub fn row(&self, y: u16) -> String {
        let area = self.screen.area;
        if y >= area.height {
            return String::new();
        }
        let line: String = (area.left()..area.right())
            .map(|x| self.screen[(x, y)].symbol())
            .collect();
        line.trim_end().to_owned()
    }

    /// Last cursor position set by the console, as (`row`, `col`).
    pub fn cursor(&self) -> (u16, u16) {
        self.cursor
    }

    /// Whether the backend is between `init` and `shutdown`.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of successful `init` calls.
    pub fn init_count(&self) -> usize {
        self.init_count
    }

    /// Number of `shutdown` calls.
    pub fn shutdown_count(&self) -> usize {
        self.shutdown_count.get()
    }

    /// Shared handle to the `shutdown` count.
    pub fn shutdown_counter(&self) -> Rc<Cell<usize>> {
        self.shutdown_count.clone()
    }

    /// Number of `overwrite` calls.
    pub fn draw_count(&self) -> usize {
        self.draw_count
    }

    /// Number of `flush` calls.
    pub fn flush_count(&self) -> usize {
        self.flush_count
    }
}

impl Backend for ScriptedBackend {
    fn init(&mut self) -> io::Result<()> {
        if self.fail_init {
            return Err(io::Error::other("scripted init failure"));
        }
        self.initialized = true;
        self.init_count += 1;
        Ok(())
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.initialized = false;
        self.shutdown_count.set(self.shutdown_count.get() + 1);
        Ok(())
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        if self.fail_size {
            return Err(io::Error::other("scripted size failure"));
        }
        Ok((self.screen.area.height, self.screen.area.width))
    }

    fn overwrite(&mut self, surface: &Surface, dest: Rect) {
        self.draw_count += 1;
        blit(&mut self.screen, surface, dest);
    }

    fn set_cursor(&mut self, row: u16, col: u16) {
        self.cursor = (row, col);
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_count += 1;
        Ok(())
    }

    fn read_event(&mut self, blocking: bool) -> io::Result<ConsoleEvent> {
        match self.events.pop_front() {
            Some(ConsoleEvent::Resize(columns, rows)) => {
                self.screen.resize(Rect::new(0, 0, columns, rows));
                self.screen.reset();
                Ok(ConsoleEvent::Resize(columns, rows))
            }
            Some(event) => Ok(event),
            None if blocking => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "event script exhausted",
            )),
            None => Ok(ConsoleEvent::NoEvent),
        }
    }
}
