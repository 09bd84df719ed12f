//! The console session: owns the backend, the three region surfaces, and the
//! observable content, and runs the input loop.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use futures::Stream;
use ratatui::style::Style;
use tracing::{debug, trace, warn};

use crate::backend::Backend;
use crate::compositor::Compositor;
use crate::error::ConsoleError;
use crate::event::ConsoleEvent;
use crate::history::{CommandHistory, DEFAULT_CAPACITY};
use crate::input::{InputController, Transition};
use crate::layout::{ConsoleSize, Regions};
use crate::observable::ObservableSequence;
use crate::segment::{default_segmenter, LogEntry, Segmenter};
use crate::surface::Surface;

/// Configuration options for a [`Console`].
///
/// All fields have sensible defaults (see [`Default`] impl). Use struct
/// update syntax to override only the options you need:
///
/// # Example
///
/// ```
/// use snapconsole_core::ConsoleOptions;
///
/// let opts = ConsoleOptions {
///     history_capacity: 500,
///     logs_align_top: true,
///     resize_callback: Some(Box::new(|size| {
///         eprintln!("now {}x{}", size.width, size.height);
///     })),
///     ..ConsoleOptions::default()
/// };
/// assert_eq!(opts.prompt, "> ");
/// ```
pub struct ConsoleOptions {
    /// Number of submitted commands kept for recall (default: 100).
    pub history_capacity: usize,
    /// Wraps one entry into rows (default: [`split_entry`](crate::segment::split_entry)).
    pub segmenter: Segmenter,
    /// Anchor logs under the header instead of above the footer (default: false).
    pub logs_align_top: bool,
    /// Put the input bar on the first row instead of the last (default: false).
    pub input_align_top: bool,
    /// Called with the new size after every terminal resize.
    pub resize_callback: Option<Box<dyn Fn(ConsoleSize)>>,
    /// Sleep between empty polls in the cooperative input loop (default: 10ms).
    pub poll_interval: Duration,
    /// Glyph drawn in front of the input field, clipped to two columns
    /// (default: `"> "`).
    pub prompt: String,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            segmenter: default_segmenter(),
            logs_align_top: false,
            input_align_top: false,
            resize_callback: None,
            poll_interval: Duration::from_millis(10),
            prompt: "> ".to_owned(),
        }
    }
}

impl fmt::Debug for ConsoleOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleOptions")
            .field("history_capacity", &self.history_capacity)
            .field("logs_align_top", &self.logs_align_top)
            .field("input_align_top", &self.input_align_top)
            .field("resize_callback", &self.resize_callback.is_some())
            .field("poll_interval", &self.poll_interval)
            .field("prompt", &self.prompt)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Created,
    Running,
    Stopped,
}

/// Callback work that found the console borrowed and must run once it is
/// released.
#[derive(Debug, Default)]
struct Deferred {
    repaint: Cell<bool>,
    history: Cell<bool>,
}

struct Inner<B: Backend> {
    backend: B,
    state: State,
    size: ConsoleSize,
    regions: Regions,
    input_at_top: bool,
    display: Surface,
    prompt_surface: Surface,
    field: Surface,
    compositor: Compositor,
    input: InputController,
    history: CommandHistory,
    logs: Rc<RefCell<Vec<LogEntry>>>,
    header: Rc<RefCell<Vec<LogEntry>>>,
    footer: Rc<RefCell<Vec<LogEntry>>>,
    prompt: String,
    poll_interval: Duration,
    resize_callback: Option<Rc<dyn Fn(ConsoleSize)>>,
}

impl<B: Backend> Inner<B> {
    fn running(&self) -> Result<(), ConsoleError> {
        match self.state {
            State::Running => Ok(()),
            State::Created => Err(ConsoleError::InvalidOperation("console has not been started")),
            State::Stopped => Err(ConsoleError::InvalidOperation("console has been stopped")),
        }
    }

    fn is_running(&self) -> bool {
        self.state == State::Running
    }

    fn relayout(&mut self) {
        self.regions = Regions::compute(self.size.height, self.size.width, self.input_at_top);
        let Regions {
            display,
            prompt,
            field,
        } = self.regions;
        self.display.resize(display.height, display.width);
        self.prompt_surface.resize(prompt.height, prompt.width);
        self.field.resize(field.height, field.width);
    }

    fn paint_all(&mut self) {
        self.paint_display();
        self.paint_prompt();
        self.paint_field();
    }

    fn paint_display(&mut self) {
        let area = self.regions.display;
        if !self.is_running() || area.is_empty() {
            return;
        }
        self.display.erase();
        let rows = self.compositor.compose(
            &self.header.borrow(),
            &self.logs.borrow(),
            &self.footer.borrow(),
            usize::from(area.height),
            usize::from(area.width),
        );
        let rows = match rows {
            Ok(rows) => rows,
            Err(err) => {
                warn!(%err, "could not compose display");
                Vec::new()
            }
        };
        for (y, row) in (0..area.height).zip(rows.iter()) {
            let mut col: u16 = 0;
            for (style, text) in row.runs() {
                if text.is_empty() {
                    continue;
                }
                if let Err(err) = self.display.draw_text(y, col, text, style) {
                    trace!(%err, "display draw skipped");
                }
                let len = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
                col = col.saturating_add(len);
            }
        }
        self.backend.overwrite(&self.display, area);
    }

    fn paint_prompt(&mut self) {
        let area = self.regions.prompt;
        if !self.is_running() || area.is_empty() {
            return;
        }
        self.prompt_surface.erase();
        if let Err(err) = self
            .prompt_surface
            .draw_text(0, 0, &self.prompt, Style::default())
        {
            trace!(%err, "prompt draw skipped");
        }
        self.backend.overwrite(&self.prompt_surface, area);
    }

    fn paint_field(&mut self) {
        let area = self.regions.field;
        if !self.is_running() || area.is_empty() {
            return;
        }
        self.field.erase();
        let text = self.input.displayed(&self.history);
        let cursor = self.input.cursor();
        let width = usize::from(area.width);
        let offset = cursor.saturating_sub(width - 1);
        let visible: String = text.chars().skip(offset).take(width).collect();
        if !visible.is_empty() {
            if let Err(err) = self.field.draw_text(0, 0, &visible, Style::default()) {
                trace!(%err, "input draw skipped");
            }
        }
        let col = u16::try_from(cursor - offset).unwrap_or(u16::MAX);
        self.field.move_cursor(0, col);
        self.backend.overwrite(&self.field, area);
        let (row, col) = self.field.cursor();
        self.backend.set_cursor(area.y + row, area.x + col);
    }

    fn flush(&mut self) {
        if !self.is_running() {
            return;
        }
        if let Err(err) = self.backend.flush() {
            warn!(%err, "flush failed");
        }
    }

    fn shutdown(&mut self) {
        if self.state != State::Running {
            return;
        }
        self.state = State::Stopped;
        match self.backend.shutdown() {
            Ok(()) => debug!("console stopped"),
            Err(err) => warn!(%err, "terminal restore failed"),
        }
    }
}

impl<B: Backend> Drop for Inner<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// An interactive terminal console.
///
/// The screen is split into a display region (header, logs, footer) and a
/// one-row input bar. Mutating [`logs`](Console::logs),
/// [`header`](Console::header) or [`footer`](Console::footer) repaints the
/// display immediately; [`get_input`](Console::get_input) and
/// [`get_input_async`](Console::get_input_async) run the input loop until the
/// user submits a line.
///
/// `Console` is a cheap handle: clones share the same session, so one clone
/// can live in a timer task while another waits for input on the same
/// thread. It is deliberately `!Send`. The backend is shut down by
/// [`stop`](Console::stop) or when the last handle is dropped, whichever comes
/// first.
///
/// # Example
///
/// ```no_run
/// use snapconsole_core::{Console, ConsoleOptions, TerminalBackend};
///
/// # fn main() -> Result<(), snapconsole_core::ConsoleError> {
/// let console = Console::new(TerminalBackend::default(), ConsoleOptions::default());
/// console.start()?;
/// for line in console.inputs() {
///     let line = line?;
///     console.logs().push(format!("you said: {line}"));
/// }
/// console.stop();
/// # Ok(())
/// # }
/// ```
pub struct Console<B: Backend> {
    inner: Rc<RefCell<Inner<B>>>,
    logs: ObservableSequence<LogEntry>,
    header: ObservableSequence<LogEntry>,
    footer: ObservableSequence<LogEntry>,
    command_history: ObservableSequence<String>,
    deferred: Rc<Deferred>,
}

impl<B: Backend> Clone for Console<B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            logs: self.logs.clone(),
            header: self.header.clone(),
            footer: self.footer.clone(),
            command_history: self.command_history.clone(),
            deferred: self.deferred.clone(),
        }
    }
}

impl<B: Backend + 'static> Console<B> {
    /// Create a console over `backend`. The terminal is not touched until
    /// [`start`](Console::start); content added before then is drawn on start.
    pub fn new(backend: B, options: ConsoleOptions) -> Self {
        let history = CommandHistory::new(options.history_capacity);
        let logs = Rc::new(RefCell::new(Vec::new()));
        let header = Rc::new(RefCell::new(Vec::new()));
        let footer = Rc::new(RefCell::new(Vec::new()));

        let inner = Rc::new(RefCell::new(Inner {
            backend,
            state: State::Created,
            size: ConsoleSize::default(),
            regions: Regions::default(),
            input_at_top: options.input_align_top,
            display: Surface::new(0, 0),
            prompt_surface: Surface::new(0, 0),
            field: Surface::new(0, 0),
            compositor: Compositor::new(options.segmenter).with_logs_at_top(options.logs_align_top),
            input: InputController::new(),
            history: history.clone(),
            logs: logs.clone(),
            header: header.clone(),
            footer: footer.clone(),
            prompt: options.prompt,
            poll_interval: options.poll_interval,
            resize_callback: options.resize_callback.map(Rc::from),
        }));

        let weak = Rc::downgrade(&inner);
        let deferred = Rc::new(Deferred::default());
        Self {
            logs: ObservableSequence::from_shared(logs, display_repainter(&weak, &deferred)),
            header: ObservableSequence::from_shared(header, display_repainter(&weak, &deferred)),
            footer: ObservableSequence::from_shared(footer, display_repainter(&weak, &deferred)),
            command_history: ObservableSequence::from_shared(
                history.shared(),
                history_watcher(&weak, &deferred),
            ),
            inner,
            deferred,
        }
    }

    /// Take over the terminal and paint the first frame.
    ///
    /// Fails if the backend cannot be initialized, or with
    /// [`ConsoleError::InvalidOperation`] once the console has been stopped.
    /// Starting a running console does nothing.
    pub fn start(&self) -> Result<(), ConsoleError> {
        let mut inner = self.inner.borrow_mut();
        match inner.state {
            State::Running => return Ok(()),
            State::Stopped => {
                return Err(ConsoleError::InvalidOperation("console has been stopped"));
            }
            State::Created => {}
        }
        inner.backend.init()?;
        inner.state = State::Running;
        let (height, width) = match inner.backend.size() {
            Ok(size) => size,
            Err(err) => {
                inner.shutdown();
                return Err(err.into());
            }
        };
        inner.size = ConsoleSize { width, height };
        inner.relayout();
        inner.paint_all();
        inner.flush();
        debug!(width, height, "console started");
        Ok(())
    }

    /// Restore the terminal. Safe to call more than once; teardown errors are
    /// logged and suppressed.
    pub fn stop(&self) {
        self.inner.borrow_mut().shutdown();
    }

    /// Whether the console is between [`start`](Console::start) and
    /// [`stop`](Console::stop).
    pub fn is_running(&self) -> bool {
        self.inner.borrow().is_running()
    }

    /// Log entries, drawn between header and footer. Oldest rows are dropped
    /// first when space runs out.
    pub fn logs(&self) -> &ObservableSequence<LogEntry> {
        &self.logs
    }

    /// Entries pinned to the top of the display.
    pub fn header(&self) -> &ObservableSequence<LogEntry> {
        &self.header
    }

    /// Entries pinned to the bottom of the display.
    pub fn footer(&self) -> &ObservableSequence<LogEntry> {
        &self.footer
    }

    /// Submitted commands, oldest first.
    ///
    /// Editing the history re-applies the capacity bound, returns the input
    /// field to the live buffer, and repaints it.
    pub fn command_history(&self) -> &ObservableSequence<String> {
        &self.command_history
    }

    /// The text shown in the input field: the live buffer, or the recalled
    /// history entry.
    pub fn current_command(&self) -> String {
        let inner = self.inner.borrow();
        inner.input.displayed(&inner.history)
    }

    /// Replace the live buffer and show it.
    pub fn set_current_command(&self, command: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.input.set_current_command(command);
        inner.paint_field();
        inner.flush();
    }

    /// Which history entry is shown (`0` = live buffer).
    pub fn current_command_index(&self) -> usize {
        self.inner.borrow().input.recall_index()
    }

    /// Show the `index`-th most recent history entry (`0` = live buffer).
    ///
    /// Fails with [`ConsoleError::IndexOutOfRange`] when `index` exceeds the
    /// history length.
    pub fn set_current_command_index(&self, index: usize) -> Result<(), ConsoleError> {
        let mut inner = self.inner.borrow_mut();
        let inner = &mut *inner;
        inner.input.set_recall_index(index, &inner.history)?;
        inner.paint_field();
        inner.flush();
        Ok(())
    }

    /// Whether logs are anchored under the header.
    pub fn logs_align_top(&self) -> bool {
        self.inner.borrow().compositor.logs_at_top()
    }

    /// Anchor logs under the header (`true`) or above the footer (`false`).
    pub fn set_logs_align_top(&self, align_top: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.compositor.set_logs_at_top(align_top);
        inner.paint_display();
        inner.flush();
    }

    /// Whether the input bar is on the first row.
    pub fn input_align_top(&self) -> bool {
        self.inner.borrow().input_at_top
    }

    /// Move the input bar to the first row (`true`) or the last (`false`).
    pub fn set_input_align_top(&self, align_top: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.input_at_top = align_top;
        inner.relayout();
        inner.paint_all();
        inner.flush();
    }

    /// Repaint every region.
    pub fn redraw(&self) -> Result<(), ConsoleError> {
        let mut inner = self.inner.borrow_mut();
        inner.running()?;
        inner.paint_all();
        inner.backend.flush()?;
        Ok(())
    }

    /// The terminal size as of the last start or resize.
    pub fn size(&self) -> ConsoleSize {
        self.inner.borrow().size
    }

    /// Run `f` with the backend, e.g. to inspect a test backend.
    ///
    /// The console is borrowed while `f` runs. Sequence edits made from
    /// inside `f` are stored at once, but their repaint and the history
    /// capacity clamp are held back until `f` returns.
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        let result = f(&mut self.inner.borrow_mut().backend);
        self.run_deferred();
        result
    }

    fn run_deferred(&self) {
        if self.deferred.history.take() {
            refresh_history(&self.inner, &self.deferred);
        }
        if self.deferred.repaint.take() {
            repaint_display(&self.inner, &self.deferred);
        }
    }

    /// Block until the user submits a line, and return it.
    ///
    /// Fails with [`ConsoleError::Interrupted`] on Ctrl+C, with
    /// [`ConsoleError::InvalidOperation`] if the console is not running, and
    /// with [`ConsoleError::Io`] if the backend cannot read events.
    pub fn get_input(&self) -> Result<String, ConsoleError> {
        self.inner.borrow().running()?;
        loop {
            let event = self.inner.borrow_mut().backend.read_event(true)?;
            match self.step(event)? {
                Transition::Submitted(line) => return Ok(line),
                Transition::Interrupted => return Err(ConsoleError::Interrupted),
                Transition::Idle | Transition::Continue | Transition::Resized(..) => {}
            }
        }
    }

    /// Blocking iterator over submitted lines. Ends when an empty line is
    /// submitted, or after yielding the first error.
    pub fn inputs(&self) -> impl Iterator<Item = Result<String, ConsoleError>> + '_ {
        let mut done = false;
        std::iter::from_fn(move || {
            if done {
                return None;
            }
            match self.get_input() {
                Ok(line) if line.is_empty() => {
                    done = true;
                    None
                }
                Ok(line) => Some(Ok(line)),
                Err(err) => {
                    done = true;
                    Some(Err(err))
                }
            }
        })
    }

    /// Wait for the user to submit a line without blocking the thread.
    ///
    /// Polls the backend and sleeps for the configured poll interval whenever
    /// nothing is pending, so other tasks on the same thread (for example a
    /// timer appending to [`logs`](Console::logs)) keep running. Each event
    /// is applied in full before the next await point, so dropping the future
    /// never leaves an event half applied. Produces the same results as
    /// [`get_input`](Console::get_input) for the same events.
    pub async fn get_input_async(&self) -> Result<String, ConsoleError> {
        let poll_interval = {
            let inner = self.inner.borrow();
            inner.running()?;
            inner.poll_interval
        };
        loop {
            let event = self.inner.borrow_mut().backend.read_event(false)?;
            match self.step(event)? {
                Transition::Submitted(line) => return Ok(line),
                Transition::Interrupted => return Err(ConsoleError::Interrupted),
                Transition::Idle => {
                    trace!("no input pending");
                    tokio::time::sleep(poll_interval).await;
                }
                Transition::Continue | Transition::Resized(..) => {}
            }
        }
    }

    /// Async stream of submitted lines. Ends when an empty line is submitted,
    /// or after yielding the first error.
    pub fn input_stream(&self) -> impl Stream<Item = Result<String, ConsoleError>> + '_ {
        futures::stream::unfold(false, move |done| async move {
            if done {
                return None;
            }
            match self.get_input_async().await {
                Ok(line) if line.is_empty() => None,
                Ok(line) => Some((Ok(line), false)),
                Err(err) => Some((Err(err), true)),
            }
        })
    }

    /// Apply one event and repaint what it changed. Shared by both input loops.
    fn step(&self, event: ConsoleEvent) -> Result<Transition, ConsoleError> {
        let mut resized = None;
        let transition = {
            let mut inner = self.inner.borrow_mut();
            let inner = &mut *inner;
            inner.running()?;
            let transition = inner.input.apply(event, &inner.history);
            match &transition {
                Transition::Idle => {}
                Transition::Continue | Transition::Interrupted => {
                    inner.paint_field();
                    inner.flush();
                }
                Transition::Submitted(line) => {
                    debug!(len = line.chars().count(), "input submitted");
                    inner.paint_field();
                    inner.flush();
                }
                Transition::Resized(width, height) => {
                    let size = ConsoleSize {
                        width: *width,
                        height: *height,
                    };
                    debug!(size.width, size.height, "terminal resized");
                    inner.size = size;
                    inner.relayout();
                    inner.paint_all();
                    inner.flush();
                    resized = inner.resize_callback.clone().map(|callback| (callback, size));
                }
            }
            transition
        };
        if let Some((callback, size)) = resized {
            callback(size);
        }
        Ok(transition)
    }
}

fn display_repainter<B: Backend + 'static>(
    inner: &Weak<RefCell<Inner<B>>>,
    deferred: &Rc<Deferred>,
) -> impl Fn() + 'static {
    let inner = inner.clone();
    let deferred = deferred.clone();
    move || {
        if let Some(inner) = inner.upgrade() {
            repaint_display(&inner, &deferred);
        }
    }
}

fn history_watcher<B: Backend + 'static>(
    inner: &Weak<RefCell<Inner<B>>>,
    deferred: &Rc<Deferred>,
) -> impl Fn() + 'static {
    let inner = inner.clone();
    let deferred = deferred.clone();
    move || {
        if let Some(inner) = inner.upgrade() {
            refresh_history(&inner, &deferred);
        }
    }
}

fn repaint_display<B: Backend>(inner: &RefCell<Inner<B>>, deferred: &Deferred) {
    let Ok(mut inner) = inner.try_borrow_mut() else {
        trace!("display repaint deferred: console busy");
        deferred.repaint.set(true);
        return;
    };
    inner.paint_display();
    inner.flush();
}

fn refresh_history<B: Backend>(inner: &RefCell<Inner<B>>, deferred: &Deferred) {
    let Ok(mut inner) = inner.try_borrow_mut() else {
        trace!("history refresh deferred: console busy");
        deferred.history.set(true);
        return;
    };
    inner.history.clamp();
    inner.input.reset_recall();
    inner.paint_field();
    inner.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EditKey;
    use crate::testing::ScriptedBackend;
    use ratatui::style::Color;
    use std::cell::Cell;

    fn started(backend: ScriptedBackend) -> Console<ScriptedBackend> {
        let console = Console::new(backend, ConsoleOptions::default());
        console.start().unwrap();
        console
    }

    fn row(console: &Console<ScriptedBackend>, y: u16) -> String {
        console.with_backend(|b| b.row(y))
    }

    #[test]
    fn start_paints_prompt_and_inits_backend() {
        let console = started(ScriptedBackend::new(4, 20));
        assert_eq!(row(&console, 3), ">");
        assert!(console.with_backend(|b| b.is_initialized()));
        assert_eq!(console.size(), ConsoleSize { width: 20, height: 4 });
        assert_eq!(console.with_backend(|b| b.cursor()), (3, 2));
    }

    #[test]
    fn startup_failure_is_returned() {
        let console = Console::new(ScriptedBackend::new(4, 20).failing_init(), ConsoleOptions::default());
        assert!(matches!(console.start(), Err(ConsoleError::Io(_))));
        assert!(!console.is_running());
        assert!(matches!(console.get_input(), Err(ConsoleError::InvalidOperation(_))));
    }

    #[test]
    fn get_input_returns_submitted_line() {
        let console = started(ScriptedBackend::new(4, 20).with_line("help"));
        assert_eq!(console.get_input().unwrap(), "help");
        assert_eq!(console.command_history().to_vec(), vec!["help"]);
        assert_eq!(row(&console, 3), ">");
    }

    #[test]
    fn typing_is_echoed_in_the_field() {
        let backend = ScriptedBackend::new(4, 20).with_events("abc".chars().map(ConsoleEvent::Char));
        let console = started(backend);
        assert!(console.get_input().is_err());
        assert_eq!(row(&console, 3), "> abc");
        assert_eq!(console.current_command(), "abc");
        assert_eq!(console.with_backend(|b| b.cursor()), (3, 5));
    }

    #[test]
    fn mutating_logs_repaints_display() {
        let console = started(ScriptedBackend::new(4, 20));
        console.logs().push("first");
        console.logs().push("second");
        assert_eq!(row(&console, 1), "first");
        assert_eq!(row(&console, 2), "second");

        console.logs().clear();
        assert_eq!(row(&console, 2), "");
    }

    #[test]
    fn content_added_before_start_is_drawn_on_start() {
        let console = Console::new(ScriptedBackend::new(4, 20), ConsoleOptions::default());
        console.header().push("title");
        assert_eq!(console.with_backend(|b| b.draw_count()), 0);
        console.start().unwrap();
        assert_eq!(row(&console, 0), "title");
    }

    #[test]
    fn header_footer_and_alignment() {
        let console = started(ScriptedBackend::new(6, 20));
        console.header().push("HEAD");
        console.footer().push("FOOT");
        console.logs().push("log");
        assert_eq!(row(&console, 0), "HEAD");
        assert_eq!(row(&console, 3), "log");
        assert_eq!(row(&console, 4), "FOOT");

        console.set_logs_align_top(true);
        assert!(console.logs_align_top());
        assert_eq!(row(&console, 1), "log");
        assert_eq!(row(&console, 3), "");
    }

    #[test]
    fn input_bar_can_move_to_top() {
        let console = started(ScriptedBackend::new(4, 20));
        console.logs().push("entry");
        console.set_input_align_top(true);
        assert!(console.input_align_top());
        assert_eq!(row(&console, 0), ">");
        assert_eq!(row(&console, 3), "entry");
    }

    #[test]
    fn styled_entries_keep_their_style() {
        let console = started(ScriptedBackend::new(3, 20));
        let red = Style::default().fg(Color::Red);
        console.logs().push(LogEntry::new().text("a").styled(red, "b"));
        let (plain, styled) = console.with_backend(|b| (b.screen()[(0, 1)].fg, b.screen()[(1, 1)].fg));
        assert_eq!(plain, Color::Reset);
        assert_eq!(styled, Color::Red);
    }

    #[test]
    fn history_recall_through_events() {
        let backend = ScriptedBackend::new(4, 20)
            .with_line("one")
            .with_line("two")
            .with_events([
                ConsoleEvent::RecallPrevious,
                ConsoleEvent::RecallPrevious,
                ConsoleEvent::Submit,
            ]);
        let console = started(backend);
        assert_eq!(console.get_input().unwrap(), "one");
        assert_eq!(console.get_input().unwrap(), "two");
        assert_eq!(console.get_input().unwrap(), "one");
        assert_eq!(console.command_history().to_vec(), vec!["one", "two", "one"]);
    }

    #[test]
    fn current_command_index_round_trip() {
        let console = started(ScriptedBackend::new(4, 20).with_line("ls").with_line("pwd"));
        console.get_input().unwrap();
        console.get_input().unwrap();

        console.set_current_command_index(2).unwrap();
        assert_eq!(console.current_command(), "ls");
        assert_eq!(row(&console, 3), "> ls");
        assert!(matches!(
            console.set_current_command_index(3),
            Err(ConsoleError::IndexOutOfRange { index: 3, len: 2 })
        ));

        console.set_current_command("draft");
        assert_eq!(console.current_command_index(), 0);
        assert_eq!(row(&console, 3), "> draft");
    }

    #[test]
    fn editing_history_resets_recall_and_clamps() {
        let options = ConsoleOptions {
            history_capacity: 2,
            ..ConsoleOptions::default()
        };
        let console = Console::new(ScriptedBackend::new(4, 20), options);
        console.start().unwrap();
        console.command_history().extend(["a", "b", "c"].map(String::from));
        assert_eq!(console.command_history().to_vec(), vec!["b", "c"]);

        console.set_current_command_index(1).unwrap();
        console.command_history().push("d");
        assert_eq!(console.current_command_index(), 0);
        assert_eq!(console.command_history().to_vec(), vec!["c", "d"]);
    }

    #[test]
    fn resize_relayouts_and_calls_back() {
        let seen = Rc::new(Cell::new(None));
        let options = ConsoleOptions {
            resize_callback: Some(Box::new({
                let seen = seen.clone();
                move |size| seen.set(Some(size))
            })),
            ..ConsoleOptions::default()
        };
        let backend = ScriptedBackend::new(4, 20).with_events([ConsoleEvent::Resize(30, 6)]);
        let console = Console::new(backend, options);
        console.start().unwrap();
        console.logs().push("kept");

        assert!(console.get_input().is_err());
        let size = ConsoleSize { width: 30, height: 6 };
        assert_eq!(seen.get(), Some(size));
        assert_eq!(console.size(), size);
        assert_eq!(row(&console, 4), "kept");
        assert_eq!(row(&console, 5), ">");
    }

    #[test]
    fn resize_callback_may_mutate_console() {
        let slot: Rc<RefCell<Option<Console<ScriptedBackend>>>> = Rc::default();
        let options = ConsoleOptions {
            resize_callback: Some(Box::new({
                let slot = slot.clone();
                move |size| {
                    if let Some(console) = slot.borrow().as_ref() {
                        console.logs().push(format!("{}x{}", size.width, size.height));
                    }
                }
            })),
            ..ConsoleOptions::default()
        };
        let backend = ScriptedBackend::new(4, 20).with_events([ConsoleEvent::Resize(20, 5)]);
        let console = Console::new(backend, options);
        *slot.borrow_mut() = Some(console.clone());
        console.start().unwrap();

        assert!(console.get_input().is_err());
        assert_eq!(console.logs().to_vec(), vec![LogEntry::from("20x5")]);
        assert_eq!(row(&console, 3), "20x5");
        slot.borrow_mut().take();
    }

    #[test]
    fn resize_to_nothing_draws_nothing() {
        for (columns, rows) in [(0, 10), (10, 0), (2, 10)] {
            let backend = ScriptedBackend::new(4, 20).with_events([ConsoleEvent::Resize(columns, rows)]);
            let console = started(backend);
            let before = console.with_backend(|b| b.draw_count());

            let err = console.get_input().unwrap_err();
            assert!(matches!(err, ConsoleError::Io(_)), "{columns}x{rows}");
            console.logs().push("invisible");
            console.set_current_command("x");
            assert_eq!(console.with_backend(|b| b.draw_count()), before);
            console.redraw().unwrap();
            assert_eq!(console.with_backend(|b| b.draw_count()), before);
        }
    }

    #[test]
    fn ctrl_c_interrupts() {
        let backend = ScriptedBackend::new(4, 20).with_events([ConsoleEvent::Char('x'), ConsoleEvent::Interrupt]);
        let console = started(backend);
        assert!(matches!(console.get_input(), Err(ConsoleError::Interrupted)));
        assert_eq!(console.current_command(), "x");
    }

    #[test]
    fn inputs_stop_at_empty_line() {
        let backend = ScriptedBackend::new(4, 20)
            .with_line("a")
            .with_line("b")
            .with_line("")
            .with_line("never");
        let console = started(backend);
        let lines: Vec<String> = console.inputs().map(Result::unwrap).collect();
        assert_eq!(lines, vec!["a", "b"]);
        assert_eq!(console.with_backend(|b| b.pending()), 6);
    }

    #[test]
    fn inputs_end_after_error() {
        let console = started(ScriptedBackend::new(4, 20).with_line("a"));
        let results: Vec<_> = console.inputs().collect();
        assert_eq!(results.len(), 2);
        assert!(results[1].is_err());
    }

    #[test]
    fn long_input_scrolls_to_keep_cursor_visible() {
        let backend = ScriptedBackend::new(2, 7).with_events("abcdefgh".chars().map(ConsoleEvent::Char));
        let console = started(backend);
        assert!(console.get_input().is_err());
        assert_eq!(row(&console, 1), "> efgh");
        assert_eq!(console.with_backend(|b| b.cursor()), (1, 6));

        console.with_backend(|b| b.push_event(ConsoleEvent::Edit(EditKey::Home)));
        assert!(console.get_input().is_err());
        assert_eq!(row(&console, 1), "> abcde");
        assert_eq!(console.with_backend(|b| b.cursor()), (1, 2));
    }

    #[test]
    fn edits_made_inside_with_backend_catch_up_afterwards() {
        let options = ConsoleOptions {
            history_capacity: 2,
            ..ConsoleOptions::default()
        };
        let console = Console::new(ScriptedBackend::new(4, 20), options);
        console.start().unwrap();

        let draws = console.with_backend(|b| {
            console.logs().push("from inside");
            console.command_history().extend(["a", "b", "c"]);
            b.draw_count()
        });
        assert!(console.with_backend(|b| b.draw_count()) > draws);
        assert_eq!(row(&console, 2), "from inside");
        assert_eq!(console.command_history().to_vec(), vec!["b", "c"]);
    }

    #[test]
    fn stop_is_idempotent_and_final() {
        let console = started(ScriptedBackend::new(4, 20));
        console.stop();
        console.stop();
        assert_eq!(console.with_backend(|b| b.shutdown_count()), 1);
        assert!(matches!(console.start(), Err(ConsoleError::InvalidOperation(_))));
        assert!(matches!(console.redraw(), Err(ConsoleError::InvalidOperation(_))));
        console.logs().push("ignored after stop");
    }

    #[test]
    fn dropping_last_handle_shuts_down() {
        let backend = ScriptedBackend::new(4, 20);
        let shutdowns = backend.shutdown_counter();
        let console = started(backend);
        let clone = console.clone();
        let logs = console.logs().clone();
        drop(console);
        assert!(clone.is_running());
        assert_eq!(shutdowns.get(), 0);
        drop(clone);
        assert_eq!(shutdowns.get(), 1);
        logs.push("console gone");
        assert_eq!(logs.len(), 1);
    }

    #[test]
    fn dropping_a_stopped_console_does_not_shut_down_twice() {
        let backend = ScriptedBackend::new(4, 20);
        let shutdowns = backend.shutdown_counter();
        let console = started(backend);
        console.stop();
        drop(console);
        assert_eq!(shutdowns.get(), 1);
    }

    #[test]
    fn size_failure_during_start_releases_the_terminal() {
        let backend = ScriptedBackend::new(4, 20).failing_size();
        let shutdowns = backend.shutdown_counter();
        let console = Console::new(backend, ConsoleOptions::default());
        assert!(matches!(console.start(), Err(ConsoleError::Io(_))));
        assert!(!console.is_running());
        assert!(!console.with_backend(|b| b.is_initialized()));
        assert_eq!(shutdowns.get(), 1);
        drop(console);
        assert_eq!(shutdowns.get(), 1);
    }

    #[test]
    fn init_failure_never_shuts_down() {
        let backend = ScriptedBackend::new(4, 20).failing_init();
        let shutdowns = backend.shutdown_counter();
        let console = Console::new(backend, ConsoleOptions::default());
        assert!(console.start().is_err());
        drop(console);
        assert_eq!(shutdowns.get(), 0);
    }

    fn script() -> ScriptedBackend {
        ScriptedBackend::new(5, 20)
            .with_line("help")
            .with_events([ConsoleEvent::Resize(24, 6), ConsoleEvent::RecallPrevious])
            .with_events([ConsoleEvent::Edit(EditKey::Backspace), ConsoleEvent::Submit])
            .with_line("")
    }

    #[tokio::test]
    async fn blocking_and_cooperative_loops_agree() {
        let blocking = started(script());
        let blocking_lines: Vec<String> = blocking.inputs().map(Result::unwrap).collect();

        let cooperative = started(script());
        let mut cooperative_lines = Vec::new();
        loop {
            let line = cooperative.get_input_async().await.unwrap();
            if line.is_empty() {
                break;
            }
            cooperative_lines.push(line);
        }

        assert_eq!(blocking_lines, vec!["help", "hel"]);
        assert_eq!(blocking_lines, cooperative_lines);
        assert_eq!(
            blocking.command_history().to_vec(),
            cooperative.command_history().to_vec()
        );
        assert_eq!(
            blocking.with_backend(|b| b.screen_string()),
            cooperative.with_backend(|b| b.screen_string())
        );
    }

    #[tokio::test]
    async fn cancelled_input_keeps_applied_events() {
        let console = started(ScriptedBackend::new(4, 20).with_events([
            ConsoleEvent::Char('a'),
            ConsoleEvent::Char('b'),
        ]));

        let waited =
            tokio::time::timeout(Duration::from_millis(50), console.get_input_async()).await;
        assert!(waited.is_err());
        assert_eq!(console.current_command(), "ab");
        assert_eq!(row(&console, 3), "> ab");
        assert_eq!(console.with_backend(|b| b.cursor()), (3, 4));
        assert!(console.command_history().is_empty());

        console.with_backend(|b| b.push_line("c"));
        assert_eq!(console.get_input_async().await.unwrap(), "abc");
        assert_eq!(console.command_history().to_vec(), vec!["abc"]);
        assert_eq!(row(&console, 3), ">");
    }

    #[tokio::test]
    async fn timer_task_runs_while_waiting_for_input() {
        use futures::StreamExt;

        let backend = ScriptedBackend::new(5, 20)
            .with_events(std::iter::repeat_n(ConsoleEvent::NoEvent, 20))
            .with_line("done")
            .with_line("");
        let console = started(backend);

        let local = tokio::task::LocalSet::new();
        let ticker = console.clone();
        local.spawn_local(async move {
            for i in 0..3 {
                ticker.logs().push(format!("tick {i}"));
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        });

        let lines: Vec<String> = local
            .run_until(console.input_stream().map(Result::unwrap).collect())
            .await;
        assert_eq!(lines, vec!["done"]);
        assert_eq!(console.logs().len(), 3);
        assert_eq!(row(&console, 3), "tick 2");
    }
}
