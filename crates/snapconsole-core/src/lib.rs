//! Core engine for the **snapconsole** terminal console.
//!
//! `snapconsole-core` provides an embeddable interactive console: a
//! scrollback display split into header, log, and footer regions above (or
//! below) a single-line input field with recallable command history.
//!
//! # Key types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Console`] | The session: owns the terminal and runs the input loop |
//! | [`ConsoleOptions`] | History capacity, segmenter, alignment, resize callback |
//! | [`ObservableSequence`] | A list that repaints the console whenever it changes |
//! | [`LogEntry`] | One header, log, or footer entry made of text and style segments |
//! | [`Backend`] | The terminal collaborator; [`TerminalBackend`] drives a real one |
//! | [`ScriptedBackend`](testing::ScriptedBackend) | Headless backend for testing without a terminal |
//!
//! # Architecture
//!
//! 1. **content** -- The application pushes [`LogEntry`]s into
//!    [`Console::logs`], [`Console::header`] or [`Console::footer`]. Every
//!    mutation repaints the display synchronously.
//! 2. **compose** -- The [`Compositor`](compositor::Compositor) wraps entries
//!    to the display width and fills exactly one screen of rows: footer
//!    first, then header, then the newest logs.
//! 3. **input** -- [`Console::get_input`] (blocking) or
//!    [`Console::get_input_async`] (cooperative) feed backend events through
//!    the [`InputController`](input::InputController) until a line is
//!    submitted.
//! 4. **teardown** -- [`Console::stop`], or dropping the last handle,
//!    restores the terminal.
//!
//! # Quick example
//!
//! ```no_run
//! use snapconsole_core::{Console, ConsoleError, ConsoleOptions, TerminalBackend};
//!
//! fn main() -> Result<(), ConsoleError> {
//!     let console = Console::new(TerminalBackend::default(), ConsoleOptions::default());
//!     console.start()?;
//!     console.header().push("echo -- submit an empty line to quit");
//!     for line in console.inputs() {
//!         console.logs().push(line?);
//!     }
//!     console.stop();
//!     Ok(())
//! }
//! ```
//!
//! # Logging
//!
//! The crate emits [`tracing`] events (lifecycle at `debug`, swallowed draw
//! errors at `trace`, teardown failures at `warn`) and never installs a
//! subscriber. The terminal is in raw mode while a console runs, so point
//! your subscriber at a file.

pub mod backend;
pub mod compositor;
pub mod error;
pub mod event;
pub mod history;
pub mod input;
pub mod layout;
pub mod observable;
pub mod segment;
pub mod session;
pub mod surface;
pub mod testing;

pub use backend::{Backend, OutputTarget, TerminalBackend, TerminalOptions};
pub use error::{ConsoleError, DrawError};
pub use event::{ConsoleEvent, EditKey};
pub use layout::ConsoleSize;
pub use observable::ObservableSequence;
pub use segment::{LogEntry, Segment, Segmenter, WrappedLine};
pub use session::{Console, ConsoleOptions};
