//! **snapconsole** -- an embeddable terminal console for [`ratatui`] apps.
//!
//! This is the umbrella crate that re-exports everything you need from a
//! single dependency:
//!
//! ```toml
//! [dependencies]
//! snapconsole = "0.1"
//! ```
//!
//! # Re-exports
//!
//! * All public items from [`snapconsole_core`] are available at the crate
//!   root ([`Console`], [`ConsoleOptions`], [`LogEntry`],
//!   [`ObservableSequence`], [`TerminalBackend`], etc.).
//! * [`ratatui`], [`crossterm`], and [`tokio`] are re-exported so downstream
//!   crates do not need to depend on them directly.
//!
//! # Quick start
//!
//! ```no_run
//! use snapconsole::ConsoleOptions;
//!
//! fn main() -> Result<(), snapconsole::ConsoleError> {
//!     let console = snapconsole::open(ConsoleOptions::default())?;
//!     for line in console.inputs() {
//!         let line = line?;
//!         console.logs().push(format!("> {line}"));
//!     }
//!     console.stop();
//!     Ok(())
//! }
//! ```

pub use snapconsole_core::*;

// Re-export dependencies for use in demos and downstream crates
pub use crossterm;
pub use ratatui;
pub use tokio;

/// Create a console on the real terminal and start it.
///
/// Shorthand for [`Console::new`] with a default [`TerminalBackend`]
/// followed by [`Console::start`].
pub fn open(options: ConsoleOptions) -> Result<Console<TerminalBackend>, ConsoleError> {
    open_with(TerminalOptions::default(), options)
}

/// Like [`open`], with explicit terminal options.
pub fn open_with(
    terminal: TerminalOptions,
    options: ConsoleOptions,
) -> Result<Console<TerminalBackend>, ConsoleError> {
    let console = Console::new(TerminalBackend::new(terminal), options);
    console.start()?;
    Ok(console)
}

/// Open a log file for debugging console applications.
///
/// The terminal is in raw mode while a console runs, so diagnostics have to
/// go somewhere else. The file is opened in append mode and can be handed to
/// a `tracing` subscriber as its writer.
///
/// # Example
///
/// ```no_run
/// use std::io::Write;
///
/// let mut f = snapconsole::log_to_file("debug.log").unwrap();
/// writeln!(f, "debug message").unwrap();
/// ```
pub fn log_to_file(path: impl AsRef<std::path::Path>) -> Result<std::fs::File, std::io::Error> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
}
