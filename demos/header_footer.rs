//! # Header & Footer Example
//!
//! Pins two rows above and two rows below the scrolling logs, and shows the
//! list-style operations available on every observable sequence. Each step
//! waits for "Enter".
//!
//! Run with: `cargo run --example header_footer`

use snapconsole::{ConsoleError, ConsoleOptions, LogEntry};

fn main() -> Result<(), ConsoleError> {
    let console = snapconsole::open(ConsoleOptions::default())?;

    console.header().extend(["Header line 1", "Header line 2"]);
    console.footer().extend(["Footer line 1", "Footer line 2"]);

    // Whole-sequence assignment
    console
        .logs()
        .replace(vec!["Log 1".into(), "Log 2".into(), "Log 3".into()]);
    console.get_input()?;

    // In-place concatenation and repetition
    console.logs().extend(["Log 4", "Log 5"]);
    console.logs().repeat(3);
    console.get_input()?;

    // Keep the last five entries
    let len = console.logs().len();
    console
        .logs()
        .splice(..len.saturating_sub(5), std::iter::empty::<LogEntry>())?;
    console.get_input()?;

    console.logs().pop();
    console.logs().pop();
    console.get_input()?;

    console.logs().push("Press \"Enter\" to continue");
    console.get_input()?;

    console.stop();
    Ok(())
}
