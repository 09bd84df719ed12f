//! # Echo Example
//!
//! The smallest useful console: every submitted line is echoed into the
//! logs. Submit an empty line to quit.
//!
//! Diagnostics go to `echo.log`; set `RUST_LOG=snapconsole_core=debug` to see
//! the console lifecycle.
//!
//! Run with: `cargo run --example echo`

use std::sync::Mutex;

use snapconsole::{ConsoleError, ConsoleOptions};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), ConsoleError> {
    let log = snapconsole::log_to_file("echo.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .init();

    let console = snapconsole::open(ConsoleOptions::default())?;
    console.logs().push("Type anything and press \"Enter\"");

    for line in console.inputs() {
        let line = line?;
        tracing::info!(%line, "echo");
        console.logs().push(format!("ECHO: {line}"));
    }

    console.stop();
    Ok(())
}
