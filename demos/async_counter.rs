//! # Async Counter Example
//!
//! Reads input cooperatively while a timer task on the same thread appends a
//! counter to the logs once a second. Submit an empty line to quit.
//!
//! Run with: `cargo run --example async_counter`

use std::sync::Mutex;
use std::time::Duration;

use futures::StreamExt;
use snapconsole::{ConsoleError, ConsoleOptions};
use tokio::task::LocalSet;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ConsoleError> {
    let log = snapconsole::log_to_file("async_counter.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .init();

    let console = snapconsole::open(ConsoleOptions::default())?;
    console.logs().push("Type anything and press \"Enter\"");

    let local = LocalSet::new();
    let ticker = console.clone();
    let counter = local.spawn_local(async move {
        for n in 1u64.. {
            tokio::time::sleep(Duration::from_secs(1)).await;
            ticker.logs().push(format!("Counter: {n}"));
        }
    });

    let result = local
        .run_until(async {
            let mut lines = std::pin::pin!(console.input_stream());
            while let Some(line) = lines.next().await {
                console.logs().push(format!("ECHO: {}", line?));
            }
            Ok::<(), ConsoleError>(())
        })
        .await;

    counter.abort();
    console.stop();
    result
}
