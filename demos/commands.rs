//! # Commands Example
//!
//! A tiny command interpreter holding one string value:
//! - `help` lists the commands
//! - `print` shows the value
//! - `add STRING` appends to it, `set STRING` replaces it
//! - `exit` (or an empty line) quits
//!
//! Use Up/Down to recall earlier commands.
//!
//! Run with: `cargo run --example commands`

use snapconsole::{Console, ConsoleError, ConsoleOptions, TerminalBackend};

const HELP: &str = "Commands: help, print, add [STRING], set [STRING], exit";

fn run(console: &Console<TerminalBackend>) -> Result<(), ConsoleError> {
    let mut value = String::new();
    console.logs().push(HELP);

    for line in console.inputs() {
        let line = line?;
        let (command, argument) = match line.split_once(' ') {
            Some((command, argument)) => (command.to_lowercase(), Some(argument)),
            None => (line.to_lowercase(), None),
        };

        match (command.as_str(), argument) {
            ("help", _) => console.logs().push(HELP),
            ("print", _) => console.logs().push(format!("Value: \"{value}\"")),
            ("add" | "set", None) => {
                console.logs().push(format!("Error: usage \"{command} [STRING]\""));
            }
            ("add", Some(argument)) => {
                value.push_str(argument);
                console.logs().push(format!("Updated value: \"{value}\""));
            }
            ("set", Some(argument)) => {
                value = argument.to_owned();
                console.logs().push(format!("Updated value: \"{value}\""));
            }
            ("exit", _) => break,
            _ => console.logs().push(format!("Unknown command: {command}")),
        }
    }
    Ok(())
}

fn main() -> Result<(), ConsoleError> {
    let console = snapconsole::open(ConsoleOptions::default())?;
    let result = run(&console);
    console.stop();
    result
}
