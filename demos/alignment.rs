//! # Alignment Example
//!
//! Starts with the input bar at the top and the logs anchored under the
//! header. Type `input` or `logs` to flip either alignment at runtime; an
//! empty line quits. Resizing the terminal is reported in the footer.
//!
//! Run with: `cargo run --example alignment`

use std::cell::RefCell;
use std::rc::Rc;

use snapconsole::{Console, ConsoleError, ConsoleOptions, TerminalBackend};

fn main() -> Result<(), ConsoleError> {
    let handle: Rc<RefCell<Option<Console<TerminalBackend>>>> = Rc::default();
    let options = ConsoleOptions {
        input_align_top: true,
        logs_align_top: true,
        resize_callback: Some(Box::new({
            let handle = handle.clone();
            move |size| {
                if let Some(console) = handle.borrow().as_ref() {
                    console
                        .footer()
                        .replace(vec![format!("Terminal is {}x{}", size.width, size.height).into()]);
                }
            }
        })),
        ..ConsoleOptions::default()
    };

    let console = snapconsole::open(options)?;
    *handle.borrow_mut() = Some(console.clone());

    console.header().push("Type \"input\" or \"logs\" to toggle alignment");
    let size = console.size();
    console
        .footer()
        .push(format!("Terminal is {}x{}", size.width, size.height));

    for line in console.inputs() {
        match line?.as_str() {
            "input" => console.set_input_align_top(!console.input_align_top()),
            "logs" => console.set_logs_align_top(!console.logs_align_top()),
            other => console.logs().push(format!("ECHO: {other}")),
        }
    }

    // Break the handle cycle so the console is dropped.
    handle.borrow_mut().take();
    console.stop();
    Ok(())
}
