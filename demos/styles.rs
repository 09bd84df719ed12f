//! # Styles Example
//!
//! Log entries mix text runs with style markers. A marker replaces the
//! active style for everything after it, including the rows it wraps onto.
//!
//! Run with: `cargo run --example styles`

use snapconsole::ratatui::style::{Color, Modifier, Style};
use snapconsole::{ConsoleError, ConsoleOptions, LogEntry};

fn main() -> Result<(), ConsoleError> {
    let console = snapconsole::open(ConsoleOptions::default())?;

    let normal = Style::default();
    let swatches = [
        ("Blue", Style::default().fg(Color::Blue)),
        ("Cyan", Style::default().fg(Color::Cyan)),
        ("Green", Style::default().fg(Color::Green)),
        ("Magenta", Style::default().fg(Color::Magenta)),
        ("Red", Style::default().fg(Color::Red)),
        ("Yellow", Style::default().fg(Color::Yellow)),
        ("White on blue", Style::default().fg(Color::White).bg(Color::Blue)),
        (
            "White on blue + bold",
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        ),
        ("Italic", Style::default().add_modifier(Modifier::ITALIC)),
        ("Underline", Style::default().add_modifier(Modifier::UNDERLINED)),
        ("Reverse", Style::default().add_modifier(Modifier::REVERSED)),
        ("Dim", Style::default().add_modifier(Modifier::DIM)),
    ];
    console
        .logs()
        .extend(swatches.map(|(name, style)| LogEntry::new().styled(style, name)));

    let banner = Style::default()
        .fg(Color::White)
        .bg(Color::Blue)
        .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK);
    console.logs().push(
        LogEntry::new()
            .text("Styles can be changed mid-log by adding ")
            .styled(Style::default().fg(Color::Blue), "attributes")
            .styled(normal, " into the middle of the text. Feel free to add ")
            .styled(Style::default().fg(Color::Green), "loads")
            .styled(normal, " of ")
            .styled(Style::default().fg(Color::White).bg(Color::Blue), "colors")
            .styled(normal, ", or even ")
            .styled(banner, "combine them"),
    );

    console.logs().push("Press \"Enter\" to continue");
    console.get_input()?;

    console.stop();
    Ok(())
}
