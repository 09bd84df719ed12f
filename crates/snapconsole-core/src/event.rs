use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Logical input events consumed by the console's input loop.
///
/// Backends classify raw terminal input into these variants. Resize arrives
/// through the same channel as key input, so the input loop sees events in
/// the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    /// Nothing was available on a non-blocking read.
    NoEvent,
    /// A printable character typed into the input field.
    Char(char),
    /// Bracketed paste content.
    Paste(String),
    /// Step back to an older history entry (Up).
    RecallPrevious,
    /// Step forward to a newer history entry (Down).
    RecallNext,
    /// Submit the input field (Enter).
    Submit,
    /// Terminal resized to (columns, rows).
    Resize(u16, u16),
    /// A line-editing key.
    Edit(EditKey),
    /// Ctrl+C.
    Interrupt,
    /// Any other key; ignored by the input field.
    Control(KeyEvent),
}

/// Line-editing operations on the input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    /// Delete the character before the cursor.
    Backspace,
    /// Delete the character under the cursor.
    Delete,
    /// Move the cursor one character left.
    Left,
    /// Move the cursor one character right.
    Right,
    /// Move the cursor to the start of the field.
    Home,
    /// Move the cursor to the end of the field.
    End,
    /// Delete from the cursor to the end of the field.
    KillToEnd,
    /// Delete from the start of the field to the cursor.
    KillToStart,
}

impl ConsoleEvent {
    /// Classify a crossterm event.
    ///
    /// Key releases, mouse, and focus events carry no meaning for the console
    /// and map to [`ConsoleEvent::NoEvent`]. Emacs-style control chords
    /// (`Ctrl+A`, `Ctrl+E`, `Ctrl+B`, `Ctrl+F`, `Ctrl+H`, `Ctrl+D`, `Ctrl+K`,
    /// `Ctrl+U`) map to the matching [`EditKey`].
    pub fn from_crossterm(event: Event) -> Self {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Release => ConsoleEvent::NoEvent,
            Event::Key(key) => Self::from_key(key),
            Event::Resize(columns, rows) => ConsoleEvent::Resize(columns, rows),
            Event::Paste(text) => ConsoleEvent::Paste(text),
            Event::Mouse(_) | Event::FocusGained | Event::FocusLost => ConsoleEvent::NoEvent,
        }
    }

    fn from_key(key: KeyEvent) -> Self {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => ConsoleEvent::Submit,
            (KeyCode::Up, _) => ConsoleEvent::RecallPrevious,
            (KeyCode::Down, _) => ConsoleEvent::RecallNext,
            (KeyCode::Char(c), m) if m.contains(KeyModifiers::CONTROL) => match c {
                'c' => ConsoleEvent::Interrupt,
                'a' => ConsoleEvent::Edit(EditKey::Home),
                'e' => ConsoleEvent::Edit(EditKey::End),
                'b' => ConsoleEvent::Edit(EditKey::Left),
                'f' => ConsoleEvent::Edit(EditKey::Right),
                'h' => ConsoleEvent::Edit(EditKey::Backspace),
                'd' => ConsoleEvent::Edit(EditKey::Delete),
                'k' => ConsoleEvent::Edit(EditKey::KillToEnd),
                'u' => ConsoleEvent::Edit(EditKey::KillToStart),
                _ => ConsoleEvent::Control(key),
            },
            (KeyCode::Char(c), m) if (m - KeyModifiers::SHIFT).is_empty() => ConsoleEvent::Char(c),
            (KeyCode::Backspace, _) => ConsoleEvent::Edit(EditKey::Backspace),
            (KeyCode::Delete, _) => ConsoleEvent::Edit(EditKey::Delete),
            (KeyCode::Left, _) => ConsoleEvent::Edit(EditKey::Left),
            (KeyCode::Right, _) => ConsoleEvent::Edit(EditKey::Right),
            (KeyCode::Home, _) => ConsoleEvent::Edit(EditKey::Home),
            (KeyCode::End, _) => ConsoleEvent::Edit(EditKey::End),
            _ => ConsoleEvent::Control(key),
        }
    }
}
