//! The input field state machine.
//!
//! [`InputController`] owns the live edit buffer, the cursor, and the recall
//! index. It never touches the terminal: the console feeds it events, paints
//! whatever [`displayed`](InputController::displayed) returns, and acts on the
//! returned [`Transition`]. Keeping the transition logic here lets the
//! blocking and cooperative input loops share it verbatim.

use crate::error::ConsoleError;
use crate::event::{ConsoleEvent, EditKey};
use crate::history::CommandHistory;

/// The outcome of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// No event was available; the caller should wait before polling again.
    Idle,
    /// The event was consumed; keep reading.
    Continue,
    /// The terminal changed size; the caller must re-layout and repaint.
    Resized(u16, u16),
    /// The user submitted this text. Ends the current input call.
    Submitted(String),
    /// The user pressed Ctrl+C.
    Interrupted,
}

/// Live buffer, cursor, and history recall position for the input field.
///
/// `recall_index == 0` shows the live buffer; `k > 0` shows the `k`-th most
/// recent history entry. Cursor movement leaves the recall index alone, but
/// any change to the text made while a history entry is shown first adopts
/// that entry as the new live buffer.
#[derive(Debug, Clone, Default)]
pub struct InputController {
    buffer: Vec<char>,
    cursor: usize,
    recall_index: usize,
}

impl InputController {
    /// Create a controller with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event against `history`.
    pub fn apply(&mut self, event: ConsoleEvent, history: &CommandHistory) -> Transition {
        match event {
            ConsoleEvent::NoEvent => Transition::Idle,
            ConsoleEvent::Resize(columns, rows) => Transition::Resized(columns, rows),
            ConsoleEvent::Interrupt => Transition::Interrupted,
            ConsoleEvent::Submit => Transition::Submitted(self.submit(history)),
            ConsoleEvent::RecallPrevious => {
                let index = (self.recall_index + 1).min(history.len());
                self.show_recall(index, history);
                Transition::Continue
            }
            ConsoleEvent::RecallNext => {
                let index = self.recall_index.saturating_sub(1);
                self.show_recall(index, history);
                Transition::Continue
            }
            ConsoleEvent::Char(c) => {
                self.adopt(history);
                if !c.is_control() {
                    self.insert(c);
                }
                Transition::Continue
            }
            ConsoleEvent::Paste(text) => {
                self.adopt(history);
                for c in text.chars().filter(|c| !c.is_control()) {
                    self.insert(c);
                }
                Transition::Continue
            }
            ConsoleEvent::Edit(key) => {
                let shown = self.displayed(history).chars().count();
                if !self.move_cursor(key, shown) {
                    self.adopt(history);
                    self.edit(key);
                }
                Transition::Continue
            }
            ConsoleEvent::Control(_) => Transition::Continue,
        }
    }

    /// The text currently shown in the input field.
    pub fn displayed(&self, history: &CommandHistory) -> String {
        match history.recall(self.recall_index) {
            Ok(Some(entry)) => entry,
            _ => self.live_buffer(),
        }
    }

    /// The live edit buffer, regardless of recall.
    pub fn live_buffer(&self) -> String {
        self.buffer.iter().collect()
    }

    /// Cursor position, in characters, within the displayed text.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Current recall index (`0` = live buffer).
    pub fn recall_index(&self) -> usize {
        self.recall_index
    }

    /// Replace the live buffer, leave recall, and move the cursor to the end.
    pub fn set_current_command(&mut self, text: &str) {
        self.buffer = text.chars().collect();
        self.cursor = self.buffer.len();
        self.recall_index = 0;
    }

    /// Show the `k`-th most recent history entry (`0` = live buffer).
    pub fn set_recall_index(&mut self, k: usize, history: &CommandHistory) -> Result<(), ConsoleError> {
        if k > history.len() {
            return Err(ConsoleError::IndexOutOfRange {
                index: k,
                len: history.len(),
            });
        }
        self.show_recall(k, history);
        Ok(())
    }

    /// Return to the live buffer, e.g. after the history was edited.
    pub fn reset_recall(&mut self) {
        self.recall_index = 0;
        self.cursor = self.buffer.len();
    }

    fn show_recall(&mut self, index: usize, history: &CommandHistory) {
        self.recall_index = index;
        self.cursor = self.displayed(history).chars().count();
    }

    fn adopt(&mut self, history: &CommandHistory) {
        if self.recall_index > 0 {
            let shown = self.displayed(history);
            self.buffer = shown.chars().collect();
            self.cursor = self.cursor.min(self.buffer.len());
            self.recall_index = 0;
        }
    }

    fn submit(&mut self, history: &CommandHistory) -> String {
        let text = self.displayed(history);
        history.append(text.clone());
        self.buffer.clear();
        self.cursor = 0;
        self.recall_index = 0;
        text
    }

    fn insert(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += 1;
    }

    /// Handle the keys that only move the cursor. `len` is the length of the
    /// displayed text, which may be a recalled entry.
    fn move_cursor(&mut self, key: EditKey, len: usize) -> bool {
        self.cursor = match key {
            EditKey::Left => self.cursor.saturating_sub(1),
            EditKey::Right => (self.cursor + 1).min(len),
            EditKey::Home => 0,
            EditKey::End => len,
            _ => return false,
        };
        true
    }

    fn edit(&mut self, key: EditKey) {
        match key {
            EditKey::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.buffer.remove(self.cursor);
                }
            }
            EditKey::Delete => {
                if self.cursor < self.buffer.len() {
                    self.buffer.remove(self.cursor);
                }
            }
            EditKey::Left | EditKey::Right | EditKey::Home | EditKey::End => {
                self.move_cursor(key, self.buffer.len());
            }
            EditKey::KillToEnd => self.buffer.truncate(self.cursor),
            EditKey::KillToStart => {
                self.buffer.drain(..self.cursor);
                self.cursor = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(entries: &[&str]) -> CommandHistory {
        let history = CommandHistory::new(100);
        for e in entries {
            history.append(*e);
        }
        history
    }

    fn type_str(input: &mut InputController, text: &str, history: &CommandHistory) {
        for c in text.chars() {
            assert_eq!(input.apply(ConsoleEvent::Char(c), history), Transition::Continue);
        }
    }

    #[test]
    fn typing_fills_live_buffer() {
        let h = history(&[]);
        let mut input = InputController::new();
        type_str(&mut input, "hello", &h);
        assert_eq!(input.displayed(&h), "hello");
        assert_eq!(input.cursor(), 5);
    }

    #[test]
    fn submit_returns_text_and_records_history() {
        let h = history(&[]);
        let mut input = InputController::new();
        type_str(&mut input, "help", &h);
        assert_eq!(
            input.apply(ConsoleEvent::Submit, &h),
            Transition::Submitted("help".into())
        );
        assert_eq!(input.displayed(&h), "");
        assert_eq!(h.entries(), vec!["help"]);

        type_str(&mut input, "help", &h);
        input.apply(ConsoleEvent::Submit, &h);
        assert_eq!(h.entries(), vec!["help"]);
    }

    #[test]
    fn recall_previous_saturates_at_history_length() {
        let h = history(&["a", "b", "c"]);
        for k in 0..6 {
            let mut input = InputController::new();
            for _ in 0..k {
                input.apply(ConsoleEvent::RecallPrevious, &h);
            }
            assert_eq!(input.recall_index(), k.min(3));
        }
    }

    #[test]
    fn recall_next_from_live_stays_at_zero() {
        let h = history(&["a"]);
        let mut input = InputController::new();
        input.apply(ConsoleEvent::RecallNext, &h);
        assert_eq!(input.recall_index(), 0);
    }

    #[test]
    fn recall_shows_entries_and_returns_to_live_buffer() {
        let h = history(&["first", "second"]);
        let mut input = InputController::new();
        type_str(&mut input, "draft", &h);

        input.apply(ConsoleEvent::RecallPrevious, &h);
        assert_eq!(input.displayed(&h), "second");
        assert_eq!(input.cursor(), 6);
        input.apply(ConsoleEvent::RecallPrevious, &h);
        assert_eq!(input.displayed(&h), "first");
        input.apply(ConsoleEvent::RecallNext, &h);
        input.apply(ConsoleEvent::RecallNext, &h);
        assert_eq!(input.displayed(&h), "draft");
        assert_eq!(input.cursor(), 5);
    }

    #[test]
    fn submitting_a_recalled_entry() {
        let h = history(&["help", "add x"]);
        let mut input = InputController::new();
        type_str(&mut input, "partial", &h);
        input.apply(ConsoleEvent::RecallPrevious, &h);
        input.apply(ConsoleEvent::RecallPrevious, &h);

        assert_eq!(
            input.apply(ConsoleEvent::Submit, &h),
            Transition::Submitted("help".into())
        );
        assert_eq!(h.entries(), vec!["help", "add x", "help"]);
        assert_eq!(input.recall_index(), 0);
        assert_eq!(input.displayed(&h), "");
    }

    #[test]
    fn typing_on_recalled_entry_adopts_it() {
        let h = history(&["git status"]);
        let mut input = InputController::new();
        input.apply(ConsoleEvent::RecallPrevious, &h);
        type_str(&mut input, "!", &h);
        assert_eq!(input.recall_index(), 0);
        assert_eq!(input.live_buffer(), "git status!");
    }

    #[test]
    fn cursor_keys_on_recalled_entry_keep_the_draft() {
        let h = history(&["git status"]);
        let mut input = InputController::new();
        type_str(&mut input, "draft", &h);

        input.apply(ConsoleEvent::RecallPrevious, &h);
        input.apply(ConsoleEvent::Edit(EditKey::Left), &h);
        assert_eq!(input.recall_index(), 1);
        assert_eq!(input.cursor(), 9);
        input.apply(ConsoleEvent::Edit(EditKey::Home), &h);
        assert_eq!(input.cursor(), 0);
        input.apply(ConsoleEvent::Edit(EditKey::End), &h);
        assert_eq!(input.cursor(), 10);
        assert_eq!(input.live_buffer(), "draft");

        input.apply(ConsoleEvent::RecallNext, &h);
        assert_eq!(input.displayed(&h), "draft");
        assert_eq!(input.cursor(), 5);
    }

    #[test]
    fn deleting_on_recalled_entry_adopts_it() {
        let h = history(&["git status"]);
        let mut input = InputController::new();
        type_str(&mut input, "draft", &h);
        input.apply(ConsoleEvent::RecallPrevious, &h);
        input.apply(ConsoleEvent::Edit(EditKey::Home), &h);
        input.apply(ConsoleEvent::Edit(EditKey::Delete), &h);
        assert_eq!(input.recall_index(), 0);
        assert_eq!(input.live_buffer(), "it status");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn editing_keys() {
        let h = history(&[]);
        let mut input = InputController::new();
        type_str(&mut input, "abcd", &h);

        input.apply(ConsoleEvent::Edit(EditKey::Left), &h);
        input.apply(ConsoleEvent::Edit(EditKey::Backspace), &h);
        assert_eq!(input.live_buffer(), "abd");
        assert_eq!(input.cursor(), 2);

        input.apply(ConsoleEvent::Edit(EditKey::Home), &h);
        input.apply(ConsoleEvent::Edit(EditKey::Delete), &h);
        assert_eq!(input.live_buffer(), "bd");

        input.apply(ConsoleEvent::Edit(EditKey::Right), &h);
        input.apply(ConsoleEvent::Edit(EditKey::KillToEnd), &h);
        assert_eq!(input.live_buffer(), "b");

        input.apply(ConsoleEvent::Edit(EditKey::End), &h);
        type_str(&mut input, "xy", &h);
        input.apply(ConsoleEvent::Edit(EditKey::Left), &h);
        input.apply(ConsoleEvent::Edit(EditKey::KillToStart), &h);
        assert_eq!(input.live_buffer(), "y");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn editing_at_bounds_is_harmless() {
        let h = history(&[]);
        let mut input = InputController::new();
        input.apply(ConsoleEvent::Edit(EditKey::Backspace), &h);
        input.apply(ConsoleEvent::Edit(EditKey::Delete), &h);
        input.apply(ConsoleEvent::Edit(EditKey::Left), &h);
        input.apply(ConsoleEvent::Edit(EditKey::Right), &h);
        assert_eq!(input.live_buffer(), "");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn paste_inserts_printable_text() {
        let h = history(&[]);
        let mut input = InputController::new();
        input.apply(ConsoleEvent::Paste("one\ttwo".into()), &h);
        assert_eq!(input.live_buffer(), "onetwo");
    }

    #[test]
    fn non_input_events() {
        let h = history(&[]);
        let mut input = InputController::new();
        assert_eq!(input.apply(ConsoleEvent::NoEvent, &h), Transition::Idle);
        assert_eq!(
            input.apply(ConsoleEvent::Resize(80, 24), &h),
            Transition::Resized(80, 24)
        );
        assert_eq!(input.apply(ConsoleEvent::Interrupt, &h), Transition::Interrupted);
    }

    #[test]
    fn set_recall_index_is_bounded() {
        let h = history(&["a", "b"]);
        let mut input = InputController::new();
        input.set_recall_index(2, &h).unwrap();
        assert_eq!(input.displayed(&h), "a");
        assert!(matches!(
            input.set_recall_index(3, &h),
            Err(ConsoleError::IndexOutOfRange { index: 3, len: 2 })
        ));
        assert_eq!(input.recall_index(), 2);
    }

    #[test]
    fn set_current_command_leaves_recall() {
        let h = history(&["a"]);
        let mut input = InputController::new();
        input.apply(ConsoleEvent::RecallPrevious, &h);
        input.set_current_command("typed");
        assert_eq!(input.recall_index(), 0);
        assert_eq!(input.displayed(&h), "typed");
        assert_eq!(input.cursor(), 5);
    }
}
