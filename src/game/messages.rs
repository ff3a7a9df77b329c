//! The in-game message log.
//!
//! Each engine owns one log. It keeps the cumulative history shown in the HUD and a
//! separate buffer of what happened during the current step, which is what remote
//! clients receive.

use crate::game::color;
use crate::Rgb;
use serde::{Deserialize, Serialize};

/// A log line. Consecutive duplicates are folded into one message with a count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub plain_text: String,
    pub fg: Rgb,
    pub count: u32,
}

impl Message {
    pub fn new(text: impl Into<String>, fg: Rgb) -> Self {
        Self {
            plain_text: text.into(),
            fg,
            count: 1,
        }
    }

    /// Text with a `(xN)` suffix when the message repeated.
    pub fn full_text(&self) -> String {
        if self.count > 1 {
            format!("{} (x{})", self.plain_text, self.count)
        } else {
            self.plain_text.clone()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<Message>,
    step_messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends to both the history and the current step.
    pub fn add_message(&mut self, text: impl Into<String>, fg: Rgb) {
        let text = text.into();
        push_stacked(&mut self.messages, &text, fg);
        push_stacked(&mut self.step_messages, &text, fg);
    }

    /// Adds a plain white message.
    pub fn add(&mut self, text: impl Into<String>) {
        self.add_message(text, color::WHITE);
    }

    /// Forgets the previous step's messages.
    pub fn start_new_step(&mut self) {
        self.step_messages.clear();
    }

    /// Empties both buffers.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.step_messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn step_messages(&self) -> &[Message] {
        &self.step_messages
    }

    /// The current step's messages with repeat counts folded in.
    pub fn step_texts(&self) -> Vec<String> {
        self.step_messages.iter().map(Message::full_text).collect()
    }

    /// Word-wraps `text` to `width` columns.
    pub fn wrap(text: &str, width: usize) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.lines() {
            let mut line = String::new();
            for word in paragraph.split_whitespace() {
                if !line.is_empty() && line.len() + 1 + word.len() > width {
                    lines.push(std::mem::take(&mut line));
                }
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(word);
            }
            if !line.is_empty() {
                lines.push(line);
            }
        }
        lines
    }
}

fn push_stacked(buffer: &mut Vec<Message>, text: &str, fg: Rgb) {
    match buffer.last_mut() {
        Some(last) if last.plain_text == text => last.count += 1,
        _ => buffer.push(Message::new(text, fg)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consecutive_messages_stack() {
        let mut log = MessageLog::new();
        log.add("Ghost attacks Player for 2 hit points.");
        log.add("Ghost attacks Player for 2 hit points.");
        log.add("You wait.");
        log.add("Ghost attacks Player for 2 hit points.");

        assert_eq!(log.messages().len(), 3);
        assert_eq!(
            log.messages()[0].full_text(),
            "Ghost attacks Player for 2 hit points. (x2)"
        );
        assert_eq!(log.messages()[2].full_text(), "Ghost attacks Player for 2 hit points.");
    }

    #[test]
    fn test_step_buffer_resets_but_history_stays() {
        let mut log = MessageLog::new();
        log.add("one");
        log.start_new_step();
        log.add("two");
        log.add("two");

        assert_eq!(log.step_texts(), vec!["two (x2)".to_string()]);
        assert_eq!(log.messages().len(), 2);

        log.clear();
        assert!(log.messages().is_empty());
        assert!(log.step_messages().is_empty());
    }

    #[test]
    fn test_wrap() {
        let lines = MessageLog::wrap("You consume the Health Potion, and recover 5 HP!", 20);
        assert!(lines.iter().all(|line| line.len() <= 20));
        assert_eq!(lines.join(" "), "You consume the Health Potion, and recover 5 HP!");
    }
}
