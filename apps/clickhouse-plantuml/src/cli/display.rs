//! Styled status lines on stderr.
//!
//! The diagram itself may be written to stdout, so every message a routine
//! shows goes to stderr.

use crossterm::{
    execute,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    tty::IsTty,
};
use std::io::{stderr, Result as IoResult, Write};

/// Width of the action column
pub const ACTION_WIDTH: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Success,
    Error,
}

impl MessageType {
    fn color(&self) -> Color {
        match self {
            MessageType::Info => Color::Cyan,
            MessageType::Success => Color::Green,
            MessageType::Error => Color::Red,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub action: String,
    pub details: String,
}

impl Message {
    pub fn new(action: String, details: String) -> Self {
        Self { action, details }
    }
}

macro_rules! show_message {
    ($message_type:expr, $message:expr) => {
        $crate::cli::display::show_message_wrapper($message_type, $message)
    };
}

pub fn show_message_wrapper(message_type: MessageType, message: Message) {
    let mut writer = stderr();
    let no_ansi = !writer.is_tty();
    // Nothing sensible is left to do when stderr is gone
    let _ = write_message_to(&mut writer, message_type, &message, no_ansi);
}

fn write_message_to<W: Write>(
    writer: &mut W,
    message_type: MessageType,
    message: &Message,
    no_ansi: bool,
) -> IoResult<()> {
    let action: String = message.action.chars().take(ACTION_WIDTH).collect();
    let padded_action = format!("{action:>ACTION_WIDTH$}");

    if no_ansi {
        execute!(writer, Print(&padded_action))?;
    } else {
        execute!(
            writer,
            SetForegroundColor(message_type.color()),
            SetAttribute(Attribute::Bold),
            Print(&padded_action),
            ResetColor,
            SetAttribute(Attribute::Reset)
        )?;
    }
    execute!(writer, Print(" "), Print(&message.details), Print("\n"))?;
    Ok(())
}
