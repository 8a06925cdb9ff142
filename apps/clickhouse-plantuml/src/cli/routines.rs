//! # Routines
//! The work behind the command line. A routine reports what it did with a
//! [`RoutineSuccess`] or a [`RoutineFailure`], both shown to the user by
//! `main`.

use crate::cli::display::{Message, MessageType};

pub mod diagram;
pub mod plantuml;

#[derive(Debug, Clone)]
#[must_use = "The message should be displayed."]
pub struct RoutineSuccess {
    pub message: Message,
    pub message_type: MessageType,
}

impl RoutineSuccess {
    pub fn success(message: Message) -> Self {
        Self {
            message,
            message_type: MessageType::Success,
        }
    }

    pub fn info(message: Message) -> Self {
        Self {
            message,
            message_type: MessageType::Info,
        }
    }
}

/// Process exit code of a failed routine
pub const FAILURE_EXIT_CODE: u8 = 1;
/// Process exit code when the catalog holds nothing to draw
pub const NOTHING_FOUND_EXIT_CODE: u8 = 2;

#[derive(Debug)]
pub struct RoutineFailure {
    pub message: Message,
    pub message_type: MessageType,
    pub error: Option<anyhow::Error>,
    pub exit_code: u8,
}

impl RoutineFailure {
    pub fn new<F: Into<anyhow::Error>>(message: Message, error: F) -> Self {
        Self {
            message,
            message_type: MessageType::Error,
            error: Some(error.into()),
            exit_code: FAILURE_EXIT_CODE,
        }
    }

    /// create a RoutineFailure error without an error
    pub fn error(message: Message) -> Self {
        Self {
            message,
            message_type: MessageType::Error,
            error: None,
            exit_code: FAILURE_EXIT_CODE,
        }
    }

    pub fn with_exit_code(self, exit_code: u8) -> Self {
        Self { exit_code, ..self }
    }
}
