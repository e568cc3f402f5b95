use std::fmt;
use std::str::FromStr;

use crate::application::error::ApplicationError;

/// Keys the runtime reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Tab,
    ShiftTab,
}

impl FromStr for Key {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tab" => Ok(Key::Tab),
            "shift+tab" | "backtab" => Ok(Key::ShiftTab),
            _ => Err(ApplicationError::UnknownKey(s.to_string())),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Tab => f.write_str("tab"),
            Key::ShiftTab => f.write_str("shift+tab"),
        }
    }
}
