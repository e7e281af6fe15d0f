// Message types exchanged with the remote controller and published by the runtime

use serde::{Deserialize, Serialize};

/// A named, independently writable command channel.
///
/// The slot names are wire constants shared with the remote application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandSlot {
    IndividualMotor,
    AllMotors,
    BaseMotors,
    WinchMotors,
    PreLoadValues,
    ExecuteCommand,
}

impl CommandSlot {
    /// Fixed scan order used by the poll loop
    pub const ALL: [CommandSlot; 6] = [
        CommandSlot::IndividualMotor,
        CommandSlot::AllMotors,
        CommandSlot::BaseMotors,
        CommandSlot::WinchMotors,
        CommandSlot::PreLoadValues,
        CommandSlot::ExecuteCommand,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CommandSlot::IndividualMotor => "individualMotor",
            CommandSlot::AllMotors => "allMotors",
            CommandSlot::BaseMotors => "baseMotors",
            CommandSlot::WinchMotors => "winchMotors",
            CommandSlot::PreLoadValues => "PreLoadValues",
            CommandSlot::ExecuteCommand => "executeCommand",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.name() == name)
    }
}

impl std::fmt::Display for CommandSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Packed unsigned integer carrying 4-bit parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandWord(pub u32);

impl std::fmt::Display for CommandWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Payload is not a JSON number or hex string: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid hex command word {0:?}")]
    Hex(String),
}

// Remote sends either a plain number or a "0x..." string
#[derive(Deserialize)]
#[serde(untagged)]
enum WirePayload {
    Number(u32),
    Text(String),
}

impl CommandWord {
    /// Decode a zenoh payload into a command word
    pub fn from_payload(payload: &[u8]) -> Result<Self, PayloadError> {
        match serde_json::from_slice::<WirePayload>(payload)? {
            WirePayload::Number(value) => Ok(CommandWord(value)),
            WirePayload::Text(text) => {
                let trimmed = text.trim();
                let digits = trimmed
                    .strip_prefix("0x")
                    .or_else(|| trimmed.strip_prefix("0X"))
                    .unwrap_or(trimmed);
                u32::from_str_radix(digits, 16)
                    .map(CommandWord)
                    .map_err(|_| PayloadError::Hex(text))
            }
        }
    }
}

/// Health status published by runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Idle,
    Connected,
}

/// Last commanded pulse width per actuator, in microseconds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActuatorState {
    pub pulses_us: Vec<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_names_round_trip() {
        for slot in CommandSlot::ALL {
            assert_eq!(CommandSlot::from_name(slot.name()), Some(slot));
        }
        assert_eq!(CommandSlot::from_name("executecommand"), None);
    }

    #[test]
    fn test_payload_number() {
        let word = CommandWord::from_payload(b"185").unwrap();
        assert_eq!(word, CommandWord(0xB9));
    }

    #[test]
    fn test_payload_hex_string() {
        let word = CommandWord::from_payload(br#""0x00B9""#).unwrap();
        assert_eq!(word, CommandWord(0xB9));
        let word = CommandWord::from_payload(br#""eeee""#).unwrap();
        assert_eq!(word, CommandWord(0xEEEE));
    }

    #[test]
    fn test_payload_rejects_garbage() {
        assert!(CommandWord::from_payload(b"-3").is_err());
        assert!(CommandWord::from_payload(br#""0xZZ""#).is_err());
        assert!(CommandWord::from_payload(b"{\"x\": 1}").is_err());
    }

    #[test]
    fn test_health_serialization() {
        let json = serde_json::to_string(&RuntimeHealth::Connected).unwrap();
        assert_eq!(json, "\"connected\"");
    }
}
