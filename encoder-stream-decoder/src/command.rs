//! Motor mode commands
//!
//! The firmware on the other end of the link understands a handful of
//! single-character commands. They are written verbatim, without terminator.

use crate::types::{DecoderError, Result};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Single-character mode commands understood by the motor controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorCommand {
    /// Start moving ("M")
    Move,
    /// Stop moving ("S")
    Stop,
    /// Velocity / wheel mode ("V")
    Velocity,
    /// Position mode ("P")
    Position,
    /// Free-drive, torque released ("F")
    FreeDrive,
}

impl MotorCommand {
    /// All commands in vocabulary order
    pub const ALL: [MotorCommand; 5] = [
        MotorCommand::Move,
        MotorCommand::Stop,
        MotorCommand::Velocity,
        MotorCommand::Position,
        MotorCommand::FreeDrive,
    ];

    /// Wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            MotorCommand::Move => "M",
            MotorCommand::Stop => "S",
            MotorCommand::Velocity => "V",
            MotorCommand::Position => "P",
            MotorCommand::FreeDrive => "F",
        }
    }

    /// Write the command to the transport and flush it
    pub fn send<W: Write>(self, writer: &mut W) -> Result<()> {
        log::debug!("Sending motor command {:?} ({})", self, self.as_str());
        writer.write_all(self.as_str().as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

impl fmt::Display for MotorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MotorCommand {
    type Err = DecoderError;

    /// Accepts the wire letter or a long name, case-insensitively
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "move" => Ok(MotorCommand::Move),
            "s" | "stop" => Ok(MotorCommand::Stop),
            "v" | "velocity" | "wheel" => Ok(MotorCommand::Velocity),
            "p" | "position" => Ok(MotorCommand::Position),
            "f" | "freedrive" | "free-drive" | "free" => Ok(MotorCommand::FreeDrive),
            _ => Err(DecoderError::UnknownCommand(s.to_string())),
        }
    }
}

/// Move/stop toggle: alternates between [`MotorCommand::Move`] and [`MotorCommand::Stop`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveToggle {
    moving: bool,
}

impl MoveToggle {
    pub fn new() -> Self {
        Self::default()
    }

    /// True after an odd number of toggles
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Flip the state and return the command that realises it
    pub fn toggle(&mut self) -> MotorCommand {
        self.moving = !self.moving;
        if self.moving {
            MotorCommand::Move
        } else {
            MotorCommand::Stop
        }
    }
}
