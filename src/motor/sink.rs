// Pulse-width output sinks
//
// The ESCs are fed by a USB servo controller speaking the compact serial
// protocol: [command, channel, target_lo7, target_hi7], with targets in
// quarter-microseconds.

use serialport::{self, SerialPort};
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

use super::speed::PulseWidth;

/// Default serial configuration for the servo controller
pub const DEFAULT_BAUDRATE: u32 = 115_200;
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

/// Highest channel on a 24-channel controller
const MAX_CHANNEL: u8 = 23;

/// Command bytes
#[repr(u8)]
#[derive(Debug, Clone, Copy)]
enum Instruction {
    SetTarget = 0x84,
    GetErrors = 0xA1,
}

/// Error types for the actuator sink boundary
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Channel {0} out of range")]
    ChannelOutOfRange(u8),

    #[error("Controller reported error flags 0x{0:04X}")]
    Controller(u16),
}

pub type Result<T> = std::result::Result<T, SinkError>;

/// Accepts a pulse width per output channel
pub trait PulseSink: Send {
    fn write_pulse(&mut self, channel: u8, width: PulseWidth) -> Result<()>;

    /// Verify the sink is reachable and healthy
    fn check(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Serial servo controller driving one ESC per channel
pub struct ServoControllerSink {
    port: Box<dyn SerialPort>,
}

impl ServoControllerSink {
    /// Open a new connection to the controller
    pub fn open(port_name: &str) -> Result<Self> {
        Self::open_with_baudrate(port_name, DEFAULT_BAUDRATE)
    }

    /// Open with custom baudrate
    pub fn open_with_baudrate(port_name: &str, baudrate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baudrate)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()?;

        Ok(Self { port })
    }

    /// Build a set-target packet; target is in quarter-microseconds
    fn build_set_target(channel: u8, width: PulseWidth) -> [u8; 4] {
        let target = width.as_micros() * 4;
        [
            Instruction::SetTarget as u8,
            channel,
            (target & 0x7F) as u8,
            ((target >> 7) & 0x7F) as u8,
        ]
    }

    fn send_packet(&mut self, packet: &[u8]) -> Result<()> {
        self.port.write_all(packet)?;
        self.port.flush()?;
        Ok(())
    }

    /// Read and clear the controller error register
    pub fn read_errors(&mut self) -> Result<u16> {
        self.send_packet(&[Instruction::GetErrors as u8])?;
        let mut response = [0u8; 2];
        self.port.read_exact(&mut response)?;
        Ok(u16::from_le_bytes(response))
    }
}

impl PulseSink for ServoControllerSink {
    fn write_pulse(&mut self, channel: u8, width: PulseWidth) -> Result<()> {
        if channel > MAX_CHANNEL {
            return Err(SinkError::ChannelOutOfRange(channel));
        }
        let packet = Self::build_set_target(channel, width);
        debug!("Set target channel {}: {}us", channel, width.as_micros());
        self.send_packet(&packet)
    }

    fn check(&mut self) -> Result<()> {
        match self.read_errors()? {
            0 => Ok(()),
            flags => Err(SinkError::Controller(flags)),
        }
    }
}

/// Sink that logs and remembers writes instead of driving hardware
#[derive(Clone, Default)]
pub struct SimulatedSink {
    writes: Arc<Mutex<Vec<(u8, PulseWidth)>>>,
}

impl SimulatedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes so far, in order
    pub fn writes(&self) -> Vec<(u8, PulseWidth)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl PulseSink for SimulatedSink {
    fn write_pulse(&mut self, channel: u8, width: PulseWidth) -> Result<()> {
        debug!("[sim] channel {} -> {}us", channel, width.as_micros());
        if let Ok(mut writes) = self.writes.lock() {
            writes.push((channel, width));
        }
        Ok(())
    }
}
