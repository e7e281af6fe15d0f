// Actuator bank: the addressable set of ESC outputs
//
// All writes to the sink go through here, so the bank also remembers the
// last commanded width per actuator for telemetry.

use tracing::{info, warn};

use super::sink::{PulseSink, SinkError};
use super::speed::PulseWidth;
use crate::config::{ACTUATOR_CHANNELS, N_ACT};

/// Write failure for one actuator
#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error("No actuator with id {0}")]
    UnknownActuator(usize),

    #[error("Actuator {actuator} write failed: {source}")]
    WriteFault {
        actuator: usize,
        #[source]
        source: SinkError,
    },
}

pub struct ActuatorBank {
    sink: Box<dyn PulseSink>,
    channels: [u8; N_ACT],
    commanded: [PulseWidth; N_ACT],
}

impl ActuatorBank {
    pub fn new(sink: Box<dyn PulseSink>) -> Self {
        Self::with_channels(sink, ACTUATOR_CHANNELS)
    }

    /// Create with a custom actuator -> channel wiring
    pub fn with_channels(sink: Box<dyn PulseSink>, channels: [u8; N_ACT]) -> Self {
        Self {
            sink,
            channels,
            commanded: [PulseWidth::NEUTRAL; N_ACT],
        }
    }

    /// Check the sink and put every actuator at neutral
    pub fn initialize(&mut self) -> Result<(), SinkError> {
        info!("Initializing actuator bank on channels {:?}", self.channels);
        self.sink.check()?;
        self.stop_all();
        Ok(())
    }

    /// Write a pulse width to one actuator
    pub fn write_pulse(&mut self, actuator: usize, width: PulseWidth) -> Result<(), BankError> {
        let channel = *self
            .channels
            .get(actuator)
            .ok_or(BankError::UnknownActuator(actuator))?;
        self.sink
            .write_pulse(channel, width)
            .map_err(|source| BankError::WriteFault { actuator, source })?;
        self.commanded[actuator] = width;
        Ok(())
    }

    /// Safety stop: every actuator to neutral. Never fails; faults are logged
    /// and the remaining actuators are still stopped.
    pub fn stop_all(&mut self) {
        for actuator in 0..N_ACT {
            if let Err(e) = self.write_pulse(actuator, PulseWidth::NEUTRAL) {
                warn!("Safety stop could not reach actuator {}: {}", actuator, e);
            }
        }
    }

    /// Last commanded pulse width for an actuator
    pub fn commanded(&self, actuator: usize) -> Option<PulseWidth> {
        self.commanded.get(actuator).copied()
    }

    /// Last commanded pulse widths, indexed by actuator id
    pub fn snapshot(&self) -> [PulseWidth; N_ACT] {
        self.commanded
    }

    pub fn all_neutral(&self) -> bool {
        self.commanded.iter().all(|&w| w == PulseWidth::NEUTRAL)
    }
}

impl Drop for ActuatorBank {
    fn drop(&mut self) {
        info!("Stopping all actuators");
        self.stop_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::sink::SimulatedSink;

    /// Sink that fails on one channel
    struct FaultySink {
        inner: SimulatedSink,
        bad_channel: u8,
    }

    impl PulseSink for FaultySink {
        fn write_pulse(&mut self, channel: u8, width: PulseWidth) -> crate::motor::sink::Result<()> {
            if channel == self.bad_channel {
                return Err(SinkError::ChannelOutOfRange(channel));
            }
            self.inner.write_pulse(channel, width)
        }
    }

    fn width(us: u16) -> PulseWidth {
        PulseWidth::new(us).unwrap()
    }

    #[test]
    fn test_write_routes_to_channel() {
        let sink = SimulatedSink::new();
        let mut bank = ActuatorBank::with_channels(
            Box::new(sink.clone()),
            [10, 11, 12, 13, 14, 15, 16, 17],
        );
        bank.write_pulse(3, width(1700)).unwrap();
        assert_eq!(sink.writes(), vec![(13, width(1700))]);
        assert_eq!(bank.commanded(3), Some(width(1700)));
    }

    #[test]
    fn test_unknown_actuator() {
        let mut bank = ActuatorBank::new(Box::new(SimulatedSink::new()));
        assert!(matches!(
            bank.write_pulse(8, PulseWidth::NEUTRAL),
            Err(BankError::UnknownActuator(8))
        ));
    }

    #[test]
    fn test_stop_all_is_idempotent() {
        let sink = SimulatedSink::new();
        let mut bank = ActuatorBank::new(Box::new(sink.clone()));
        bank.write_pulse(0, PulseWidth::MAX).unwrap();
        bank.stop_all();
        assert!(bank.all_neutral());
        bank.stop_all();
        assert!(bank.all_neutral());
        // one write plus two full sweeps
        assert_eq!(sink.writes().len(), 1 + 2 * N_ACT);
    }

    #[test]
    fn test_stop_all_survives_faulty_channel() {
        let inner = SimulatedSink::new();
        let mut bank = ActuatorBank::new(Box::new(FaultySink {
            inner: inner.clone(),
            bad_channel: 2,
        }));
        bank.stop_all();
        let channels: Vec<u8> = inner.writes().iter().map(|&(c, _)| c).collect();
        assert_eq!(channels, vec![0, 1, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_drop_stops_everything() {
        let sink = SimulatedSink::new();
        {
            let mut bank = ActuatorBank::new(Box::new(sink.clone()));
            bank.write_pulse(6, PulseWidth::MAX).unwrap();
        }
        let writes = sink.writes();
        assert_eq!(writes.len(), 1 + N_ACT);
        assert!(writes[1..].iter().all(|&(_, w)| w == PulseWidth::NEUTRAL));
    }
}
