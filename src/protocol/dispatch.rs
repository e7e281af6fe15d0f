// Command dispatcher
//
// One decode-and-act cycle per slot write. Nothing is kept between calls.
// Every error path ends in a safety stop; nothing is reported to the peer.

use std::time::Duration;
use tracing::{debug, info, warn};

use super::layout::{DecodeError, EIGHT_DIGIT, FOUR_DIGIT, THREE_DIGIT, TWO_DIGIT};
use crate::config::{GROUP_ALL, GROUP_BASES, GROUP_VINES, GROUP_WINCHES, N_ACT};
use crate::messages::{CommandSlot, CommandWord};
use crate::motor::{ActuatorBank, BankError, PulseWidth, SpeedIndex, normalize};
use crate::sequence::{self, Hold};

/// Errors raised while handling a command. Always recovered by a safety stop.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Invalid speed digit {digit} for actuator {actuator}")]
    InvalidSpeedDigit { actuator: usize, digit: u8 },

    #[error("Invalid actuator ordinal {0}")]
    InvalidActuator(u8),

    #[error("Invalid sub-command {code} at position {position}")]
    InvalidSubCommand { position: usize, code: u8 },

    #[error("Actuator write fault: {0}")]
    ActuatorWriteFault(#[from] BankError),
}

/// executeCommand selector codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubCommand {
    RunSingleMotor,
    RunGroup(Group),
    TunedDeployment,
    SafetyStop,
    LiftAndReturn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Vines,
    Winches,
}

impl Group {
    pub fn members(self) -> &'static [usize] {
        match self {
            Group::Vines => GROUP_VINES,
            Group::Winches => GROUP_WINCHES,
        }
    }
}

impl SubCommand {
    pub const STOP_CODE: u8 = 0xE;

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0xA => Some(SubCommand::RunSingleMotor),
            0xB => Some(SubCommand::RunGroup(Group::Vines)),
            0xC => Some(SubCommand::RunGroup(Group::Winches)),
            0xD => Some(SubCommand::TunedDeployment),
            0xE => Some(SubCommand::SafetyStop),
            0xF => Some(SubCommand::LiftAndReturn),
            _ => None,
        }
    }
}

/// What a dispatch cycle ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Direct speed writes were applied
    Applied,
    /// A timed sequence ran to completion
    SequenceCompleted,
    /// Safety stop was issued
    Stopped,
}

pub struct Dispatcher {
    bank: ActuatorBank,
    hold: Box<dyn Hold>,
}

impl Dispatcher {
    pub fn new(bank: ActuatorBank, hold: Box<dyn Hold>) -> Self {
        Self { bank, hold }
    }

    pub fn bank(&self) -> &ActuatorBank {
        &self.bank
    }

    /// Block for a duration on the dispatcher's hold primitive
    pub fn hold(&mut self, duration: Duration) {
        self.hold.hold(duration);
    }

    /// Unconditional safety stop
    pub fn estop(&mut self) {
        info!("E-STOP: all actuators to neutral");
        self.bank.stop_all();
    }

    /// Decode and act on one slot write
    pub fn dispatch(&mut self, slot: CommandSlot, word: CommandWord) -> DispatchOutcome {
        info!("Command on {}: {}", slot, word);
        let result = match slot {
            CommandSlot::PreLoadValues => self.preload_values(word.0),
            CommandSlot::ExecuteCommand => self.execute_command(word.0),
            CommandSlot::IndividualMotor => self.direct(&[], word.0),
            CommandSlot::AllMotors => self.direct(GROUP_ALL, word.0),
            CommandSlot::BaseMotors => self.direct(GROUP_BASES, word.0),
            CommandSlot::WinchMotors => self.direct(GROUP_WINCHES, word.0),
        };

        match result {
            Ok(DispatchOutcome::Stopped) => {
                self.estop();
                DispatchOutcome::Stopped
            }
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Command on {} rejected: {}", slot, e);
                self.estop();
                DispatchOutcome::Stopped
            }
        }
    }

    /// Simple family: [selector, speed] applied to the slot's group or to one
    /// forced actuator. Everything outside the active set goes neutral.
    fn direct(&mut self, group: &[usize], word: u32) -> Result<DispatchOutcome, CommandError> {
        let selector = TWO_DIGIT.extract_digit(0, word)?;
        let raw_speed = TWO_DIGIT.extract_digit(1, word)?;

        // digits >= 10 leave the default neutral index in place
        let speed = SpeedIndex::new(raw_speed).unwrap_or_else(|| {
            debug!("Speed digit {} out of range, staying neutral", raw_speed);
            SpeedIndex::NEUTRAL
        });

        let forced = match selector {
            0 => None,
            s if (s as usize) <= N_ACT => Some(s as usize - 1),
            s => return Err(CommandError::InvalidActuator(s)),
        };
        let active: &[usize] = match &forced {
            Some(actuator) => std::slice::from_ref(actuator),
            None => group,
        };

        for actuator in 0..N_ACT {
            let width = if active.contains(&actuator) && speed != SpeedIndex::STOP {
                normalize(actuator, speed).pulse_width()
            } else {
                PulseWidth::NEUTRAL
            };
            self.bank.write_pulse(actuator, width)?;
        }
        Ok(DispatchOutcome::Applied)
    }

    /// One speed digit per actuator; any digit outside 1..=9 stops everything
    fn preload_values(&mut self, word: u32) -> Result<DispatchOutcome, CommandError> {
        let digits = EIGHT_DIGIT.extract_all(word);
        let mut speeds = [SpeedIndex::NEUTRAL; N_ACT];
        for (actuator, &digit) in digits.iter().enumerate().take(N_ACT) {
            speeds[actuator] = match SpeedIndex::new(digit) {
                Some(speed) if speed != SpeedIndex::STOP => speed,
                _ => return Err(CommandError::InvalidSpeedDigit { actuator, digit }),
            };
        }

        for (actuator, &speed) in speeds.iter().enumerate() {
            self.bank
                .write_pulse(actuator, normalize(actuator, speed).pulse_width())?;
        }
        Ok(DispatchOutcome::Applied)
    }

    /// Up to four selectors, run in order. Each position is a selector of its
    /// own, so a repeated code runs its routine again: send LiftAndReturn at a
    /// single position (0x00F0) unless several runs are wanted.
    fn execute_command(&mut self, word: u32) -> Result<DispatchOutcome, CommandError> {
        let selectors = FOUR_DIGIT.extract_all(word);
        // a stop selector anywhere wins over everything else in the word
        if selectors.contains(&SubCommand::STOP_CODE) {
            return Ok(DispatchOutcome::Stopped);
        }

        let mut outcome = DispatchOutcome::Applied;
        for (position, &code) in selectors.iter().enumerate() {
            let command = SubCommand::from_code(code)
                .ok_or(CommandError::InvalidSubCommand { position, code })?;
            debug!("Sub-command {:?} at position {}", command, position);
            match command {
                // parameterised routines read the rest of the word as arguments
                SubCommand::RunSingleMotor => {
                    self.run_single_motor(word)?;
                    return Ok(outcome);
                }
                SubCommand::RunGroup(group) => {
                    self.run_group(word, group)?;
                    return Ok(outcome);
                }
                SubCommand::TunedDeployment => sequence::tuned_deployment(&mut self.bank)?,
                SubCommand::SafetyStop => return Ok(DispatchOutcome::Stopped),
                SubCommand::LiftAndReturn => {
                    sequence::lift_and_return(&mut self.bank, self.hold.as_mut())?;
                    outcome = DispatchOutcome::SequenceCompleted;
                }
            }
        }
        Ok(outcome)
    }

    /// [unused, ordinal, speed] under the three-digit layout
    fn run_single_motor(&mut self, word: u32) -> Result<(), CommandError> {
        let ordinal = THREE_DIGIT.extract_digit(1, word)?;
        let raw_speed = THREE_DIGIT.extract_digit(2, word)?;
        if ordinal == 0 || ordinal as usize > N_ACT {
            return Err(CommandError::InvalidActuator(ordinal));
        }
        let actuator = ordinal as usize - 1;
        let speed = SpeedIndex::new(raw_speed).ok_or(CommandError::InvalidSpeedDigit {
            actuator,
            digit: raw_speed,
        })?;
        info!("Run single motor {} at index {}", ordinal, raw_speed);
        self.bank
            .write_pulse(actuator, normalize(actuator, speed).pulse_width())?;
        Ok(())
    }

    /// [selector, speed] under the two-digit layout, applied to every member
    fn run_group(&mut self, word: u32, group: Group) -> Result<(), CommandError> {
        let raw_speed = TWO_DIGIT.extract_digit(1, word)?;
        let members = group.members();
        let speed = SpeedIndex::new(raw_speed).ok_or(CommandError::InvalidSpeedDigit {
            actuator: members.first().copied().unwrap_or_default(),
            digit: raw_speed,
        })?;
        info!("Run group {:?} at index {}", group, raw_speed);
        for &actuator in members {
            self.bank
                .write_pulse(actuator, normalize(actuator, speed).pulse_width())?;
        }
        Ok(())
    }
}
