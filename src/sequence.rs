// Timed multi-phase actuation routines
//
// Routines block the caller for their whole duration. Nothing can
// interrupt a running routine: the poll loop only resumes once it returns.

use std::time::Duration;
use tracing::info;

use crate::config::{
    CARRY_HOLD, GROUP_BASES, GROUP_WINCHES, LIFT_BASES, LIFT_HOLD, LIFT_WINCHES, RETURN_BASES,
    RETURN_HOLD, RETURN_WINCHES, TUNED_DEPLOYMENT_BASES,
};
use crate::motor::{ActuatorBank, BankError, PulseWidth, normalize_raw};

/// Blocking "hold for duration" primitive
pub trait Hold: Send {
    fn hold(&mut self, duration: Duration);
}

/// Holds by sleeping the current thread
pub struct ThreadHold;

impl Hold for ThreadHold {
    fn hold(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Apply raw calibration widths positionally to a group, reflecting around
/// MOTOR_NEUTRAL_MID for inverted actuators
pub fn apply_raw(bank: &mut ActuatorBank, group: &[usize], widths: &[u16]) -> Result<(), BankError> {
    for (&actuator, &raw) in group.iter().zip(widths) {
        let width = normalize_raw(actuator, PulseWidth::clamped(raw as i32));
        bank.write_pulse(actuator, width)?;
    }
    Ok(())
}

/// Drive the bases with the tuned deployment calibration
pub fn tuned_deployment(bank: &mut ActuatorBank) -> Result<(), BankError> {
    info!("Tuned deployment: bases {:?}", TUNED_DEPLOYMENT_BASES);
    apply_raw(bank, GROUP_BASES, &TUNED_DEPLOYMENT_BASES)
}

/// Lift, hold, stop and carry, return, hold, stop
pub fn lift_and_return(bank: &mut ActuatorBank, hold: &mut dyn Hold) -> Result<(), BankError> {
    info!("Lift and return: lifting for {:?}", LIFT_HOLD);
    apply_raw(bank, GROUP_WINCHES, &LIFT_WINCHES)?;
    apply_raw(bank, GROUP_BASES, &LIFT_BASES)?;
    hold.hold(LIFT_HOLD);

    info!("Lift and return: carrying for {:?}", CARRY_HOLD);
    bank.stop_all();
    hold.hold(CARRY_HOLD);

    info!("Lift and return: returning for {:?}", RETURN_HOLD);
    apply_raw(bank, GROUP_WINCHES, &RETURN_WINCHES)?;
    apply_raw(bank, GROUP_BASES, &RETURN_BASES)?;
    hold.hold(RETURN_HOLD);

    bank.stop_all();
    info!("Lift and return complete");
    Ok(())
}
