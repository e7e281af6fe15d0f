// Speed index -> pulse width lookup

use crate::config::{MOTOR_MAX, MOTOR_MIN, MOTOR_NEUTRAL, SPEED_TABLE};

/// A pulse width in microseconds, always inside [MOTOR_MIN, MOTOR_MAX]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PulseWidth(u16);

impl PulseWidth {
    pub const MIN: PulseWidth = PulseWidth(MOTOR_MIN);
    pub const MAX: PulseWidth = PulseWidth(MOTOR_MAX);
    pub const NEUTRAL: PulseWidth = PulseWidth(MOTOR_NEUTRAL);

    /// Returns `None` for widths the ESCs must never see
    pub fn new(us: u16) -> Option<Self> {
        (MOTOR_MIN..=MOTOR_MAX).contains(&us).then_some(Self(us))
    }

    /// Saturate a computed width into the hardware range
    pub fn clamped(us: i32) -> Self {
        Self(us.clamp(MOTOR_MIN as i32, MOTOR_MAX as i32) as u16)
    }

    pub fn as_micros(self) -> u16 {
        self.0
    }
}

/// Speed index in [0, 9]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedIndex(u8);

impl SpeedIndex {
    pub const STOP: SpeedIndex = SpeedIndex(0);
    pub const NEUTRAL: SpeedIndex = SpeedIndex(crate::config::NEUTRAL_INDEX);

    pub fn new(index: u8) -> Option<Self> {
        ((index as usize) < SPEED_TABLE.len()).then_some(Self(index))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Calibrated pulse width for this index
    pub fn pulse_width(self) -> PulseWidth {
        PulseWidth(SPEED_TABLE[self.0 as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_inside_hardware_range() {
        for i in 0..10 {
            let width = SpeedIndex::new(i).unwrap().pulse_width();
            assert!(PulseWidth::new(width.as_micros()).is_some());
        }
    }

    #[test]
    fn test_neutral_and_extremes() {
        assert_eq!(SpeedIndex::NEUTRAL.pulse_width(), PulseWidth::NEUTRAL);
        assert_eq!(SpeedIndex::new(5).unwrap().pulse_width().as_micros(), 1500);
        assert_eq!(SpeedIndex::new(1).unwrap().pulse_width(), PulseWidth::MIN);
        assert_eq!(SpeedIndex::new(9).unwrap().pulse_width(), PulseWidth::MAX);
        assert_eq!(SpeedIndex::STOP.pulse_width(), PulseWidth::NEUTRAL);
    }

    #[test]
    fn test_reverse_and_forward_ordering() {
        let widths: Vec<u16> = (1..10)
            .map(|i| SpeedIndex::new(i).unwrap().pulse_width().as_micros())
            .collect();
        assert!(widths.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_index_validation() {
        assert!(SpeedIndex::new(9).is_some());
        assert!(SpeedIndex::new(10).is_none());
        assert!(SpeedIndex::new(15).is_none());
    }

    #[test]
    fn test_pulse_width_bounds() {
        assert!(PulseWidth::new(1024).is_none());
        assert!(PulseWidth::new(2001).is_none());
        assert_eq!(PulseWidth::clamped(2011), PulseWidth::MAX);
        assert_eq!(PulseWidth::clamped(900), PulseWidth::MIN);
        assert_eq!(PulseWidth::clamped(1385).as_micros(), 1385);
    }
}
