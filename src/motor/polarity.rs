// Polarity normalization for actuators mounted with inverted rotation
//
// Two reflections exist: speed indices reflect around index 5, and raw
// calibration pulse widths reflect around MOTOR_NEUTRAL_MID.

use super::speed::{PulseWidth, SpeedIndex};
use crate::config::{MOTOR_NEUTRAL_MID, NEUTRAL_INDEX, POLARITY_INVERTED};

/// Whether the actuator is mounted inverted. Unknown ids are not inverted.
pub fn is_inverted(actuator: usize) -> bool {
    POLARITY_INVERTED.get(actuator).copied().unwrap_or(false)
}

/// Effective speed index for an actuator. Index 0 (stop) is never reflected.
pub fn normalize(actuator: usize, speed: SpeedIndex) -> SpeedIndex {
    if speed == SpeedIndex::STOP || !is_inverted(actuator) {
        return speed;
    }
    let reflected = 2 * NEUTRAL_INDEX - speed.get();
    // 1..=9 maps onto 9..=1
    SpeedIndex::new(reflected).unwrap_or(SpeedIndex::NEUTRAL)
}

/// Effective raw pulse width for an actuator, used by calibration sequences
pub fn normalize_raw(actuator: usize, width: PulseWidth) -> PulseWidth {
    if !is_inverted(actuator) {
        return width;
    }
    let mid = MOTOR_NEUTRAL_MID as i32;
    PulseWidth::clamped(mid + (mid - width.as_micros() as i32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::N_ACT;

    fn idx(i: u8) -> SpeedIndex {
        SpeedIndex::new(i).unwrap()
    }

    #[test]
    fn test_reference_inversions() {
        let inverted: Vec<usize> = (0..N_ACT).filter(|&a| is_inverted(a)).collect();
        assert_eq!(inverted, vec![5, 7]);
    }

    #[test]
    fn test_non_inverted_is_identity() {
        for s in 0..10 {
            assert_eq!(normalize(0, idx(s)), idx(s));
            assert_eq!(normalize(4, idx(s)), idx(s));
        }
    }

    #[test]
    fn test_inverted_reflects_around_neutral() {
        assert_eq!(normalize(5, idx(1)), idx(9));
        assert_eq!(normalize(5, idx(9)), idx(1));
        assert_eq!(normalize(7, idx(5)), idx(5));
        assert_eq!(normalize(7, idx(6)), idx(4));
        assert_eq!(normalize(7, idx(0)), idx(0));
    }

    #[test]
    fn test_reflection_is_involutive() {
        for a in 0..N_ACT {
            for s in 0..10 {
                assert_eq!(normalize(a, normalize(a, idx(s))), idx(s));
            }
        }
    }

    #[test]
    fn test_raw_reflection_uses_mid_constant() {
        let raw = PulseWidth::new(1385).unwrap();
        assert_eq!(normalize_raw(0, raw), raw);
        assert_eq!(normalize_raw(5, raw).as_micros(), 1651);
        assert_eq!(normalize_raw(7, PulseWidth::NEUTRAL).as_micros(), 1536);
    }

    #[test]
    fn test_raw_reflection_stays_in_range() {
        assert_eq!(normalize_raw(5, PulseWidth::MIN), PulseWidth::MAX);
        assert_eq!(normalize_raw(5, PulseWidth::MAX).as_micros(), 1036);
    }
}
