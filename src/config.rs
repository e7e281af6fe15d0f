// Timing, topics, actuator wiring and calibration constants
use std::time::Duration;

// Runtime loop frequency
pub const LOOP_HZ: u64 = 50;

// Hardware settling guard after each direct (non-sequence) dispatch
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

// Zenoh key expressions, relative to the runtime prefix
pub const DEFAULT_PREFIX: &str = "vinebot";
pub const TOPIC_CMD: &str = "cmd"; // <prefix>/cmd/<slot>
pub const TOPIC_PEER: &str = "peer"; // <prefix>/peer/** liveliness tokens
pub const TOPIC_HEALTH: &str = "state/health";
pub const TOPIC_ACTUATORS: &str = "state/actuators";

// Serial port of the servo controller driving the ESCs
pub const MOTOR_PORT: &str = "/dev/ttyACM0";

// Enable hardware output (set to false for simulation/testing)
pub const MOTOR_ENABLED: bool = true;

// Pulse widths in microseconds
pub const MOTOR_MIN: u16 = 1025;
pub const MOTOR_MAX: u16 = 2000;
pub const MOTOR_NEUTRAL: u16 = 1500;
// Reflection centre for raw calibration pulse widths (ESC dead band midpoint)
pub const MOTOR_NEUTRAL_MID: u16 = 1518;

/// Number of actuators on the bank
pub const N_ACT: usize = 8;

/// Speed index that means "no motion"
pub const NEUTRAL_INDEX: u8 = 5;

/// Calibrated pulse width per speed index. Index 0 is the stop code and
/// maps to neutral; 1..=4 reverse, 6..=9 forward.
pub const SPEED_TABLE: [u16; 10] = [
    MOTOR_NEUTRAL, // 0: stop
    MOTOR_MIN,     // 1: full reverse
    1150,
    1300,
    1400,
    MOTOR_NEUTRAL, // 5: neutral
    1600,
    1700,
    1850,
    MOTOR_MAX, // 9: full forward
];

/// Actuators mounted with inverted rotational sense (0-based ids 5 and 7,
/// i.e. winch ordinals 6 and 8)
pub const POLARITY_INVERTED: [bool; N_ACT] = [false, false, false, false, false, true, false, true];

/// Servo controller channel per actuator id
pub const ACTUATOR_CHANNELS: [u8; N_ACT] = [0, 1, 2, 3, 4, 5, 6, 7];

// Actuator groups (0-based ids)
pub const GROUP_BASES: &[usize] = &[0, 1, 2, 3];
pub const GROUP_VINES: &[usize] = &[0, 1, 2, 3];
pub const GROUP_WINCHES: &[usize] = &[4, 5, 6, 7];
pub const GROUP_ALL: &[usize] = &[0, 1, 2, 3, 4, 5, 6, 7];

// TunedDeployment: raw pulse widths applied positionally to the bases
pub const TUNED_DEPLOYMENT_BASES: [u16; 4] = [1385, 1385, 1385, MOTOR_NEUTRAL];

// LiftAndReturn calibration, applied positionally to winches and bases
pub const LIFT_WINCHES: [u16; 4] = [1700, 1700, 1700, 1700];
pub const LIFT_BASES: [u16; 4] = [1600, 1600, 1600, 1600];
pub const RETURN_WINCHES: [u16; 4] = [1350, 1350, 1350, 1350];
pub const RETURN_BASES: [u16; 4] = [1420, 1420, 1420, 1420];
pub const LIFT_HOLD: Duration = Duration::from_secs(5);
pub const CARRY_HOLD: Duration = Duration::from_secs(3);
pub const RETURN_HOLD: Duration = Duration::from_secs(5);
