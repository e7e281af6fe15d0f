// Actuator side of the runtime
//
// Provides:
// - Speed table and pulse width bounds
// - Polarity normalization for inverted actuators
// - Pulse sinks (serial servo controller, simulation)
// - The actuator bank and its safety stop

mod bank;
pub mod polarity;
pub mod sink;
pub mod speed;

pub use bank::{ActuatorBank, BankError};
pub use polarity::{normalize, normalize_raw};
pub use sink::{PulseSink, ServoControllerSink, SimulatedSink, SinkError};
pub use speed::{PulseWidth, SpeedIndex};
