// Command protocol: nibble layouts and the slot dispatcher

pub mod dispatch;
pub mod layout;

pub use dispatch::{CommandError, DispatchOutcome, Dispatcher, SubCommand};
pub use layout::{DecodeError, Layout, LayoutError};
