pub mod config;
pub mod messages;
pub mod motor;
pub mod poll;
pub mod protocol;
pub mod runtime;
pub mod sequence;
