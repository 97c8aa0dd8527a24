//! Status output implementations

pub mod channel;

pub use channel::{ChannelStatus, StatusEvent};
