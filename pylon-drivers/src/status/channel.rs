//! Channel-backed status sink
//!
//! Hands report lines to another task (console or LCD) through an
//! embassy-sync channel. Sending never blocks; lines that do not fit are
//! dropped and counted.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use heapless::String;

use pylon_core::calibration::report::{Line, StatusLine};
use pylon_core::traits::StatusSink;

/// One unit of status output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// Console line
    Message(Line),
    /// LCD status line
    Status(StatusLine),
}

/// Copy as much of `text` as fits, cutting on a char boundary
fn truncated<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Status sink writing into a channel
pub struct ChannelStatus<'a, M: RawMutex, const N: usize> {
    channel: &'a Channel<M, StatusEvent, N>,
    dropped: u32,
}

impl<'a, M: RawMutex, const N: usize> ChannelStatus<'a, M, N> {
    /// Create a sink over a channel
    pub fn new(channel: &'a Channel<M, StatusEvent, N>) -> Self {
        Self {
            channel,
            dropped: 0,
        }
    }

    /// Lines dropped because the channel was full
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    fn send(&mut self, event: StatusEvent) {
        if self.channel.try_send(event).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            warn!("Status channel full, {} lines dropped", self.dropped);
        }
    }
}

impl<M: RawMutex, const N: usize> StatusSink for ChannelStatus<'_, M, N> {
    fn message(&mut self, line: &str) {
        self.send(StatusEvent::Message(truncated(line)));
    }

    fn set_status(&mut self, status: &str) {
        self.send(StatusEvent::Status(truncated(status)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use critical_section as _;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_lines_arrive_in_order() {
        let channel: Channel<NoopRawMutex, StatusEvent, 4> = Channel::new();
        let mut sink = ChannelStatus::new(&channel);

        sink.message("G33 Auto Calibrate");
        sink.set_status("Checking...");

        assert_eq!(
            channel.try_receive(),
            Ok(StatusEvent::Message(truncated("G33 Auto Calibrate")))
        );
        assert_eq!(
            channel.try_receive(),
            Ok(StatusEvent::Status(truncated("Checking...")))
        );
        assert!(channel.try_receive().is_err());
        assert_eq!(sink.dropped(), 0);
    }

    #[test]
    fn test_full_channel_drops_and_counts() {
        let channel: Channel<NoopRawMutex, StatusEvent, 2> = Channel::new();
        let mut sink = ChannelStatus::new(&channel);

        for _ in 0..5 {
            sink.message("line");
        }
        assert_eq!(sink.dropped(), 3);

        // Draining makes room again
        let _ = channel.try_receive();
        sink.set_status("ok");
        assert_eq!(sink.dropped(), 3);
    }

    #[test]
    fn test_long_status_is_truncated() {
        let channel: Channel<NoopRawMutex, StatusEvent, 1> = Channel::new();
        let mut sink = ChannelStatus::new(&channel);

        sink.set_status("Calibration sd:0.012 and more text");
        match channel.try_receive() {
            Ok(StatusEvent::Status(s)) => assert_eq!(s.as_str(), "Calibration sd:0.012 "),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let s: String<4> = truncated("ab°c");
        assert_eq!(s.as_str(), "ab°");
    }

    #[test]
    fn test_calibration_sink_through_channel() {
        use pylon_core::calibration::report;
        let channel: Channel<NoopRawMutex, StatusEvent, 8> = Channel::new();
        let mut sink = ChannelStatus::new(&channel);

        report::finished(&mut sink, 0.02, 0.015, false);
        let mut saw_status = false;
        while let Ok(event) = channel.try_receive() {
            if let StatusEvent::Status(s) = event {
                assert_eq!(s.as_str(), "Calibration sd:0.015");
                saw_status = true;
            }
        }
        assert!(saw_status);
    }
}
