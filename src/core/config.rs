//! # Runtime configuration.
//!
//! Provides [`Config`], the already-resolved scalar settings of a
//! [`ProcessRuntime`](crate::ProcessRuntime). The crate parses no files or
//! command-line arguments; callers fill the struct however they like.
//!
//! ## Sentinel values
//! - `dispatch_poll = 0s` → the dispatch loop waits indefinitely for the next event
//! - `signal_poll` below 1ms → clamped to 1ms
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

/// Settings for one runtime instance.
///
/// ## Field semantics
/// - `dispatch_poll`: upper bound of one queue wait; the running flag is
///   re-checked at least this often (`0s` = wait until an event or shutdown)
/// - `signal_poll`: how often the signal bridge checks for a delivered signal
/// - `bus_capacity`: diagnostic bus ring buffer size
///
/// All fields are public. Prefer the accessors over checking sentinels inline.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time one `pop` of the dispatch loop waits.
    pub dispatch_poll: Duration,

    /// Polling granularity of the signal wait loop.
    ///
    /// Newly registered signal handlers are honored within one interval;
    /// registration also wakes the loop immediately.
    pub signal_poll: Duration,

    /// Capacity of the diagnostic bus.
    ///
    /// Subscribers lagging more than `bus_capacity` reports skip older ones.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the dispatch wait as an `Option`.
    ///
    /// - `None` → wait indefinitely
    /// - `Some(d)` → wait at most `d`
    #[inline]
    pub fn dispatch_timeout(&self) -> Option<Duration> {
        if self.dispatch_poll == Duration::ZERO {
            None
        } else {
            Some(self.dispatch_poll)
        }
    }

    /// Returns the signal poll interval clamped to at least 1ms.
    #[inline]
    pub fn signal_poll_clamped(&self) -> Duration {
        self.signal_poll.max(Duration::from_millis(1))
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// - `dispatch_poll = 100ms`
    /// - `signal_poll = 200ms`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            dispatch_poll: Duration::from_millis(100),
            signal_poll: Duration::from_millis(200),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dispatch_poll_means_indefinite() {
        let cfg = Config {
            dispatch_poll: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(cfg.dispatch_timeout(), None);
        assert_eq!(
            Config::default().dispatch_timeout(),
            Some(Duration::from_millis(100))
        );
    }

    #[test]
    fn test_clamps() {
        let cfg = Config {
            dispatch_poll: Duration::ZERO,
            signal_poll: Duration::ZERO,
            bus_capacity: 0,
        };
        assert_eq!(cfg.signal_poll_clamped(), Duration::from_millis(1));
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
