//! Adaptive polling schedule for signal monitoring

use crate::core::SignalStrength;

/// Cooperative recheck timer. The owner calls `take_due` whenever it gets a
/// chance to run, passing the interval currently configured for the last
/// strength; the timer never blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PollingState {
    is_polling: bool,
    current_interval_ms: u64,
    last_strength: SignalStrength,
    /// When the running interval was last (re)started
    anchor_ms: Option<u64>,
}

impl PollingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin polling, first firing `interval_ms` after `now_ms`
    pub fn start(&mut self, now_ms: u64, strength: SignalStrength, interval_ms: u64) {
        self.is_polling = true;
        self.last_strength = strength;
        self.current_interval_ms = interval_ms;
        self.anchor_ms = Some(now_ms);
    }

    pub fn stop(&mut self) {
        self.is_polling = false;
        self.anchor_ms = None;
    }

    /// Record a new strength and reschedule with the interval chosen for it
    pub fn record_strength(&mut self, strength: SignalStrength, interval_ms: u64, now_ms: u64) {
        self.last_strength = strength;
        self.current_interval_ms = interval_ms;
        if self.is_polling {
            self.anchor_ms = Some(now_ms);
        }
    }

    /// Adopt `interval_ms` and, if it has elapsed since the last tick,
    /// restart the interval and report that a tick is due
    pub fn take_due(&mut self, now_ms: u64, interval_ms: u64) -> bool {
        self.current_interval_ms = interval_ms;
        match self.anchor_ms {
            Some(anchor) if self.is_polling && now_ms >= anchor.saturating_add(interval_ms) => {
                self.anchor_ms = Some(now_ms);
                true
            }
            _ => false,
        }
    }

    pub fn is_polling(&self) -> bool {
        self.is_polling
    }

    pub fn current_interval_ms(&self) -> u64 {
        self.current_interval_ms
    }

    pub fn last_strength(&self) -> SignalStrength {
        self.last_strength
    }

    pub fn next_fire_ms(&self) -> Option<u64> {
        self.anchor_ms
            .map(|anchor| anchor.saturating_add(self.current_interval_ms))
    }
}
