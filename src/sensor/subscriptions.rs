//! Reference-counted mode activation

use crate::core::SubscriptionMode;
use std::collections::BTreeMap;

/// Outcome of a count change for one mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTransition {
    /// Count went 0 -> 1
    Activated,
    /// Count went 1 -> 0
    Deactivated,
    /// Count moved without crossing zero
    Adjusted,
    /// Decrement at zero; nothing changed
    Unchanged,
}

/// Number of active subscribers per mode. Counts never go negative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeSubscriptionCount {
    counts: BTreeMap<SubscriptionMode, u32>,
}

impl ModeSubscriptionCount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, mode: SubscriptionMode) -> ModeTransition {
        let count = self.counts.entry(mode).or_insert(0);
        *count = count.saturating_add(1);
        if *count == 1 {
            ModeTransition::Activated
        } else {
            ModeTransition::Adjusted
        }
    }

    pub fn decrement(&mut self, mode: SubscriptionMode) -> ModeTransition {
        match self.counts.get_mut(&mode) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    self.counts.remove(&mode);
                    ModeTransition::Deactivated
                } else {
                    ModeTransition::Adjusted
                }
            }
            _ => ModeTransition::Unchanged,
        }
    }

    pub fn count(&self, mode: SubscriptionMode) -> u32 {
        self.counts.get(&mode).copied().unwrap_or(0)
    }

    pub fn is_active(&self, mode: SubscriptionMode) -> bool {
        self.count(mode) > 0
    }

    /// True if any mode has at least one subscriber
    pub fn any_active(&self) -> bool {
        !self.counts.is_empty()
    }

    /// Active modes in declaration order
    pub fn active_modes(&self) -> Vec<SubscriptionMode> {
        self.counts.keys().copied().collect()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}
