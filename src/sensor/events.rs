//! Events republished by the sensor controller

use crate::core::{Location, SignalStrength, SubscriptionMode};
use crate::validation::LocationError;
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Everything the controller tells its listeners about
#[derive(Debug, Clone, PartialEq)]
pub enum SensorEvent {
    /// A fix passed admission and became the latest location
    NewLocation(Location),
    /// Signal strength changed
    NewStrength(SignalStrength),
    /// Sensor-level failure, delivered once per occurrence
    Error(LocationError),
    /// A current-location request completed with this fix
    LocationResolved(Location),
    ModeSubscribed { mode: SubscriptionMode, count: u32 },
    ModeUnsubscribed { mode: SubscriptionMode, count: u32 },
}

/// Fan-out of controller events to any number of listeners
#[derive(Debug, Default)]
pub struct SensorEventBus {
    subscribers: Vec<Sender<SensorEvent>>,
}

impl SensorEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Events are delivered in broadcast order; dropping
    /// the receiver unregisters it on the next broadcast.
    pub fn subscribe(&mut self) -> Receiver<SensorEvent> {
        let (tx, rx) = unbounded::<SensorEvent>();
        self.subscribers.push(tx);
        rx
    }

    pub fn broadcast(&mut self, event: SensorEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn listener_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_reaches_all_listeners() {
        let mut bus = SensorEventBus::new();
        let first = bus.subscribe();
        let second = bus.subscribe();

        bus.broadcast(SensorEvent::NewStrength(SignalStrength::Fair));

        assert_eq!(first.try_recv().unwrap(), SensorEvent::NewStrength(SignalStrength::Fair));
        assert_eq!(second.try_recv().unwrap(), SensorEvent::NewStrength(SignalStrength::Fair));
    }

    #[test]
    fn test_dropped_listener_removed() {
        let mut bus = SensorEventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.listener_count(), 2);

        bus.broadcast(SensorEvent::NewStrength(SignalStrength::Poor));
        assert_eq!(bus.listener_count(), 1);
        assert!(kept.try_recv().is_ok());
    }
}
