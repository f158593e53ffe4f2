//! Live tracking session

use crate::api::types::LocationHandler;
use crate::core::Location;

/// Continuous delivery of fixes to one handler. Pausing only gates delivery;
/// the sensor subscription is untouched so resuming is instant.
pub struct TrackingSession {
    paused: bool,
    handler: LocationHandler,
}

impl TrackingSession {
    pub fn new(handler: LocationHandler) -> Self {
        Self {
            paused: false,
            handler,
        }
    }

    /// Forward a fix unless paused. Returns whether it was forwarded.
    pub fn deliver(&mut self, location: &Location) -> bool {
        if self.paused {
            return false;
        }
        (self.handler)(location);
        true
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn replace_handler(&mut self, handler: LocationHandler) {
        self.handler = handler;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Coordinate;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_pause_gates_delivery() {
        let delivered = Rc::new(Cell::new(0));
        let counter = Rc::clone(&delivered);
        let mut session = TrackingSession::new(Box::new(move |_: &Location| counter.set(counter.get() + 1)));
        let location = Location::new(Coordinate::new(0.0, 0.0), 5.0, 0);

        assert!(session.deliver(&location));
        session.pause();
        assert!(session.is_paused());
        assert!(!session.deliver(&location));
        session.resume();
        assert!(session.deliver(&location));

        assert_eq!(delivered.get(), 2);
    }
}
