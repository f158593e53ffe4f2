//! One-shot current-location resolution

use crate::api::types::LocationHandler;
use crate::core::{DesiredAccuracy, Location};

/// Lifecycle of a resolution request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    /// Waiting for a qualifying fix
    Pending,
    /// Handing a fix to the in-progress handler
    Delivering,
    Completed,
    Cancelled,
}

/// Result of feeding one fix to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    InProgress,
    Completed,
    /// Request already finished; the fix was ignored
    Ignored,
}

/// A single attempt to resolve the current location. Every fix goes to the
/// in-progress handler; the first fix meeting the desired accuracy also goes
/// to the completion handler, exactly once.
pub struct ResolutionRequest {
    state: ResolutionState,
    desired_accuracy: DesiredAccuracy,
    in_progress: LocationHandler,
    completion: Option<LocationHandler>,
}

impl ResolutionRequest {
    pub fn new(
        desired_accuracy: DesiredAccuracy,
        in_progress: LocationHandler,
        completion: LocationHandler,
    ) -> Self {
        Self {
            state: ResolutionState::Pending,
            desired_accuracy,
            in_progress,
            completion: Some(completion),
        }
    }

    pub fn deliver(&mut self, location: &Location) -> ResolutionOutcome {
        if self.is_finished() {
            return ResolutionOutcome::Ignored;
        }

        self.state = ResolutionState::Delivering;
        (self.in_progress)(location);

        if self.desired_accuracy.is_satisfied_by(location) {
            self.state = ResolutionState::Completed;
            if let Some(mut completion) = self.completion.take() {
                completion(location);
            }
            ResolutionOutcome::Completed
        } else {
            self.state = ResolutionState::Pending;
            ResolutionOutcome::InProgress
        }
    }

    /// Drop the completion handler without calling it
    pub fn cancel(&mut self) {
        if !self.is_finished() {
            self.state = ResolutionState::Cancelled;
            self.completion = None;
        }
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    pub fn desired_accuracy(&self) -> DesiredAccuracy {
        self.desired_accuracy
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, ResolutionState::Completed | ResolutionState::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Coordinate;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn fix(accuracy: f64) -> Location {
        Location::new(Coordinate::new(48.85, 2.35), accuracy, 0)
    }

    fn recorder() -> (Rc<RefCell<Vec<f64>>>, LocationHandler) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let handler: LocationHandler =
            Box::new(move |location: &Location| sink.borrow_mut().push(location.horizontal_accuracy_m));
        (seen, handler)
    }

    #[test]
    fn test_completes_on_first_qualifying_fix() {
        let (progress, on_progress) = recorder();
        let (done, on_done) = recorder();
        let mut request = ResolutionRequest::new(DesiredAccuracy::Meters(50.0), on_progress, on_done);

        assert_eq!(request.deliver(&fix(500.0)), ResolutionOutcome::InProgress);
        assert_eq!(request.deliver(&fix(80.0)), ResolutionOutcome::InProgress);
        assert_eq!(request.state(), ResolutionState::Pending);
        assert_eq!(request.deliver(&fix(40.0)), ResolutionOutcome::Completed);
        assert_eq!(request.deliver(&fix(10.0)), ResolutionOutcome::Ignored);

        assert_eq!(*progress.borrow(), vec![500.0, 80.0, 40.0]);
        assert_eq!(*done.borrow(), vec![40.0]);
        assert_eq!(request.state(), ResolutionState::Completed);
    }

    #[test]
    fn test_zero_accuracy_completes_immediately() {
        let (_, on_progress) = recorder();
        let (done, on_done) = recorder();
        let mut request = ResolutionRequest::new(DesiredAccuracy::Best, on_progress, on_done);

        assert_eq!(request.deliver(&fix(0.0)), ResolutionOutcome::Completed);
        assert_eq!(*done.borrow(), vec![0.0]);
    }

    #[test]
    fn test_cancel_suppresses_completion() {
        let (progress, on_progress) = recorder();
        let (done, on_done) = recorder();
        let mut request = ResolutionRequest::new(DesiredAccuracy::Meters(50.0), on_progress, on_done);

        request.deliver(&fix(200.0));
        request.cancel();
        assert_eq!(request.state(), ResolutionState::Cancelled);
        assert_eq!(request.deliver(&fix(5.0)), ResolutionOutcome::Ignored);

        assert_eq!(*progress.borrow(), vec![200.0]);
        assert!(done.borrow().is_empty());
    }
}
