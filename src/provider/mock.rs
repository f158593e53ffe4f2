//! Mock location provider for testing and development

use crate::core::{AuthorizationStatus, Coordinate, DesiredAccuracy, Location};
use crate::provider::{LocationProvider, ProviderEvent, ProviderResult, ProviderSettings, SensorError};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug)]
struct MockState {
    running: bool,
    authorization: AuthorizationStatus,
    settings: ProviderSettings,
    start_count: u32,
    stop_count: u32,
    location_requests: u32,
    one_shot_pending: bool,
    event_queue: VecDeque<ProviderEvent>,
    start_failure: Option<String>,
    honor_distance_filter: bool,
    last_reported: Option<Coordinate>,
}

/// Scriptable provider. Clones share state, so a test can keep a handle
/// after boxing one into a controller.
#[derive(Debug, Clone)]
pub struct MockLocationProvider {
    state: Rc<RefCell<MockState>>,
}

impl MockLocationProvider {
    /// Create an authorized mock provider
    pub fn new() -> Self {
        Self::with_authorization(AuthorizationStatus::AuthorizedWhenInUse)
    }

    pub fn with_authorization(authorization: AuthorizationStatus) -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState {
                running: false,
                authorization,
                settings: ProviderSettings::default(),
                start_count: 0,
                stop_count: 0,
                location_requests: 0,
                one_shot_pending: false,
                event_queue: VecDeque::new(),
                start_failure: None,
                honor_distance_filter: false,
                last_reported: None,
            })),
        }
    }

    /// Drop fixes closer than the distance filter to the previous one, like real hardware
    pub fn with_distance_filtering(self) -> Self {
        self.state.borrow_mut().honor_distance_filter = true;
        self
    }

    /// Queue a fix. Returns false if the distance filter swallowed it.
    pub fn push_fix(&self, location: Location) -> bool {
        let mut state = self.state.borrow_mut();

        if state.honor_distance_filter && !state.one_shot_pending {
            if let Some(last) = state.last_reported {
                if last.distance_to(&location.coordinate) < state.settings.distance_filter_m {
                    return false;
                }
            }
        }

        state.one_shot_pending = false;
        state.last_reported = Some(location.coordinate);
        state.event_queue.push_back(ProviderEvent::Fix(location));
        true
    }

    /// Queue a provider error
    pub fn push_error(&self, error: SensorError) {
        self.state.borrow_mut().event_queue.push_back(ProviderEvent::Error(error));
    }

    /// Change the permission state and queue the matching event
    pub fn set_authorization(&self, authorization: AuthorizationStatus) {
        let mut state = self.state.borrow_mut();
        state.authorization = authorization;
        state.event_queue.push_back(ProviderEvent::AuthorizationChanged(authorization));
    }

    /// Make the next `start` call fail
    pub fn fail_next_start(&self, reason: &str) {
        self.state.borrow_mut().start_failure = Some(reason.to_string());
    }

    pub fn start_count(&self) -> u32 {
        self.state.borrow().start_count
    }

    pub fn stop_count(&self) -> u32 {
        self.state.borrow().stop_count
    }

    pub fn location_request_count(&self) -> u32 {
        self.state.borrow().location_requests
    }

    pub fn settings(&self) -> ProviderSettings {
        self.state.borrow().settings
    }

    pub fn queued_event_count(&self) -> usize {
        self.state.borrow().event_queue.len()
    }
}

impl Default for MockLocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationProvider for MockLocationProvider {
    fn start(&mut self, settings: &ProviderSettings) -> ProviderResult<()> {
        let mut state = self.state.borrow_mut();

        if let Some(reason) = state.start_failure.take() {
            return Err(SensorError::StartFailed { reason });
        }

        state.settings = *settings;
        if !state.running {
            state.running = true;
            state.start_count += 1;
        }
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.running {
            state.running = false;
            state.stop_count += 1;
        }
    }

    fn request_location(&mut self) -> ProviderResult<()> {
        let mut state = self.state.borrow_mut();
        state.location_requests += 1;
        state.one_shot_pending = true;
        Ok(())
    }

    fn set_desired_accuracy(&mut self, accuracy: DesiredAccuracy) {
        self.state.borrow_mut().settings.desired_accuracy = accuracy;
    }

    fn set_distance_filter(&mut self, distance_m: f64) {
        self.state.borrow_mut().settings.distance_filter_m = distance_m;
    }

    fn set_auto_pause_enabled(&mut self, enabled: bool) {
        self.state.borrow_mut().settings.auto_pause_enabled = enabled;
    }

    fn poll_event(&mut self) -> Option<ProviderEvent> {
        self.state.borrow_mut().event_queue.pop_front()
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        self.state.borrow().authorization
    }

    fn is_running(&self) -> bool {
        self.state.borrow().running
    }
}
