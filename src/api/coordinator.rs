//! Request coordinator
//!
//! Callback-based front end over a shared [`SensorController`]. Translates
//! signal monitoring, one-shot resolution and live tracking into mode
//! subscriptions, and owns the polling timer, the resolution completion
//! policy and the reaction to foreground/background transitions.
//!
//! The coordinator is cooperative: the host calls [`RequestCoordinator::process`]
//! regularly from the same context that owns the controller. Handlers are
//! never invoked while the controller is borrowed.
//!
//! [`SensorController`]: crate::sensor::SensorController

use crate::api::lifecycle::LifecycleSignal;
use crate::api::polling::PollingState;
use crate::api::resolution::{ResolutionOutcome, ResolutionRequest};
use crate::api::tracking::TrackingSession;
use crate::api::types::{ErrorHandler, LocationHandler, StrengthHandler};
use crate::core::{AuthorizationStatus, Location, SignalStrength, SubscriptionMode};
use crate::sensor::{DeferredReleases, SensorEvent, SharedController};
use crate::validation::LocationError;
use crossbeam_channel::Receiver;
use tracing::{debug, info, trace, warn};

struct MonitoringSession {
    handler: StrengthHandler,
    polling: PollingState,
    /// Unsubscribed while the app is in the background
    suspended: bool,
}

pub struct RequestCoordinator {
    controller: SharedController,
    events: Receiver<SensorEvent>,
    releases: DeferredReleases,
    monitoring: Option<MonitoringSession>,
    resolution: Option<ResolutionRequest>,
    tracking: Option<TrackingSession>,
    error_handler: Option<ErrorHandler>,
    lifecycle: LifecycleSignal,
}

impl RequestCoordinator {
    pub fn new(controller: SharedController) -> Self {
        let (events, releases) = {
            let mut shared = controller.borrow_mut();
            (shared.listen(), shared.deferred_releases())
        };
        Self {
            controller,
            events,
            releases,
            monitoring: None,
            resolution: None,
            tracking: None,
            error_handler: None,
            lifecycle: LifecycleSignal::Foreground,
        }
    }

    /// Pump provider events, dispatch republished events and fire a due
    /// polling tick. Returns the number of events dispatched.
    pub fn process(&mut self) -> usize {
        self.controller.borrow_mut().process();
        let dispatched = self.dispatch_events();
        self.fire_due_timer();
        dispatched
    }

    fn dispatch_events(&mut self) -> usize {
        let mut dispatched = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
            dispatched += 1;
        }
        dispatched
    }

    fn handle_event(&mut self, event: SensorEvent) {
        match event {
            SensorEvent::NewLocation(location) => self.deliver_location(&location),
            SensorEvent::NewStrength(strength) => self.deliver_strength(strength),
            SensorEvent::Error(error) => self.deliver_error(&error),
            SensorEvent::LocationResolved(location) => {
                trace!(accuracy_m = location.horizontal_accuracy_m, "Resolution announced");
            }
            SensorEvent::ModeSubscribed { mode, count }
            | SensorEvent::ModeUnsubscribed { mode, count } => {
                trace!(mode = %mode, count, "Mode count changed");
            }
        }
    }

    fn deliver_location(&mut self, location: &Location) {
        let resolved = self
            .resolution
            .as_mut()
            .is_some_and(|request| request.deliver(location) == ResolutionOutcome::Completed);
        if resolved {
            info!(accuracy_m = location.horizontal_accuracy_m, "Current location resolved");
            self.resolution = None;
            let mut controller = self.controller.borrow_mut();
            controller.publish_resolved(location.clone());
            controller.unsubscribe(SubscriptionMode::CurrentLocation);
        }

        if let Some(session) = self.tracking.as_mut() {
            if !session.deliver(location) {
                trace!("Live tracking paused; fix withheld");
            }
        }
    }

    fn deliver_strength(&mut self, strength: SignalStrength) {
        let Some(session) = self.monitoring.as_mut() else {
            return;
        };
        if session.suspended {
            return;
        }

        (session.handler)(strength);

        let (now_ms, interval_ms) = {
            let controller = self.controller.borrow();
            (
                controller.now_ms(),
                controller.config().recheck_interval_ms(strength.is_healthy()),
            )
        };
        session.polling.record_strength(strength, interval_ms, now_ms);
        debug!(strength = %strength, interval_ms, "Signal recheck rescheduled");
    }

    fn deliver_error(&mut self, error: &LocationError) {
        match self.error_handler.as_mut() {
            Some(handler) => handler(error),
            None => debug!(%error, "Location error with no handler registered"),
        }
    }

    fn fire_due_timer(&mut self) {
        let Some(session) = self.monitoring.as_mut() else {
            return;
        };
        if session.suspended {
            return;
        }

        let mut controller = self.controller.borrow_mut();
        let interval_ms = controller
            .config()
            .recheck_interval_ms(session.polling.last_strength().is_healthy());
        if !session.polling.take_due(controller.now_ms(), interval_ms) {
            return;
        }

        // Live tracking already produces a steady stream of fixes
        if controller.is_mode_active(SubscriptionMode::LiveTracking) {
            trace!("Signal recheck suppressed by live tracking");
        } else {
            trace!("Signal recheck");
            controller.force_check();
        }
    }

    /// Start polling for signal strength. A second call replaces the handler.
    pub fn start_signal_monitoring(&mut self, handler: StrengthHandler) {
        if let Some(session) = self.monitoring.as_mut() {
            session.handler = handler;
            return;
        }

        let mut polling = PollingState::new();
        self.resume_polling(&mut polling);
        self.monitoring = Some(MonitoringSession {
            handler,
            polling,
            suspended: false,
        });
        info!("Signal monitoring started");
    }

    /// Subscribe to signal monitoring and arm the timer for the current strength
    fn resume_polling(&self, polling: &mut PollingState) {
        let mut controller = self.controller.borrow_mut();
        controller.subscribe(SubscriptionMode::SignalMonitoring);

        let strength = controller.current_strength();
        let interval_ms = controller.config().recheck_interval_ms(strength.is_healthy());
        polling.start(controller.now_ms(), strength, interval_ms);
    }

    pub fn stop_signal_monitoring(&mut self) {
        if let Some(session) = self.monitoring.take() {
            if !session.suspended {
                self.controller
                    .borrow_mut()
                    .unsubscribe(SubscriptionMode::SignalMonitoring);
            }
            info!("Signal monitoring stopped");
        }
    }

    /// Resolve the current location. Every fix goes to `in_progress`; the
    /// first fix meeting the configured desired accuracy also goes to
    /// `completion`, after which the request ends. A call while a request is
    /// pending replaces its handlers.
    pub fn resolve_current_location(&mut self, in_progress: LocationHandler, completion: LocationHandler) {
        let mut controller = self.controller.borrow_mut();
        let desired_accuracy = controller.config().desired_accuracy;

        if self.resolution.is_none() {
            controller.subscribe(SubscriptionMode::CurrentLocation);
        }
        self.resolution = Some(ResolutionRequest::new(desired_accuracy, in_progress, completion));
        info!(?desired_accuracy, "Resolving current location");
    }

    /// Abandon a pending resolution without calling its handlers
    pub fn cancel_resolving_current_location(&mut self) {
        if let Some(mut request) = self.resolution.take() {
            request.cancel();
            self.controller
                .borrow_mut()
                .unsubscribe(SubscriptionMode::CurrentLocation);
            info!("Current location resolution cancelled");
        }
    }

    /// Stream every accepted fix to `handler`. A second call replaces the
    /// handler and resumes delivery.
    pub fn start_live_tracking(&mut self, handler: LocationHandler) {
        match self.tracking.as_mut() {
            Some(session) => {
                session.replace_handler(handler);
                session.resume();
            }
            None => {
                self.controller
                    .borrow_mut()
                    .subscribe(SubscriptionMode::LiveTracking);
                self.tracking = Some(TrackingSession::new(handler));
                info!("Live tracking started");
            }
        }
    }

    pub fn pause_live_tracking(&mut self) {
        if let Some(session) = self.tracking.as_mut() {
            session.pause();
            debug!("Live tracking paused");
        }
    }

    pub fn resume_live_tracking(&mut self) {
        if let Some(session) = self.tracking.as_mut() {
            session.resume();
            debug!("Live tracking resumed");
        }
    }

    pub fn stop_live_tracking(&mut self) {
        if self.tracking.take().is_some() {
            self.controller
                .borrow_mut()
                .unsubscribe(SubscriptionMode::LiveTracking);
            info!("Live tracking stopped");
        }
    }

    /// One-off fresh fix, usable in any mode
    pub fn force_location_check(&mut self) {
        self.controller.borrow_mut().force_check();
    }

    pub fn set_error_handler(&mut self, handler: ErrorHandler) {
        self.error_handler = Some(handler);
    }

    /// React to the host moving between foreground and background. Signal
    /// monitoring on its own is suspended in the background; while any
    /// coordinator on the controller is live tracking or resolving, it keeps
    /// running.
    pub fn handle_lifecycle(&mut self, signal: LifecycleSignal) {
        if signal == self.lifecycle {
            return;
        }
        self.lifecycle = signal;

        match signal {
            LifecycleSignal::Background => self.suspend_monitoring(),
            LifecycleSignal::Foreground => self.restore_monitoring(),
        }
    }

    fn suspend_monitoring(&mut self) {
        let Some(session) = self.monitoring.as_mut() else {
            return;
        };
        if session.suspended {
            return;
        }

        let mut controller = self.controller.borrow_mut();
        if controller.is_mode_active(SubscriptionMode::LiveTracking)
            || controller.is_mode_active(SubscriptionMode::CurrentLocation)
        {
            debug!("Signal monitoring kept in background; sensor still in use");
            return;
        }

        session.polling.stop();
        session.suspended = true;
        controller.unsubscribe(SubscriptionMode::SignalMonitoring);
        drop(controller);
        info!("Signal monitoring suspended for background");

        // Strength reset by the shutdown belongs to the suspended session
        self.dispatch_events();
    }

    fn restore_monitoring(&mut self) {
        let Some(mut session) = self.monitoring.take() else {
            return;
        };
        if session.suspended {
            self.resume_polling(&mut session.polling);
            session.suspended = false;
            info!("Signal monitoring restored in foreground");
        }
        self.monitoring = Some(session);
    }

    // Read-only state

    pub fn current_location(&self) -> Option<Location> {
        self.controller.borrow().current_location().cloned()
    }

    pub fn current_strength(&self) -> SignalStrength {
        self.controller.borrow().current_strength()
    }

    pub fn authorization_status(&self) -> AuthorizationStatus {
        self.controller.borrow().authorization_status()
    }

    pub fn controller(&self) -> &SharedController {
        &self.controller
    }

    pub fn is_signal_monitoring(&self) -> bool {
        self.monitoring.as_ref().is_some_and(|session| !session.suspended)
    }

    pub fn is_resolving(&self) -> bool {
        self.resolution.is_some()
    }

    pub fn is_live_tracking(&self) -> bool {
        self.tracking.is_some()
    }

    pub fn is_live_tracking_paused(&self) -> bool {
        self.tracking.as_ref().is_some_and(TrackingSession::is_paused)
    }

    pub fn polling_state(&self) -> Option<&PollingState> {
        self.monitoring.as_ref().map(|session| &session.polling)
    }

    pub fn lifecycle(&self) -> LifecycleSignal {
        self.lifecycle
    }
}

impl Drop for RequestCoordinator {
    fn drop(&mut self) {
        let mut held = Vec::new();
        if self.monitoring.as_ref().is_some_and(|session| !session.suspended) {
            held.push(SubscriptionMode::SignalMonitoring);
        }
        if self.resolution.is_some() {
            held.push(SubscriptionMode::CurrentLocation);
        }
        if self.tracking.is_some() {
            held.push(SubscriptionMode::LiveTracking);
        }
        if held.is_empty() {
            return;
        }

        match self.controller.try_borrow_mut() {
            Ok(mut controller) => {
                for mode in held {
                    controller.unsubscribe(mode);
                }
            }
            Err(_) => {
                warn!(?held, "Controller busy during coordinator teardown; releases deferred");
                self.releases.borrow_mut().extend(held);
            }
        }
    }
}
