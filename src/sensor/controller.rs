//! Sensor controller
//!
//! Owns the single location provider and keeps it configured for the union
//! of active modes. Incoming fixes are admitted, graded and republished on
//! the controller's event bus.

use crate::core::{
    AuthorizationStatus, Clock, DesiredAccuracy, Location, SignalStrength, SubscriptionMode,
    SystemClock,
};
use crate::provider::{LocationProvider, ProviderEvent, ProviderSettings, SensorError};
use crate::sensor::events::{SensorEvent, SensorEventBus};
use crate::sensor::subscriptions::{ModeSubscriptionCount, ModeTransition};
use crate::utils::config::{ConfigResult, LocationConfig};
use crate::validation::{AdmissionFilter, LocationError};
use crossbeam_channel::Receiver;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, trace, warn};

/// Controller shared between coordinators on the same execution context
pub type SharedController = Rc<RefCell<SensorController>>;

/// Unsubscribes queued by owners that could not borrow the controller
pub type DeferredReleases = Rc<RefCell<Vec<SubscriptionMode>>>;

pub struct SensorController {
    provider: Box<dyn LocationProvider>,
    clock: Rc<dyn Clock>,
    config: LocationConfig,
    counts: ModeSubscriptionCount,
    /// Settings last pushed to the provider
    settings: ProviderSettings,
    latest_location: Option<Location>,
    strength: SignalStrength,
    authorization: AuthorizationStatus,
    /// A one-off fix was requested while no mode may have been active
    force_check_pending: bool,
    /// PermissionDenied already reported for the current blocked status
    denial_reported: bool,
    events: SensorEventBus,
    deferred_releases: DeferredReleases,
}

impl SensorController {
    /// Controller with default configuration and the system clock
    pub fn new(provider: Box<dyn LocationProvider>) -> Self {
        Self::build(provider, LocationConfig::default(), Rc::new(SystemClock))
    }

    /// Controller with explicit configuration and time source
    pub fn with_config(
        provider: Box<dyn LocationProvider>,
        config: LocationConfig,
        clock: Rc<dyn Clock>,
    ) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::build(provider, config, clock))
    }

    fn build(provider: Box<dyn LocationProvider>, config: LocationConfig, clock: Rc<dyn Clock>) -> Self {
        let authorization = provider.authorization_status();
        Self {
            provider,
            clock,
            config,
            counts: ModeSubscriptionCount::new(),
            settings: ProviderSettings::default(),
            latest_location: None,
            strength: SignalStrength::None,
            authorization,
            force_check_pending: false,
            denial_reported: false,
            events: SensorEventBus::new(),
            deferred_releases: DeferredReleases::default(),
        }
    }

    /// Wrap for sharing with one or more request coordinators
    pub fn into_shared(self) -> SharedController {
        Rc::new(RefCell::new(self))
    }

    /// Swap in a different provider, e.g. a mock. Active modes carry over.
    pub fn use_provider(&mut self, provider: Box<dyn LocationProvider>) {
        self.provider.stop();
        self.provider = provider;
        let previous = std::mem::replace(&mut self.authorization, self.provider.authorization_status());
        if previous != self.authorization {
            self.denial_reported = false;
        }
        info!(authorization = %self.authorization, "Location provider replaced");

        if self.authorization.is_blocked() {
            self.set_strength(SignalStrength::None);
        }
        if self.counts.any_active() {
            self.sync_provider();
        }
    }

    /// Register a listener for republished events
    pub fn listen(&mut self) -> Receiver<SensorEvent> {
        self.events.subscribe()
    }

    /// Queue for unsubscribes that must wait until the controller is free.
    /// Applied at the start of the next `process`.
    pub fn deferred_releases(&self) -> DeferredReleases {
        Rc::clone(&self.deferred_releases)
    }

    fn apply_deferred_releases(&mut self) {
        let pending: Vec<SubscriptionMode> = self.deferred_releases.borrow_mut().drain(..).collect();
        for mode in pending {
            debug!(mode = %mode, "Applying deferred unsubscribe");
            self.unsubscribe(mode);
        }
    }

    // Subscription surface

    /// Add a subscriber for `mode`, starting or reconfiguring the provider as needed
    pub fn subscribe(&mut self, mode: SubscriptionMode) {
        let transition = self.counts.increment(mode);
        let count = self.counts.count(mode);
        debug!(mode = %mode, count, "Mode subscribed");

        self.events.broadcast(SensorEvent::ModeSubscribed { mode, count });

        if transition == ModeTransition::Activated || !self.provider.is_running() {
            self.sync_provider();
        }
    }

    /// Remove a subscriber for `mode`. Unsubscribing an inactive mode is a no-op.
    pub fn unsubscribe(&mut self, mode: SubscriptionMode) {
        let transition = self.counts.decrement(mode);
        if transition == ModeTransition::Unchanged {
            trace!(mode = %mode, "Unsubscribe for inactive mode ignored");
            return;
        }

        let count = self.counts.count(mode);
        debug!(mode = %mode, count, "Mode unsubscribed");

        self.events.broadcast(SensorEvent::ModeUnsubscribed { mode, count });

        if transition == ModeTransition::Deactivated {
            self.sync_provider();
        }
    }

    /// Ask for one fresh fix regardless of active modes
    pub fn force_check(&mut self) {
        if self.authorization.is_blocked() {
            debug!(authorization = %self.authorization, "Forced location check skipped");
            return;
        }

        match self.provider.request_location() {
            Ok(()) => {
                trace!("Forced location check requested");
                self.force_check_pending = true;
            }
            Err(error) => {
                warn!(%error, "Forced location check failed");
                self.report_error(error.into());
            }
        }
    }

    // Provider callbacks

    /// Drain and handle every pending provider event. Returns how many were handled.
    pub fn process(&mut self) -> usize {
        self.apply_deferred_releases();

        let mut handled = 0;
        while let Some(event) = self.provider.poll_event() {
            self.handle_provider_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_provider_event(&mut self, event: ProviderEvent) {
        match event {
            ProviderEvent::Fix(location) => self.handle_provider_fix(location),
            ProviderEvent::AuthorizationChanged(status) => self.handle_authorization_change(status),
            ProviderEvent::Error(error) => self.handle_provider_error(error),
        }
    }

    pub fn handle_provider_fix(&mut self, location: Location) {
        if !self.counts.any_active() && !self.force_check_pending {
            trace!("Fix arrived with no active mode; dropped");
            return;
        }

        let filter = AdmissionFilter::new(self.config.max_location_age_ms);
        if let Err(rejection) = filter.check(&location, self.clock.now_ms()) {
            debug!(%rejection, "Fix dropped");
            return;
        }

        self.force_check_pending = false;
        let strength = SignalStrength::from_accuracy(location.horizontal_accuracy_m);
        trace!(
            accuracy_m = location.horizontal_accuracy_m,
            strength = %strength,
            "Fix accepted"
        );

        self.latest_location = Some(location.clone());
        self.events.broadcast(SensorEvent::NewLocation(location));
        self.set_strength(strength);
    }

    pub fn handle_authorization_change(&mut self, status: AuthorizationStatus) {
        let previous = std::mem::replace(&mut self.authorization, status);
        if previous == status {
            return;
        }
        info!(%previous, %status, "Location authorization changed");
        self.denial_reported = false;

        if status.is_blocked() {
            self.set_strength(SignalStrength::None);
            self.report_denied();
        } else if status.is_authorized() && self.counts.any_active() && !self.provider.is_running() {
            self.sync_provider();
        }
    }

    pub fn handle_provider_error(&mut self, error: SensorError) {
        warn!(%error, transient = error.is_transient(), "Location provider error");
        if !error.is_transient() {
            self.set_strength(SignalStrength::None);
        }
        self.report_error(error.into());
    }

    // Provider management

    /// Provider configuration required by the currently active modes
    fn desired_settings(&self) -> ProviderSettings {
        let accuracy = self
            .counts
            .active_modes()
            .into_iter()
            .map(|mode| self.accuracy_for_mode(mode))
            .reduce(DesiredAccuracy::best_of)
            .unwrap_or(self.config.desired_accuracy);

        ProviderSettings {
            desired_accuracy: accuracy,
            distance_filter_m: self.config.distance_filter_m,
            // Continuous tracking must not be suspended by idle heuristics
            auto_pause_enabled: !self.counts.is_active(SubscriptionMode::LiveTracking),
        }
    }

    fn accuracy_for_mode(&self, mode: SubscriptionMode) -> DesiredAccuracy {
        match mode {
            SubscriptionMode::LiveTracking => self.config.desired_accuracy_live_tracking,
            SubscriptionMode::SignalMonitoring | SubscriptionMode::CurrentLocation => {
                self.config.desired_accuracy
            }
        }
    }

    /// Bring the provider in line with the active modes
    fn sync_provider(&mut self) {
        if !self.counts.any_active() {
            self.shutdown_provider();
            return;
        }

        let desired = self.desired_settings();
        if self.provider.is_running() {
            if desired != self.settings {
                debug!(?desired, "Reconfiguring location provider");
                desired.apply_changes(&self.settings, self.provider.as_mut());
                self.settings = desired;
            }
        } else {
            self.settings = desired;
            self.start_provider();
        }
    }

    fn start_provider(&mut self) {
        if self.authorization.is_blocked() {
            warn!(authorization = %self.authorization, "Location provider not started");
            self.set_strength(SignalStrength::None);
            self.report_denied();
            return;
        }

        match self.provider.start(&self.settings) {
            Ok(()) => info!(settings = ?self.settings, "Location provider started"),
            Err(error) => {
                warn!(%error, "Location provider failed to start");
                self.set_strength(SignalStrength::None);
                self.report_error(error.into());
            }
        }
    }

    fn shutdown_provider(&mut self) {
        self.provider.stop();
        self.latest_location = None;
        self.force_check_pending = false;
        self.set_strength(SignalStrength::None);
        info!("Location provider stopped; no active modes");
    }

    fn set_strength(&mut self, strength: SignalStrength) {
        if strength == self.strength {
            return;
        }
        debug!(from = %self.strength, to = %strength, "Signal strength changed");
        self.strength = strength;
        self.events.broadcast(SensorEvent::NewStrength(strength));
    }

    fn report_error(&mut self, error: LocationError) {
        self.events.broadcast(SensorEvent::Error(error));
    }

    /// Report the current denial once; repeated start attempts stay quiet
    fn report_denied(&mut self) {
        if self.denial_reported {
            trace!(authorization = %self.authorization, "Denial already reported");
            return;
        }
        self.denial_reported = true;
        self.report_error(LocationError::PermissionDenied {
            status: self.authorization,
        });
    }

    /// Announce a completed current-location resolution to every listener
    pub fn publish_resolved(&mut self, location: Location) {
        debug!(accuracy_m = location.horizontal_accuracy_m, "Location resolved");
        self.events.broadcast(SensorEvent::LocationResolved(location));
    }

    // Configuration

    pub fn config(&self) -> &LocationConfig {
        &self.config
    }

    /// Replace the whole configuration, reconfiguring a running provider
    pub fn set_config(&mut self, config: LocationConfig) -> ConfigResult<()> {
        config.validate()?;
        self.config = config;
        self.refresh_settings();
        Ok(())
    }

    pub fn set_healthy_recheck_interval(&mut self, interval_ms: u64) -> ConfigResult<u64> {
        self.config.set_healthy_recheck_interval(interval_ms)
    }

    pub fn set_weak_recheck_interval(&mut self, interval_ms: u64) -> ConfigResult<u64> {
        self.config.set_weak_recheck_interval(interval_ms)
    }

    pub fn set_desired_accuracy(&mut self, accuracy: DesiredAccuracy) -> ConfigResult<DesiredAccuracy> {
        let previous = self.config.set_desired_accuracy(accuracy)?;
        self.refresh_settings();
        Ok(previous)
    }

    pub fn set_desired_accuracy_live_tracking(
        &mut self,
        accuracy: DesiredAccuracy,
    ) -> ConfigResult<DesiredAccuracy> {
        let previous = self.config.set_desired_accuracy_live_tracking(accuracy)?;
        self.refresh_settings();
        Ok(previous)
    }

    pub fn set_distance_filter(&mut self, distance_m: f64) -> ConfigResult<f64> {
        let previous = self.config.set_distance_filter(distance_m)?;
        self.refresh_settings();
        Ok(previous)
    }

    pub fn set_max_location_age(&mut self, max_age_ms: Option<u64>) -> ConfigResult<Option<u64>> {
        self.config.set_max_location_age(max_age_ms)
    }

    fn refresh_settings(&mut self) {
        if self.counts.any_active() && self.provider.is_running() {
            self.sync_provider();
        }
    }

    // Read-only state

    pub fn current_location(&self) -> Option<&Location> {
        self.latest_location.as_ref()
    }

    pub fn current_strength(&self) -> SignalStrength {
        self.strength
    }

    pub fn authorization_status(&self) -> AuthorizationStatus {
        self.authorization
    }

    pub fn subscription_count(&self, mode: SubscriptionMode) -> u32 {
        self.counts.count(mode)
    }

    pub fn is_mode_active(&self, mode: SubscriptionMode) -> bool {
        self.counts.is_active(mode)
    }

    pub fn active_modes(&self) -> Vec<SubscriptionMode> {
        self.counts.active_modes()
    }

    pub fn is_provider_running(&self) -> bool {
        self.provider.is_running()
    }

    /// Settings in effect while the provider runs
    pub fn provider_settings(&self) -> Option<ProviderSettings> {
        self.provider.is_running().then_some(self.settings)
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn display_name_for_mode(mode: SubscriptionMode) -> &'static str {
        mode.display_name()
    }

    pub fn display_name_for_strength(strength: SignalStrength) -> &'static str {
        strength.display_name()
    }
}

impl Drop for SensorController {
    fn drop(&mut self) {
        self.provider.stop();
    }
}
