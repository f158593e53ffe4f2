use location_hub::{
    init_logging, AuthorizationStatus, Clock, Coordinate, DesiredAccuracy, LifecycleSignal, Location,
    LocationConfig, LocationError, ManualClock, MockLocationProvider, RequestCoordinator,
    SensorController, SensorError, SignalStrength,
};
use std::rc::Rc;

const DEMO_START_MS: u64 = 1_700_000_000_000;

struct DemoSession {
    coordinator: RequestCoordinator,
    provider: MockLocationProvider,
    clock: ManualClock,
}

impl DemoSession {
    fn new(config: LocationConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let provider = MockLocationProvider::new().with_distance_filtering();
        let clock = ManualClock::new(DEMO_START_MS);
        let controller =
            SensorController::with_config(Box::new(provider.clone()), config, Rc::new(clock.clone()))?
                .into_shared();

        Ok(Self {
            coordinator: RequestCoordinator::new(controller),
            provider,
            clock,
        })
    }

    /// Feed one fix `meters_north` of the starting point and let the coordinator run
    fn fix(&mut self, meters_north: f64, accuracy_m: f64) {
        let latitude = 47.6062 + meters_north / 111_320.0;
        let location = Location::new(Coordinate::new(latitude, -122.3321), accuracy_m, self.clock.now_ms());
        if !self.provider.push_fix(location) {
            println!("  (sensor suppressed fix inside distance filter)");
        }
        self.coordinator.process();
    }

    fn sensor_running(&self) -> bool {
        self.coordinator.controller().borrow().is_provider_running()
    }

    fn wait(&mut self, ms: u64) {
        self.clock.advance(ms);
        self.coordinator.process();
    }
}

fn print_location(prefix: &str, location: &Location) {
    println!(
        "{}: lat={:.6}, lon={:.6}, accuracy={:.0} m",
        prefix, location.coordinate.latitude, location.coordinate.longitude, location.horizontal_accuracy_m
    );
}

fn run_demo(config: LocationConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = DemoSession::new(config)?;

    session
        .coordinator
        .set_error_handler(Box::new(|error: &LocationError| println!("Error: {}", error)));

    println!("== Signal monitoring ==");
    session
        .coordinator
        .start_signal_monitoring(Box::new(|strength: SignalStrength| println!("Signal: {}", strength)));
    session.fix(0.0, 400.0);
    session.wait(3_000);
    session.fix(200.0, 90.0);
    session.fix(400.0, 25.0);

    println!("== Current location ==");
    session.coordinator.resolve_current_location(
        Box::new(|location: &Location| print_location("  candidate", location)),
        Box::new(|location: &Location| print_location("Resolved", location)),
    );
    session.coordinator.force_location_check();
    session.fix(400.0, 150.0);
    session.coordinator.force_location_check();
    session.fix(400.0, 30.0);

    println!("== Live tracking ==");
    session
        .coordinator
        .start_live_tracking(Box::new(|location: &Location| print_location("Track", location)));
    session.fix(450.0, 8.0);
    session.fix(452.0, 8.0);
    session.coordinator.pause_live_tracking();
    session.fix(600.0, 8.0);
    session.coordinator.resume_live_tracking();
    session.fix(750.0, 8.0);
    session.provider.push_error(SensorError::SignalLost);
    session.coordinator.process();
    session.coordinator.stop_live_tracking();

    println!("== Background ==");
    session.coordinator.handle_lifecycle(LifecycleSignal::Background);
    println!("Sensor running in background: {}", session.sensor_running());
    session.wait(60_000);
    session.coordinator.handle_lifecycle(LifecycleSignal::Foreground);
    println!("Sensor running in foreground: {}", session.sensor_running());

    println!("== Permission revoked ==");
    session.provider.set_authorization(AuthorizationStatus::Denied);
    session.coordinator.process();

    session.coordinator.stop_signal_monitoring();
    println!(
        "Sensor started {} time(s), stopped {} time(s), {} forced check(s)",
        session.provider.start_count(),
        session.provider.stop_count(),
        session.provider.location_request_count()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let args: Vec<String> = std::env::args().collect();

    // Write the default configuration and exit
    if args.len() == 3 && args[1] == "--write-config" {
        LocationConfig::default().save_to_file(&args[2])?;
        println!("Default configuration written to {}", args[2]);
        return Ok(());
    }

    let config = match args.len() {
        1 => LocationConfig::default(),
        2 => LocationConfig::from_file(&args[1])?,
        _ => {
            let program = args.first().map_or("location_hub", |s| s.as_str());
            eprintln!("Usage: {} [config_json]", program);
            eprintln!("   or: {} --write-config <path>", program);
            return Err("Invalid arguments".into());
        }
    };

    let accuracy = match config.desired_accuracy {
        DesiredAccuracy::Meters(meters) => format!("{:.0} m", meters),
        other => format!("{:.0} m ({:?})", other.threshold_m(), other),
    };
    println!("Desired accuracy: {}", accuracy);

    run_demo(config)
}
