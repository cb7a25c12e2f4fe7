/* 3rd party libraries */
use clap::Parser;
use log::info;
use std::time::Duration;

/* Custom libraries */
use elevator_dispatch::config;
use elevator_dispatch::coordinator::CoordinatorHandle;
use elevator_dispatch::fleet::{Fleet, FleetSnapshot};
use elevator_dispatch::scenario::{self, Scenario, TimedArrival};
use elevator_dispatch::unwrap_or_exit;
use elevator_dispatch::ArrivalEvent;

/* Command line */
#[derive(Parser, Debug)]
#[clap(name = "elevator-dispatch", about = "Elevator fleet dispatch simulator")]
struct Args {
    /// Path to the configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Scenario file with scheduled calls
    #[clap(short, long)]
    scenario: Option<String>,

    /// Tick limit, overrides simulation.max_ticks
    #[clap(short, long)]
    ticks: Option<u64>,

    /// Print arrivals and the final snapshot as JSON lines
    #[clap(long)]
    json: bool,

    /// Drive the scenario through the coordinator thread in wall-clock time
    #[clap(long)]
    realtime: bool,

    /// Log at debug level
    #[clap(short, long)]
    verbose: bool,
}

/* Main */
fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // Load the configuration
    let config = unwrap_or_exit!(config::load_config(&args.config), "Failed to load configuration");
    let max_ticks = args.ticks.unwrap_or(config.simulation.max_ticks);

    let scenario = match &args.scenario {
        Some(path) => unwrap_or_exit!(scenario::load_scenario(path), "Failed to load scenario"),
        None => Scenario::default(),
    };

    let fleet = unwrap_or_exit!(Fleet::from_config(&config), "Failed to create fleet");
    info!(
        "Fleet of {} cars on floors {}..={}, {} scheduled calls",
        fleet.cars().len(),
        config.building.min_floor,
        config.building.max_floor,
        scenario.calls.len()
    );

    if args.realtime {
        let tick_period = Duration::from_millis(config.simulation.tick_ms);
        let (handle, arrival_rx, coordinator_thread) = unwrap_or_exit!(
            CoordinatorHandle::spawn(fleet, tick_period),
            "Failed to start coordinator"
        );

        let arrivals =
            scenario::run_realtime(&handle, &arrival_rx, &scenario, tick_period, max_ticks);
        for event in arrivals.iter() {
            report_arrival(event, None, args.json);
        }

        handle.shutdown();
        match coordinator_thread.join() {
            Ok(fleet) => report_snapshot(&fleet.snapshot(), args.json),
            Err(_) => {
                log::error!("Coordinator thread panicked");
                std::process::exit(1);
            }
        }
    } else {
        let mut fleet = fleet;
        let arrivals = scenario::run_scenario(&mut fleet, &scenario, max_ticks);
        for TimedArrival { tick, event } in arrivals.iter() {
            report_arrival(event, Some(*tick), args.json);
        }
        report_snapshot(&fleet.snapshot(), args.json);
    }
}

fn report_arrival(event: &ArrivalEvent, tick: Option<u64>, json: bool) {
    if json {
        let line = match tick {
            Some(tick) => serde_json::to_string(&TimedArrival { tick, event: *event }),
            None => serde_json::to_string(event),
        };
        println!("{}", unwrap_or_exit!(line, "Failed to encode arrival"));
        return;
    }

    match tick {
        Some(tick) => info!(
            "[tick {}] {} arrived at floor {} heading {}",
            tick, event.car_id, event.floor, event.direction
        ),
        None => info!(
            "{} arrived at floor {} heading {}",
            event.car_id, event.floor, event.direction
        ),
    }
}

fn report_snapshot(snapshot: &FleetSnapshot, json: bool) {
    if json {
        let line = serde_json::to_string(snapshot);
        println!("{}", unwrap_or_exit!(line, "Failed to encode snapshot"));
        return;
    }

    info!("Final state after {} ticks", snapshot.tick);
    for car in snapshot.cars.iter() {
        info!(
            "{} at floor {} heading {}, doors {:?}, stops {:?}",
            car.id,
            car.position,
            car.direction,
            car.door_state,
            car.stops.floors()
        );
    }
    for station in snapshot.stations.iter() {
        info!(
            "Floor {} still waiting: {:?}",
            station.floor(),
            station.pending_calls().collect::<Vec<_>>()
        );
    }
}
