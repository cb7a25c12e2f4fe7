/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{info, warn};
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::coordinator::CoordinatorHandle;
use crate::error::ConfigError;
use crate::fleet::Fleet;
use crate::shared::{ArrivalEvent, CallDirection, CarId};

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    Hall,
    Car,
}

/// One button press, submitted at the start of `tick`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledCall {
    pub tick: u64,
    pub kind: CallKind,
    pub floor: i32,
    #[serde(default)]
    pub direction: Option<CallDirection>,
    #[serde(default)]
    pub car: Option<CarId>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Scenario {
    #[serde(default, rename = "call")]
    pub calls: Vec<ScheduledCall>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedArrival {
    pub tick: u64,
    #[serde(flatten)]
    pub event: ArrivalEvent,
}

impl Scenario {
    /// Calls ordered by tick, keeping file order within a tick.
    pub fn ordered_calls(&self) -> Vec<ScheduledCall> {
        let mut calls = self.calls.clone();
        calls.sort_by_key(|call| call.tick);
        calls
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for call in self.calls.iter() {
            match call.kind {
                CallKind::Hall if call.direction.is_none() => {
                    return Err(ConfigError::Invalid(format!(
                        "hall call at tick {} has no direction",
                        call.tick
                    )));
                }
                CallKind::Car if call.car.is_none() => {
                    return Err(ConfigError::Invalid(format!(
                        "car call at tick {} has no car",
                        call.tick
                    )));
                }
                _ => (),
            }
        }
        Ok(())
    }
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<Scenario, ConfigError> {
    let scenario_str = fs::read_to_string(path)?;
    parse_scenario(&scenario_str)
}

pub fn parse_scenario(scenario_str: &str) -> Result<Scenario, ConfigError> {
    let scenario: Scenario = toml::from_str(scenario_str)?;
    scenario.validate()?;
    Ok(scenario)
}

/// Plays `scenario` against `fleet` tick by tick.
///
/// Stops at `max_ticks`, or earlier once every call is submitted and the
/// fleet is idle. Rejected calls are logged and skipped.
pub fn run_scenario(fleet: &mut Fleet, scenario: &Scenario, max_ticks: u64) -> Vec<TimedArrival> {
    let calls = scenario.ordered_calls();
    let mut next_call = 0;
    let mut arrivals = Vec::new();

    while fleet.tick() < max_ticks {
        while next_call < calls.len() && calls[next_call].tick <= fleet.tick() {
            submit(fleet, &calls[next_call]);
            next_call += 1;
        }

        if next_call == calls.len() && fleet.is_idle() {
            break;
        }

        for event in fleet.advance() {
            arrivals.push(TimedArrival {
                tick: fleet.tick(),
                event,
            });
        }
    }

    info!(
        "Scenario finished at tick {} with {} arrivals",
        fleet.tick(),
        arrivals.len()
    );
    arrivals
}

/// Plays `scenario` against a running coordinator using wall-clock time.
///
/// Each call is submitted once `tick * tick_period` has elapsed. Arrivals are
/// collected until the fleet is idle after the last call, or `max_ticks`
/// periods have passed. Calls scheduled at or past the tick limit, or too far
/// out to be timed, are not submitted.
pub fn run_realtime(
    handle: &CoordinatorHandle,
    arrival_rx: &cbc::Receiver<ArrivalEvent>,
    scenario: &Scenario,
    tick_period: Duration,
    max_ticks: u64,
) -> Vec<ArrivalEvent> {
    let start = Instant::now();
    let deadline = tick_instant(start, tick_period, max_ticks);
    let mut arrivals = Vec::new();

    for call in scenario.ordered_calls() {
        let due = match tick_instant(start, tick_period, call.tick) {
            Some(due) if deadline.map_or(true, |deadline| due < deadline) => due,
            _ => {
                warn!("Call at tick {} is past the tick limit, stopping", call.tick);
                break;
            }
        };
        collect_until(arrival_rx, due, &mut arrivals);

        let result = match (call.kind, call.direction, call.car) {
            (CallKind::Hall, Some(direction), _) => {
                handle.submit_hall_call(call.floor, direction).map(|_| ())
            }
            (CallKind::Car, _, Some(car)) => handle.submit_car_call(car, call.floor).map(|_| ()),
            _ => Ok(()),
        };
        if let Err(e) = result {
            warn!("Skipped call at tick {}: {}", call.tick, e);
        }
    }

    while deadline.map_or(true, |deadline| Instant::now() < deadline) {
        collect_until(arrival_rx, Instant::now() + tick_period, &mut arrivals);
        match handle.snapshot() {
            Ok(snapshot) if snapshot.is_idle() => break,
            Ok(_) => (),
            Err(_) => break,
        }
    }

    arrivals
}

// Wall-clock instant of `ticks` periods after `start`, if it can be represented
fn tick_instant(start: Instant, tick_period: Duration, ticks: u64) -> Option<Instant> {
    let ticks = u32::try_from(ticks).ok()?;
    start.checked_add(tick_period.checked_mul(ticks)?)
}

fn collect_until(
    arrival_rx: &cbc::Receiver<ArrivalEvent>,
    until: Instant,
    arrivals: &mut Vec<ArrivalEvent>,
) {
    while let Ok(event) = arrival_rx.recv_deadline(until) {
        arrivals.push(event);
    }
}

fn submit(fleet: &mut Fleet, call: &ScheduledCall) {
    let result = match (call.kind, call.direction, call.car) {
        (CallKind::Hall, Some(direction), _) => {
            fleet.submit_hall_call(call.floor, direction).map(|_| ())
        }
        (CallKind::Car, _, Some(car)) => fleet.submit_car_call(car, call.floor).map(|_| ()),
        _ => Ok(()),
    };

    if let Err(e) = result {
        warn!("Skipped call at tick {}: {}", call.tick, e);
    }
}
