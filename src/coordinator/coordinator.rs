/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, error, info};
use std::thread::{Builder, JoinHandle};
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::error::{CoordinatorError, DispatchResult};
use crate::fleet::{Fleet, FleetSnapshot};
use crate::shared::{ArrivalEvent, CallDirection, CarId, RequestId};

/***************************************/
/*               Enums                 */
/***************************************/

/// Requests accepted by the coordinator thread. Each carries its reply channel.
pub enum Command {
    RegisterCar {
        floor: i32,
        reply: cbc::Sender<DispatchResult<CarId>>,
    },
    HallCall {
        floor: i32,
        direction: CallDirection,
        reply: cbc::Sender<DispatchResult<RequestId>>,
    },
    CarCall {
        car: CarId,
        floor: i32,
        reply: cbc::Sender<DispatchResult<RequestId>>,
    },
    Snapshot {
        reply: cbc::Sender<FleetSnapshot>,
    },
}

enum Event {
    NewCommand(Command),
    Tick,
    Terminate,
}

/***************************************/
/*             Public API              */
/***************************************/

/**
 * Drives a fleet in real time on its own thread.
 *
 * The coordinator waits on its channels instead of spinning: every tick of
 * the ticker advances the fleet once, and commands are applied between
 * ticks, never during one.
 *
 * # Fields
 * - `fleet`:           The fleet, exclusively owned by the coordinator thread.
 * - `tick_period`:     Wall-clock length of one tick.
 * - `command_rx`:      Receives commands from handles.
 * - `arrival_tx`:      Sends every arrival event produced by a tick.
 * - `terminate_rx`:    Receives the shutdown signal.
 */
pub struct Coordinator {
    fleet: Fleet,
    tick_period: Duration,
    command_rx: cbc::Receiver<Command>,
    arrival_tx: cbc::Sender<ArrivalEvent>,
    terminate_rx: cbc::Receiver<()>,
}

impl Coordinator {
    pub fn new(
        fleet: Fleet,
        tick_period: Duration,
        command_rx: cbc::Receiver<Command>,
        arrival_tx: cbc::Sender<ArrivalEvent>,
        terminate_rx: cbc::Receiver<()>,
    ) -> Coordinator {
        Coordinator {
            fleet,
            tick_period,
            command_rx,
            arrival_tx,
            terminate_rx,
        }
    }

    /// Runs until terminated or every handle is dropped, then hands the fleet back.
    pub fn run(mut self) -> Fleet {
        let ticker = cbc::tick(self.tick_period);
        info!("Coordinator started, tick every {:?}", self.tick_period);

        loop {
            match self.wait_for_event(&ticker) {
                Event::NewCommand(command) => self.handle_command(command),
                Event::Tick => self.handle_tick(),
                Event::Terminate => break,
            }
        }

        info!("Coordinator stopped at tick {}", self.fleet.tick());
        self.fleet
    }

    fn wait_for_event(&self, ticker: &cbc::Receiver<std::time::Instant>) -> Event {
        cbc::select! {
            recv(self.command_rx) -> command => {
                match command {
                    Ok(command) => Event::NewCommand(command),
                    Err(_) => {
                        debug!("All coordinator handles dropped");
                        Event::Terminate
                    }
                }
            },

            recv(ticker) -> _ => Event::Tick,

            recv(self.terminate_rx) -> _ => Event::Terminate,
        }
    }

    fn handle_command(&mut self, command: Command) {
        // A dropped reply receiver only means the caller stopped waiting
        match command {
            Command::RegisterCar { floor, reply } => {
                let _ = reply.send(self.fleet.register_car(floor));
            }
            Command::HallCall { floor, direction, reply } => {
                let _ = reply.send(self.fleet.submit_hall_call(floor, direction));
            }
            Command::CarCall { car, floor, reply } => {
                let _ = reply.send(self.fleet.submit_car_call(car, floor));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.fleet.snapshot());
            }
        }
    }

    fn handle_tick(&mut self) {
        for event in self.fleet.advance() {
            if let Err(e) = self.arrival_tx.send(event) {
                error!("Failed to forward arrival from coordinator: {:?}", e);
            }
        }
    }
}

/// Cloneable front end to a running coordinator.
#[derive(Clone)]
pub struct CoordinatorHandle {
    command_tx: cbc::Sender<Command>,
    terminate_tx: cbc::Sender<()>,
}

impl CoordinatorHandle {
    /// Starts a coordinator thread for `fleet`.
    ///
    /// Returns the handle, the receiver for arrival events and the join
    /// handle that yields the fleet after shutdown.
    pub fn spawn(
        fleet: Fleet,
        tick_period: Duration,
    ) -> std::io::Result<(CoordinatorHandle, cbc::Receiver<ArrivalEvent>, JoinHandle<Fleet>)> {
        let (command_tx, command_rx) = cbc::unbounded::<Command>();
        let (arrival_tx, arrival_rx) = cbc::unbounded::<ArrivalEvent>();
        let (terminate_tx, terminate_rx) = cbc::unbounded::<()>();

        let coordinator = Coordinator::new(fleet, tick_period, command_rx, arrival_tx, terminate_rx);
        let coordinator_thread = Builder::new()
            .name("coordinator".into())
            .spawn(move || coordinator.run())?;

        let handle = CoordinatorHandle {
            command_tx,
            terminate_tx,
        };
        Ok((handle, arrival_rx, coordinator_thread))
    }

    pub fn register_car(&self, floor: i32) -> Result<CarId, CoordinatorError> {
        let (reply, reply_rx) = cbc::bounded(1);
        self.request(Command::RegisterCar { floor, reply }, reply_rx)
    }

    pub fn submit_hall_call(
        &self,
        floor: i32,
        direction: CallDirection,
    ) -> Result<RequestId, CoordinatorError> {
        let (reply, reply_rx) = cbc::bounded(1);
        self.request(Command::HallCall { floor, direction, reply }, reply_rx)
    }

    pub fn submit_car_call(&self, car: CarId, floor: i32) -> Result<RequestId, CoordinatorError> {
        let (reply, reply_rx) = cbc::bounded(1);
        self.request(Command::CarCall { car, floor, reply }, reply_rx)
    }

    pub fn snapshot(&self) -> Result<FleetSnapshot, CoordinatorError> {
        let (reply, reply_rx) = cbc::bounded(1);
        self.command_tx
            .send(Command::Snapshot { reply })
            .map_err(|_| CoordinatorError::Disconnected)?;
        reply_rx.recv().map_err(|_| CoordinatorError::Disconnected)
    }

    /// Asks the coordinator thread to stop after the current event.
    pub fn shutdown(&self) {
        let _ = self.terminate_tx.send(());
    }

    fn request<T>(
        &self,
        command: Command,
        reply_rx: cbc::Receiver<DispatchResult<T>>,
    ) -> Result<T, CoordinatorError> {
        self.command_tx
            .send(command)
            .map_err(|_| CoordinatorError::Disconnected)?;

        let result = reply_rx.recv().map_err(|_| CoordinatorError::Disconnected)?;
        Ok(result?)
    }
}
