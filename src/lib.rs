//! # Elevator Dispatch Simulator
//!
//! A multi-elevator dispatch simulation library: independently moving
//! elevator units, a controller that assigns hall calls or defers them, a
//! directional selection policy and a passenger exchange protocol that stays
//! consistent while several units move at once.
//!
//! ## Features
//!
//! - **LOOK-style units**: each unit serves every stop ahead before reversing
//! - **Directional admission**: a moving unit only accepts stops ahead of it
//! - **Pending calls**: unmatched hall calls are picked up by idle units in
//!   FIFO order or absorbed by units already passing by
//! - **Swappable policies**: selector, pending processor and elevator kind
//!   are chosen by name in the configuration
//! - **Deterministic runs**: seeded passenger production and tokio time
//!
//! ## Quick Start
//!
//! ```no_run
//! use elevsim::{Building, SimConfig};
//!
//! # async fn demo() -> Result<(), elevsim::SimError> {
//! let mut config = SimConfig::default();
//! config.production.seed = Some(42);
//!
//! let report = Building::run(config).await?;
//! println!("served {} of {} passengers", report.served(), report.total_passengers);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`elevator`] - Unit state, request admission and the control task
//! - [`dispatch`] - Controller, elevator selector and pending processor
//! - [`exchange`] - Passenger exchange between a unit and a floor
//! - [`building`] - Simulation context shared by every task
//! - [`producer`] - Timed random passenger production
//! - [`stats`] - Wait and ride time reports

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod building;
pub mod call;
pub mod config;
pub mod dispatch;
pub mod elevator;
pub mod error;
pub mod exchange;
pub mod floor;
pub mod passenger;
pub mod producer;
pub mod stats;

// Re-export main public types for convenience
pub use building::Building;
pub use call::{CallDirection, Direction, FloorNumber, HallCall};
pub use config::{SimConfig, UnitSettings};
pub use dispatch::{Controller, Routing};
pub use elevator::{Admission, ElevatorUnit, UnitId};
pub use error::{ConfigError, HandshakeError, RequestError, SimError, SimResult};
pub use stats::SimulationReport;
