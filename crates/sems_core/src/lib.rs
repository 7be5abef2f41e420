//! Station state model for the SEMS live endpoint.
//!
//! Holds the per-station record, the registry that owns it, the command
//! processor that mutates it and the simulator that derives telemetry from
//! it. Everything here is synchronous and in-memory.

mod command;
mod models;
mod registry;
mod telemetry;

pub use crate::models::*;
pub use crate::registry::{StationHandle, StationRegistry};
pub use crate::telemetry::DEFAULT_CHARGE_RATE_KW;
