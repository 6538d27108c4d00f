//! Host-side simulator for the flight task scheduler.
//!
//! Builds the flight controller's task table with synthetic task bodies,
//! drives it from a manual clock at the gyro loop rate and reports what the
//! scheduler did, in the layout of the firmware's `tasks` command.

pub mod capture;
pub mod cli;
pub mod logger;
pub mod report;
pub mod sim;

pub use capture::{CapturedRecord, TraceCapture};
pub use report::Report;
pub use sim::{SimConfig, Simulation};
