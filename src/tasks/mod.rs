//! Background Tasks Module
//!
//! Contains the tasks every cache instance runs for its lifetime.
//!
//! # Tasks
//! - Sweeper: Runs a sweep for every delivered timestamp
//! - Ticker / Forwarder: Feeds timestamps into the delivery channel
//! - Instrumentation: Optional periodic occupancy sampling

mod instrumentation;
mod sweeper;
mod ticker;

pub use instrumentation::{pending_signals, sample, spawn_instrumentation};
pub use sweeper::spawn_sweeper;
pub use ticker::{spawn_forwarder, spawn_ticker};
