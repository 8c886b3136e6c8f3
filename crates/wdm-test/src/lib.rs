//! Test infrastructure for the WDM drivers
//!
//! Provides:
//! - A recording transport spy with scripted replies
//! - A simulated WSS line card that applies command documents
//! - Reply fixtures in the line card's document shape

pub mod fixtures;
mod recording;
mod simulator;

pub use fixtures::*;
pub use recording::{RecordingTransport, TransportCall};
pub use simulator::SimulatedWss;
