//! Common WDM types for ROADM line-card control.
//!
//! This crate provides type-safe representations of the primitives shared
//! by the ROADM driver and its tooling:
//!
//! - [`Channel`] and the [`grid`] functions: the fixed 50 GHz ITU grid
//!   (95 channels anchored at 191350 GHz)
//! - [`WssModule`]: the MUX (1) and DEMUX (2) wavelength-selective switches
//! - [`PortRole`]: line, add and drop port classification
//! - [`AmplifierRole`]: booster and preamp EDFAs
//! - [`ServiceState`]: connection/amplifier maintenance state

pub mod grid;
mod module;
mod port;

pub use grid::{
    center_frequencies, channel_for_frequency, channel_range, Channel, FrequencyWindow,
    CHANNEL_QUANTITY, CHANNEL_SPACING_GHZ, CHANNEL_WIDTH_GHZ, GRID_ANCHOR_GHZ,
};
pub use module::WssModule;
pub use port::{
    AmplifierRole, PortRole, ServiceState, DEMUX_INPUT_PORT, DEMUX_MONITOR_PORT,
    DEMUX_OUTPUT_PORTS, LINE_PORT, MUX_INPUT_PORTS, MUX_MONITOR_PORT, MUX_OUTPUT_PORT,
};

/// Common error type for parsing and validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("channel {0} outside the grid (must be 1-95)")]
    ChannelOutOfRange(u32),

    #[error("invalid WSS module: {0} (must be 1 (MUX) or 2 (DEMUX))")]
    InvalidModule(String),

    #[error("invalid {direction} port {port} for {module}: expected {expected}")]
    InvalidPort {
        module: WssModule,
        direction: &'static str,
        port: u16,
        expected: &'static str,
    },

    #[error("invalid service state: {0}")]
    InvalidServiceState(String),

    #[error("invalid amplifier role: {0}")]
    InvalidAmplifier(String),
}
