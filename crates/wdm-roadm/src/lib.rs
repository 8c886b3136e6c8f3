//! ROADM WSS line-card driver.
//!
//! This crate models a WSS line card as a set of cross-connects on the
//! fixed 50 GHz grid and keeps the device in step with generated plans.
//!
//! # Responsibilities
//!
//! - Generate connection plans: uniform 95-channel grids, wide channels and
//!   flexible per-span port assignments ([`PlanGenerator`])
//! - Replace a module's connections with a plan, or patch attenuation,
//!   blocking and ports of single connections ([`ConnectionReconciler`])
//! - Mirror connections, OCM readings, port powers and amplifiers
//!   ([`WssState`])
//! - Configure the booster and preamp ([`EdfaController`])
//!
//! # Tables
//!
//! | Table | Read | Written |
//! |-------|------|---------|
//! | connections | `get` | `edit-config`, `remove-all-connections`, `delete-connection`, `add-connection` |
//! | monitored-channels | `get` | |
//! | physical-ports | `get` | |
//! | edfas | `get`, `get-config` | `edit-config`, `disable-als` |
//!
//! # Example
//!
//! ```ignore
//! use wdm_common::{PortOwnershipRegistry, TestbedConfig};
//! use wdm_roadm::{GridOptions, GridTarget, Roadm};
//!
//! let config = TestbedConfig::load("testbed.yaml")?;
//! let guard = PortOwnershipRegistry::from_config(&config);
//! let mut roadm = Roadm::open("roadm_1", &config, &guard, session)?;
//!
//! let options = GridOptions::default().with_open_channels([1, 4, 8]);
//! roadm.make_grid(GridTarget::Both, 4101, 5201, &options)?;
//! ```

pub mod commands;
mod connection;
mod device;
mod edfa;
mod plan;
mod reconciler;
pub mod state;
pub mod tables;

pub use connection::ConnectionSpec;
pub use device::Roadm;
pub use edfa::{ControlMode, EdfaController, EdfaSettings, GainSwitchMode};
pub use plan::{
    ChannelSpan, FlexGridPlan, GridEntry, GridOptions, GridTarget, PlanGenerator,
    DEFAULT_PORT_OFFSET, DEFAULT_WSS_LOSS,
};
pub use reconciler::{stages, ConnectionReconciler};
pub use state::{
    ConnectionStatus, EdfaInfo, EdfaPair, ModuleMap, MonitoredChannel, PortReading, WssState,
};
