//! Common infrastructure for WDM device drivers.
//!
//! This crate provides the pieces every driver in the testbed shares:
//!
//! - [`error`]: the error taxonomy ([`WdmError`])
//! - [`transport`]: the NETCONF session contract ([`NetconfTransport`],
//!   [`RpcReply`])
//! - [`xml`]: reply documents as a nested key-value tree ([`XmlElement`])
//! - [`dn`]: distinguished-name builders and parsers
//! - [`access`]: port-ownership access control ([`AccessGuard`])
//! - [`config`]: the testbed configuration snapshot ([`TestbedConfig`])
//! - [`retry`]: the bounded retry used by telemetry reads
//!
//! # Example
//!
//! ```ignore
//! use wdm_common::{dn, Datastore, NetconfTransport, WdmError, WdmResult};
//!
//! fn remove_all(session: &mut impl NetconfTransport) -> WdmResult<()> {
//!     let rpc = format!(
//!         "<remove-all-connections><dn>{}</dn></remove-all-connections>",
//!         dn::module_dn(wdm_types::WssModule::Mux)
//!     );
//!     let reply = session.dispatch(&rpc)?;
//!     if !reply.is_ok() {
//!         return Err(WdmError::reconcile("mux", "remove-all", 0, reply.raw()));
//!     }
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod config;
pub mod dn;
pub mod error;
pub mod retry;
pub mod transport;
pub mod xml;

// Re-export commonly used items at crate root
pub use access::{AccessDecision, AccessGuard, PortOwnershipRegistry};
pub use config::{defaults, DeviceEndpoint, TestbedConfig};
pub use error::{WdmError, WdmResult};
pub use retry::{retry_bounded, RetryPolicy};
pub use transport::{Datastore, NetconfTransport, RpcReply};
pub use xml::XmlElement;
