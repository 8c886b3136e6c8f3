//! NETCONF session contract used by the device drivers.
//!
//! The session itself (SSH, hello exchange, framing) lives outside this
//! workspace. Drivers only need to send a command document and get back a
//! reply they can test for `<ok/>` and parse into an [`XmlElement`] tree.
//!
//! Every call is a blocking request/response round trip; the transport's own
//! timeout bounds it.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{WdmError, WdmResult};
use crate::xml::XmlElement;

/// Matches `<ok/>`, `<ok />` and prefixed forms such as `<nc:ok/>`.
static OK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(?:[A-Za-z_][\w.-]*:)?ok\s*/>").expect("Invalid regex pattern"));

/// NETCONF configuration datastore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Datastore {
    #[default]
    Running,
    Candidate,
    Startup,
}

impl Datastore {
    pub fn as_str(&self) -> &'static str {
        match self {
            Datastore::Running => "running",
            Datastore::Candidate => "candidate",
            Datastore::Startup => "startup",
        }
    }
}

impl fmt::Display for Datastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw reply to a NETCONF request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcReply {
    raw: String,
}

impl RpcReply {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// A bare `<ok/>` acknowledgement.
    pub fn ok() -> Self {
        Self::new(r#"<rpc-reply xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><ok/></rpc-reply>"#)
    }

    /// The reply exactly as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns true if the device acknowledged the request with `<ok/>`.
    pub fn is_ok(&self) -> bool {
        OK_RE.is_match(&self.raw)
    }

    /// Parses the whole reply.
    pub fn document(&self) -> WdmResult<XmlElement> {
        XmlElement::parse(&self.raw)
    }

    /// Returns the `<data>` element of a `get`/`get-config` reply.
    ///
    /// Accepts either a full `<rpc-reply>` or a bare `<data>` document.
    pub fn data(&self) -> WdmResult<XmlElement> {
        let document = self.document()?;
        if document.name() == "data" {
            return Ok(document);
        }
        document.child("data").cloned().ok_or_else(|| {
            WdmError::rpc(
                "read reply",
                format!("reply <{}> carries no <data> element", document.name()),
                self.raw.clone(),
            )
        })
    }
}

impl fmt::Display for RpcReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// A NETCONF session to one device.
///
/// Implementations return `Err` only when the exchange itself failed
/// (connection lost, timeout, unparsable framing). A device-side rejection is
/// an `Ok` reply without `<ok/>`; callers decide what that means.
pub trait NetconfTransport {
    /// `<get>` with a subtree filter.
    fn get(&mut self, filter: &str) -> WdmResult<RpcReply>;

    /// `<get-config>` from `source` with a subtree filter.
    fn get_config(&mut self, source: Datastore, filter: &str) -> WdmResult<RpcReply>;

    /// `<edit-config>` of `target` with a `<config>` document.
    fn edit_config(&mut self, target: Datastore, config: &str) -> WdmResult<RpcReply>;

    /// Sends a vendor RPC element as-is.
    fn dispatch(&mut self, rpc: &str) -> WdmResult<RpcReply>;
}

impl<T: NetconfTransport + ?Sized> NetconfTransport for Box<T> {
    fn get(&mut self, filter: &str) -> WdmResult<RpcReply> {
        (**self).get(filter)
    }

    fn get_config(&mut self, source: Datastore, filter: &str) -> WdmResult<RpcReply> {
        (**self).get_config(source, filter)
    }

    fn edit_config(&mut self, target: Datastore, config: &str) -> WdmResult<RpcReply> {
        (**self).edit_config(target, config)
    }

    fn dispatch(&mut self, rpc: &str) -> WdmResult<RpcReply> {
        (**self).dispatch(rpc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ok_variants() {
        assert!(RpcReply::ok().is_ok());
        assert!(RpcReply::new("<rpc-reply><ok /></rpc-reply>").is_ok());
        assert!(RpcReply::new("<nc:rpc-reply><nc:ok/></nc:rpc-reply>").is_ok());
        assert!(!RpcReply::new("<rpc-reply><rpc-error/></rpc-reply>").is_ok());
        assert!(!RpcReply::new("<rpc-reply><token/></rpc-reply>").is_ok());
    }

    #[test]
    fn test_data_from_rpc_reply() {
        let reply = RpcReply::new("<rpc-reply><data><connections/></data></rpc-reply>");
        let data = reply.data().unwrap();
        assert_eq!(data.name(), "data");
        assert!(data.child("connections").is_some());
    }

    #[test]
    fn test_data_bare() {
        let reply = RpcReply::new("<data><edfas/></data>");
        assert_eq!(reply.data().unwrap().name(), "data");
    }

    #[test]
    fn test_data_missing() {
        let reply = RpcReply::new("<rpc-reply><ok/></rpc-reply>");
        let err = reply.data().unwrap_err();
        assert_eq!(err.raw_payload(), Some("<rpc-reply><ok/></rpc-reply>"));
    }

    #[test]
    fn test_datastore_names() {
        assert_eq!(Datastore::Running.as_str(), "running");
        assert_eq!(Datastore::default(), Datastore::Running);
        assert_eq!(Datastore::Candidate.to_string(), "candidate");
    }
}
