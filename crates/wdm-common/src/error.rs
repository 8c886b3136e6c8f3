//! Error types for WDM device operations.
//!
//! The taxonomy follows the life of a device operation:
//!
//! - [`WdmError::Authorization`]: the access guard refused the device at
//!   construction; no usable object exists.
//! - [`WdmError::Validation`] / [`WdmError::Domain`]: a plan or connection was
//!   malformed. Raised before any transport call.
//! - [`WdmError::Rpc`]: a read failed or returned an unparsable reply.
//! - [`WdmError::Reconcile`]: a write was not acknowledged. The module may be
//!   left with its connections deleted but not re-added; the caller re-applies.

use std::path::PathBuf;
use thiserror::Error;
use wdm_types::ParseError;

/// Result type alias for WDM operations.
pub type WdmResult<T> = Result<T, WdmError>;

/// Errors that can occur while planning, reading or reconciling a device.
#[derive(Debug, Error)]
pub enum WdmError {
    /// The port-ownership registry denied access to the device's patch.
    #[error("Not authorized to use {device}: patch {patches:?} is not allocated to this user")]
    Authorization {
        /// The device name.
        device: String,
        /// The patch endpoints that were checked.
        patches: Vec<(String, String)>,
    },

    /// Device name is not present in the testbed registry.
    #[error("Unknown device '{0}'")]
    UnknownDevice(String),

    /// Malformed plan intent or connection.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// The field or argument that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// A value outside its domain (e.g. a channel off the grid).
    #[error(transparent)]
    Domain(#[from] ParseError),

    /// A read request failed or its reply could not be parsed.
    #[error("RPC {operation} failed: {message}")]
    Rpc {
        /// The operation that failed (e.g. "get connections").
        operation: String,
        /// Error message.
        message: String,
        /// Raw reply or transport error text.
        raw: String,
    },

    /// A write request was not acknowledged with `<ok/>`.
    #[error("Reconcile of {module} failed during {stage} ({attempted} connections attempted): {reply}")]
    Reconcile {
        /// Module name ("mux"/"demux") or amplifier name.
        module: String,
        /// Stage of the transaction (e.g. "remove-all", "bulk-add").
        stage: String,
        /// Number of connections the stage tried to write.
        attempted: usize,
        /// Raw reply or transport error text.
        reply: String,
    },

    /// Configuration file could not be loaded or is invalid.
    #[error("Configuration error in {}: {message}", .path.display())]
    Config {
        /// The configuration file.
        path: PathBuf,
        /// Error message.
        message: String,
    },
}

impl WdmError {
    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an RPC read error carrying the raw payload.
    pub fn rpc(
        operation: impl Into<String>,
        message: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self::Rpc {
            operation: operation.into(),
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// Creates a reconcile error.
    pub fn reconcile(
        module: impl Into<String>,
        stage: impl Into<String>,
        attempted: usize,
        reply: impl Into<String>,
    ) -> Self {
        Self::Reconcile {
            module: module.into(),
            stage: stage.into(),
            attempted,
            reply: reply.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a transient condition
    /// that may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WdmError::Rpc { .. } | WdmError::Reconcile { .. })
    }

    /// Attaches the raw reply to an RPC error that was raised while walking
    /// an already-parsed document.
    pub fn with_raw(self, payload: &str) -> Self {
        match self {
            WdmError::Rpc {
                operation,
                message,
                raw,
            } if raw.is_empty() => WdmError::Rpc {
                operation,
                message,
                raw: payload.to_string(),
            },
            other => other,
        }
    }

    /// Raw device payload attached to transport-level failures.
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            WdmError::Rpc { raw, .. } => Some(raw),
            WdmError::Reconcile { reply, .. } => Some(reply),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = WdmError::validation("channel_span", "empty channel group");
        assert_eq!(err.to_string(), "Invalid channel_span: empty channel group");
    }

    #[test]
    fn test_domain_from_parse_error() {
        let err: WdmError = ParseError::ChannelOutOfRange(96).into();
        assert!(matches!(err, WdmError::Domain(_)));
        assert!(err.to_string().contains("96"));
    }

    #[test]
    fn test_reconcile_display() {
        let err = WdmError::reconcile("mux", "bulk-add", 95, "<rpc-error/>");
        let msg = err.to_string();
        assert!(msg.contains("mux"));
        assert!(msg.contains("bulk-add"));
        assert!(msg.contains("95 connections"));
        assert_eq!(err.raw_payload(), Some("<rpc-error/>"));
    }

    #[test]
    fn test_config_display() {
        let err = WdmError::config("/etc/testbed.yaml", "missing devices");
        assert_eq!(
            err.to_string(),
            "Configuration error in /etc/testbed.yaml: missing devices"
        );
    }

    #[test]
    fn test_with_raw() {
        let err = WdmError::rpc("read edfas", "missing element dn", "").with_raw("<data/>");
        assert_eq!(err.raw_payload(), Some("<data/>"));

        let err = WdmError::rpc("read edfas", "bad", "<first/>").with_raw("<second/>");
        assert_eq!(err.raw_payload(), Some("<first/>"));
    }

    #[test]
    fn test_is_retryable() {
        assert!(WdmError::rpc("get edfas", "timeout", "").is_retryable());
        assert!(!WdmError::validation("module", "3").is_retryable());
        assert!(!WdmError::UnknownDevice("roadm_x".into()).is_retryable());
    }
}
