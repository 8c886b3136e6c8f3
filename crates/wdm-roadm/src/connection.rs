//! WSS cross-connect value type.

use serde::Serialize;

use wdm_common::{WdmError, WdmResult};
use wdm_types::{ParseError, ServiceState, WssModule};

/// One cross-connect on a WSS module.
///
/// Built by the plan generator, submitted by the reconciler and replaced
/// wholesale on the next plan. A `ConnectionSpec` can only be obtained
/// through [`ConnectionSpec::new`], so every instance satisfies:
///
/// - MUX connections leave on port 4201 and enter on 4101-4120
/// - DEMUX connections enter on port 5101 and leave on 5201-5220
/// - `start_freq < end_freq`, both finite
/// - `attenuation >= 0`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionSpec {
    module: WssModule,
    connection_id: String,
    service_state: ServiceState,
    blocked: bool,
    input_port: u16,
    output_port: u16,
    start_freq: f64,
    end_freq: f64,
    attenuation: f64,
    label: String,
}

impl ConnectionSpec {
    /// Creates an in-service, unblocked connection labelled `CH<id>`.
    ///
    /// # Errors
    ///
    /// Returns [`WdmError::Validation`] if the id is malformed, the ports do
    /// not belong to `module`, the window is empty or the attenuation is
    /// negative.
    pub fn new(
        module: WssModule,
        connection_id: impl Into<String>,
        input_port: u16,
        output_port: u16,
        (start_freq, end_freq): (f64, f64),
        attenuation: f64,
    ) -> WdmResult<Self> {
        let connection_id = connection_id.into();
        validate_connection_id(&connection_id)?;
        module
            .validate_ports(input_port, output_port)
            .map_err(port_error)?;

        if !start_freq.is_finite() || !end_freq.is_finite() || start_freq >= end_freq {
            return Err(WdmError::validation(
                "frequency",
                format!(
                    "connection {} window {}-{} GHz is empty",
                    connection_id, start_freq, end_freq
                ),
            ));
        }
        validate_attenuation(&connection_id, attenuation)?;

        Ok(Self {
            module,
            label: format!("CH{}", connection_id),
            connection_id,
            service_state: ServiceState::InService,
            blocked: false,
            input_port,
            output_port,
            start_freq,
            end_freq,
            attenuation,
        })
    }

    pub fn with_blocked(mut self, blocked: bool) -> Self {
        self.blocked = blocked;
        self
    }

    pub fn with_service_state(mut self, state: ServiceState) -> Self {
        self.service_state = state;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn module(&self) -> WssModule {
        self.module
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn service_state(&self) -> ServiceState {
        self.service_state
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn input_port(&self) -> u16 {
        self.input_port
    }

    pub fn output_port(&self) -> u16 {
        self.output_port
    }

    pub fn start_freq(&self) -> f64 {
        self.start_freq
    }

    pub fn end_freq(&self) -> f64 {
        self.end_freq
    }

    pub fn attenuation(&self) -> f64 {
        self.attenuation
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Attenuation as sent to the device, two decimals (`"4.00"`).
    pub fn attenuation_text(&self) -> String {
        format!("{:.2}", self.attenuation)
    }

    /// Frequencies as sent to the device, two decimals.
    pub fn start_freq_text(&self) -> String {
        format!("{:.2}", self.start_freq)
    }

    pub fn end_freq_text(&self) -> String {
        format!("{:.2}", self.end_freq)
    }

    /// The `(input_port, output_port, blocked, attenuation)` tuple a device
    /// read-back is compared against.
    pub fn signature(&self) -> (u16, u16, bool, String) {
        (
            self.input_port,
            self.output_port,
            self.blocked,
            self.attenuation_text(),
        )
    }
}

/// Connection ids end up inside distinguished names, so `;`, `=` and markup
/// characters are rejected.
pub(crate) fn validate_connection_id(id: &str) -> WdmResult<()> {
    if id.is_empty() {
        return Err(WdmError::validation(
            "connection_id",
            "connection id must not be empty",
        ));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(WdmError::validation(
            "connection_id",
            format!("'{}' contains characters not allowed in a DN", id),
        ));
    }
    Ok(())
}

pub(crate) fn validate_attenuation(connection_id: &str, attenuation: f64) -> WdmResult<()> {
    if !attenuation.is_finite() || attenuation < 0.0 {
        return Err(WdmError::validation(
            "attenuation",
            format!(
                "connection {} attenuation {} dB must be >= 0",
                connection_id, attenuation
            ),
        ));
    }
    Ok(())
}

/// Port mismatches are plan mistakes, not device-domain errors.
pub(crate) fn port_error(err: ParseError) -> WdmError {
    WdmError::validation("port", err.to_string())
}

/// Resolves a raw module number at an API boundary.
pub(crate) fn resolve_module(id: u8) -> WdmResult<WssModule> {
    WssModule::from_id(id).map_err(|e| WdmError::validation("module", e.to_string()))
}
