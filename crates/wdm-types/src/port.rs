//! Physical port plan, amplifier roles and maintenance states.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Optical line port (both directions, with output VOA).
pub const LINE_PORT: u16 = 3001;

/// MUX add ports.
pub const MUX_INPUT_PORTS: RangeInclusive<u16> = 4101..=4120;

/// MUX common output toward the booster.
pub const MUX_OUTPUT_PORT: u16 = 4201;

/// DEMUX common input from the preamp.
pub const DEMUX_INPUT_PORT: u16 = 5101;

/// DEMUX drop ports.
pub const DEMUX_OUTPUT_PORTS: RangeInclusive<u16> = 5201..=5220;

/// OCM tap reporting MUX-side monitored channels.
pub const MUX_MONITOR_PORT: u16 = 6201;

/// OCM tap reporting DEMUX-side monitored channels.
pub const DEMUX_MONITOR_PORT: u16 = 3101;

/// Role of a physical port in the telemetry table.
///
/// Only these three roles are tracked; every other port reported by the
/// device is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortRole {
    /// Line port 3001: input power, output power and VOA attenuation.
    Line,
    /// MUX add port: input power only.
    MuxInput,
    /// DEMUX drop port: output power only.
    DemuxOutput,
}

impl PortRole {
    /// Classifies a physical port number.
    pub fn classify(port: u16) -> Option<Self> {
        if port == LINE_PORT {
            Some(PortRole::Line)
        } else if MUX_INPUT_PORTS.contains(&port) {
            Some(PortRole::MuxInput)
        } else if DEMUX_OUTPUT_PORTS.contains(&port) {
            Some(PortRole::DemuxOutput)
        } else {
            None
        }
    }

    pub const fn has_input_power(&self) -> bool {
        matches!(self, PortRole::Line | PortRole::MuxInput)
    }

    pub const fn has_output_power(&self) -> bool {
        matches!(self, PortRole::Line | PortRole::DemuxOutput)
    }

    pub const fn has_voa(&self) -> bool {
        matches!(self, PortRole::Line)
    }
}

/// EDFA position on the line card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmplifierRole {
    /// EDFA 1, amplifying the MUX output toward the line.
    Booster,
    /// EDFA 2, amplifying the line toward the DEMUX.
    Preamp,
}

impl AmplifierRole {
    pub const ALL: [AmplifierRole; 2] = [AmplifierRole::Booster, AmplifierRole::Preamp];

    /// Device EDFA number used in distinguished names (`edfa=<n>`).
    pub const fn edfa_id(&self) -> u8 {
        match self {
            AmplifierRole::Booster => 1,
            AmplifierRole::Preamp => 2,
        }
    }

    pub fn from_edfa_id(id: u8) -> Result<Self, ParseError> {
        match id {
            1 => Ok(AmplifierRole::Booster),
            2 => Ok(AmplifierRole::Preamp),
            other => Err(ParseError::InvalidAmplifier(format!("edfa={}", other))),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            AmplifierRole::Booster => "booster",
            AmplifierRole::Preamp => "preamp",
        }
    }
}

impl fmt::Display for AmplifierRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AmplifierRole {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "booster" => Ok(AmplifierRole::Booster),
            "preamp" => Ok(AmplifierRole::Preamp),
            _ => Err(ParseError::InvalidAmplifier(s.to_string())),
        }
    }
}

/// Maintenance state of a connection or amplifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceState {
    #[default]
    InService,
    OutOfService,
}

impl ServiceState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ServiceState::InService => "in-service",
            ServiceState::OutOfService => "out-of-service",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ServiceState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in-service" => Ok(ServiceState::InService),
            "out-of-service" => Ok(ServiceState::OutOfService),
            _ => Err(ParseError::InvalidServiceState(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_port_roles() {
        assert_eq!(PortRole::classify(3001), Some(PortRole::Line));
        assert_eq!(PortRole::classify(4101), Some(PortRole::MuxInput));
        assert_eq!(PortRole::classify(4120), Some(PortRole::MuxInput));
        assert_eq!(PortRole::classify(5201), Some(PortRole::DemuxOutput));
        assert_eq!(PortRole::classify(4201), None);
        assert_eq!(PortRole::classify(5101), None);
        assert_eq!(PortRole::classify(3101), None);
    }

    #[test]
    fn test_port_role_attributes() {
        assert!(PortRole::Line.has_input_power() && PortRole::Line.has_output_power());
        assert!(PortRole::Line.has_voa());
        assert!(PortRole::MuxInput.has_input_power());
        assert!(!PortRole::MuxInput.has_output_power());
        assert!(!PortRole::DemuxOutput.has_input_power());
        assert!(PortRole::DemuxOutput.has_output_power());
    }

    #[test]
    fn test_amplifier_roles() {
        assert_eq!(AmplifierRole::from_edfa_id(1), Ok(AmplifierRole::Booster));
        assert_eq!(AmplifierRole::from_edfa_id(2), Ok(AmplifierRole::Preamp));
        assert!(AmplifierRole::from_edfa_id(3).is_err());
        assert_eq!("preamp".parse::<AmplifierRole>(), Ok(AmplifierRole::Preamp));
    }

    #[test]
    fn test_service_state() {
        assert_eq!(ServiceState::default().as_str(), "in-service");
        assert_eq!(
            "out-of-service".parse::<ServiceState>(),
            Ok(ServiceState::OutOfService)
        );
        assert!("maintenance".parse::<ServiceState>().is_err());
    }
}
