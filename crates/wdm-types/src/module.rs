//! WSS module identity and port rules.

use crate::port::{
    DEMUX_INPUT_PORT, DEMUX_MONITOR_PORT, DEMUX_OUTPUT_PORTS, MUX_INPUT_PORTS, MUX_MONITOR_PORT,
    MUX_OUTPUT_PORT,
};
use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two wavelength-selective switches on a ROADM line card.
///
/// The MUX (module 1) combines add ports 4101-4120 onto output 4201; the
/// DEMUX (module 2) splits input 5101 onto drop ports 5201-5220.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WssModule {
    /// Module 1.
    Mux,
    /// Module 2.
    Demux,
}

impl WssModule {
    /// Both modules in device order.
    pub const ALL: [WssModule; 2] = [WssModule::Mux, WssModule::Demux];

    /// Device module number used in distinguished names.
    pub const fn id(&self) -> u8 {
        match self {
            WssModule::Mux => 1,
            WssModule::Demux => 2,
        }
    }

    /// Resolves a device module number.
    pub fn from_id(id: u8) -> Result<Self, ParseError> {
        match id {
            1 => Ok(WssModule::Mux),
            2 => Ok(WssModule::Demux),
            other => Err(ParseError::InvalidModule(other.to_string())),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            WssModule::Mux => "mux",
            WssModule::Demux => "demux",
        }
    }

    /// The port shared by every connection on this module (MUX output,
    /// DEMUX input).
    pub const fn common_port(&self) -> u16 {
        match self {
            WssModule::Mux => MUX_OUTPUT_PORT,
            WssModule::Demux => DEMUX_INPUT_PORT,
        }
    }

    /// Translates a 1-based add/drop port offset into a physical port
    /// number (4100 + offset for MUX inputs, 5200 + offset for DEMUX
    /// outputs). The result is not range checked.
    pub const fn port_for_offset(&self, offset: u16) -> u16 {
        match self {
            WssModule::Mux => 4100u16.saturating_add(offset),
            WssModule::Demux => 5200u16.saturating_add(offset),
        }
    }

    /// OCM tap port whose monitored channels belong to this module.
    pub const fn monitor_port(&self) -> u16 {
        match self {
            WssModule::Mux => MUX_MONITOR_PORT,
            WssModule::Demux => DEMUX_MONITOR_PORT,
        }
    }

    /// Checks a cross-connect's ports against this module's port plan.
    pub fn validate_ports(&self, input_port: u16, output_port: u16) -> Result<(), ParseError> {
        match self {
            WssModule::Mux => {
                if !MUX_INPUT_PORTS.contains(&input_port) {
                    return Err(ParseError::InvalidPort {
                        module: *self,
                        direction: "input",
                        port: input_port,
                        expected: "4101-4120",
                    });
                }
                if output_port != MUX_OUTPUT_PORT {
                    return Err(ParseError::InvalidPort {
                        module: *self,
                        direction: "output",
                        port: output_port,
                        expected: "4201",
                    });
                }
            }
            WssModule::Demux => {
                if input_port != DEMUX_INPUT_PORT {
                    return Err(ParseError::InvalidPort {
                        module: *self,
                        direction: "input",
                        port: input_port,
                        expected: "5101",
                    });
                }
                if !DEMUX_OUTPUT_PORTS.contains(&output_port) {
                    return Err(ParseError::InvalidPort {
                        module: *self,
                        direction: "output",
                        port: output_port,
                        expected: "5201-5220",
                    });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for WssModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<u8> for WssModule {
    type Error = ParseError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        WssModule::from_id(id)
    }
}

impl FromStr for WssModule {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mux" | "1" => Ok(WssModule::Mux),
            "demux" | "2" => Ok(WssModule::Demux),
            _ => Err(ParseError::InvalidModule(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_module_ids() {
        assert_eq!(WssModule::Mux.id(), 1);
        assert_eq!(WssModule::Demux.id(), 2);
        assert_eq!(WssModule::from_id(1), Ok(WssModule::Mux));
        assert_eq!(WssModule::from_id(2), Ok(WssModule::Demux));
        assert!(WssModule::from_id(3).is_err());
        assert!(WssModule::from_id(0).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!("mux".parse::<WssModule>(), Ok(WssModule::Mux));
        assert_eq!("DEMUX".parse::<WssModule>(), Ok(WssModule::Demux));
        assert_eq!("2".parse::<WssModule>(), Ok(WssModule::Demux));
        assert!("both".parse::<WssModule>().is_err());
    }

    #[test]
    fn test_port_offsets() {
        assert_eq!(WssModule::Mux.port_for_offset(1), 4101);
        assert_eq!(WssModule::Demux.port_for_offset(20), 5220);
    }

    #[test]
    fn test_validate_mux_ports() {
        assert!(WssModule::Mux.validate_ports(4101, 4201).is_ok());
        assert!(WssModule::Mux.validate_ports(4120, 4201).is_ok());
        assert!(WssModule::Mux.validate_ports(4121, 4201).is_err());
        assert!(WssModule::Mux.validate_ports(4101, 5201).is_err());
    }

    #[test]
    fn test_validate_demux_ports() {
        assert!(WssModule::Demux.validate_ports(5101, 5201).is_ok());
        assert!(WssModule::Demux.validate_ports(5101, 5220).is_ok());
        assert!(WssModule::Demux.validate_ports(5102, 5201).is_err());
        assert!(WssModule::Demux.validate_ports(5101, 5221).is_err());
    }

    #[test]
    fn test_invalid_port_message() {
        let err = WssModule::Mux.validate_ports(4101, 4202).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid output port 4202 for mux: expected 4201"
        );
    }
}
