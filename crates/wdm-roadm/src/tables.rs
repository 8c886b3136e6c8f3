//! Namespace, table and field names of the line card's YANG models.

/// NETCONF base namespace, used on the `<xc:config>` wrapper.
pub const NETCONF_BASE_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// Cross-connect model.
pub const CONNECTION_NS: &str = "http://www.lumentum.com/lumentum-ote-connection";

/// OCM monitor-point model.
pub const MONITORED_CHANNEL_NS: &str = "http://www.lumentum.com/lumentum-ote-monitored-channel";

/// Physical port model.
pub const PORT_NS: &str = "http://www.lumentum.com/lumentum-ote-port";

/// Amplifier model.
pub const EDFA_NS: &str = "http://www.lumentum.com/lumentum-ote-edfa";

/// Container and row element names.
pub mod tables {
    pub const CONNECTIONS: &str = "connections";
    pub const CONNECTION: &str = "connection";
    pub const MONITORED_CHANNELS: &str = "monitored-channels";
    pub const MONITORED_CHANNEL: &str = "monitored-channel";
    pub const PHYSICAL_PORTS: &str = "physical-ports";
    pub const PHYSICAL_PORT: &str = "physical-port";
    pub const EDFAS: &str = "edfas";
    pub const EDFA: &str = "edfa";
}

/// Vendor RPC element names.
pub mod rpcs {
    pub const ADD_CONNECTION: &str = "add-connection";
    pub const DELETE_CONNECTION: &str = "delete-connection";
    pub const REMOVE_ALL_CONNECTIONS: &str = "remove-all-connections";
    pub const DISABLE_ALS: &str = "disable-als";
}

/// Leaf names, without namespace prefixes.
pub mod fields {
    pub const DN: &str = "dn";
    pub const CONFIG: &str = "config";
    pub const STATE: &str = "state";

    // Connections
    pub const MAINTENANCE_STATE: &str = "maintenance-state";
    pub const BLOCKED: &str = "blocked";
    pub const START_FREQ: &str = "start-freq";
    pub const END_FREQ: &str = "end-freq";
    pub const ATTENUATION: &str = "attenuation";
    pub const INPUT_PORT_REFERENCE: &str = "input-port-reference";
    pub const OUTPUT_PORT_REFERENCE: &str = "output-port-reference";
    pub const CUSTOM_NAME: &str = "custom-name";
    pub const ENTITY_DESCRIPTION: &str = "entity-description";
    pub const INPUT_CHANNEL_ATTRIBUTES: &str = "input-channel-attributes";
    pub const OUTPUT_CHANNEL_ATTRIBUTES: &str = "output-channel-attributes";
    pub const POWER: &str = "power";
    pub const VALID_DATA: &str = "valid-data";

    // Monitored channels
    pub const MEASURED_FREQUENCY: &str = "measured-frequency";

    // Physical ports
    pub const OPERATIONAL_STATE: &str = "operational-state";
    pub const INPUT_POWER: &str = "input-power";
    pub const OUTPUT_POWER: &str = "output-power";
    pub const OUTVOA_ACTUAL_ATTENUATION: &str = "outvoa-actual-attenuation";

    // Amplifiers
    pub const CONTROL_MODE: &str = "control-mode";
    pub const GAIN_SWITCH_MODE: &str = "gain-switch-mode";
    pub const TARGET_POWER: &str = "target-power";
    pub const TARGET_GAIN: &str = "target-gain";
    pub const TARGET_GAIN_TILT: &str = "target-gain-tilt";
    pub const LOS_SHUTDOWN: &str = "los-shutdown";
    pub const OPTICAL_LOO_THRESHOLD: &str = "optical-loo-threshold";
    pub const VOAS: &str = "voas";
    pub const VOA: &str = "voa";
    pub const VOA_INPUT_POWER: &str = "voa-input-power";
    pub const VOA_OUTPUT_POWER: &str = "voa-output-power";
    /// Spelled this way by the device.
    pub const VOA_ATTENUATION: &str = "voa-attentuation";
    pub const TIMEOUT_PERIOD: &str = "timeout-period";
}
