//! Command and filter document builders for the WSS line card.
//!
//! Every builder returns the exact XML text handed to the transport. The
//! shapes follow the device's vendor models: edits are wrapped in an
//! `<xc:config>` element, vendor RPCs are sent as bare elements.

use quick_xml::escape::escape;

use wdm_common::dn;
use wdm_types::{AmplifierRole, WssModule};

use crate::connection::ConnectionSpec;
use crate::tables::{
    fields, rpcs, tables, CONNECTION_NS, EDFA_NS, MONITORED_CHANNEL_NS, NETCONF_BASE_NS, PORT_NS,
};

/// Wraps an edit body in `<xc:config>`.
fn edit_document(body: &str) -> String {
    format!(r#"<xc:config xmlns:xc="{}">{}</xc:config>"#, NETCONF_BASE_NS, body)
}

fn connections_open() -> String {
    format!(
        r#"<{} xmlns="{}" xmlns:lotet="{}">"#,
        tables::CONNECTIONS,
        CONNECTION_NS,
        CONNECTION_NS
    )
}

fn edfas_open() -> String {
    format!(
        r#"<{} xmlns="{}" xmlns:lotee="{}">"#,
        tables::EDFAS,
        EDFA_NS,
        EDFA_NS
    )
}

fn leaf(name: &str, value: &str) -> String {
    format!("<{}>{}</{}>", name, value, name)
}

/// `<get>` filter for the cross-connect table.
pub fn connections_filter() -> String {
    format!(
        r#"<filter><{} xmlns="{}"></{}></filter>"#,
        tables::CONNECTIONS,
        CONNECTION_NS,
        tables::CONNECTIONS
    )
}

/// `<get>` filter for OCM monitor points.
pub fn monitored_channels_filter() -> String {
    format!(
        r#"<filter><{} xmlns="{}" xmlns:nc="{}"></{}></filter>"#,
        tables::MONITORED_CHANNELS,
        MONITORED_CHANNEL_NS,
        NETCONF_BASE_NS,
        tables::MONITORED_CHANNELS
    )
}

/// `<get>` filter for the physical port table.
pub fn physical_ports_filter() -> String {
    format!(
        r#"<filter><{} xmlns="{}" xmlns:lotep="{}"></{}></filter>"#,
        tables::PHYSICAL_PORTS,
        PORT_NS,
        PORT_NS,
        tables::PHYSICAL_PORTS
    )
}

/// `<get>` filter for both amplifiers.
pub fn edfas_filter() -> String {
    format!("<filter>{}</{}></filter>", edfas_open(), tables::EDFAS)
}

/// `<get-config>` subtree filter selecting one config leaf of one amplifier.
pub fn edfa_config_filter(role: AmplifierRole, field: &str) -> String {
    format!(
        "{}<{}>{}<{}><{}></{}></{}></{}></{}>",
        edfas_open(),
        tables::EDFA,
        leaf(fields::DN, &dn::edfa_dn(role)),
        fields::CONFIG,
        field,
        field,
        fields::CONFIG,
        tables::EDFA,
        tables::EDFAS
    )
}

/// One `<connection>` block of a bulk add.
pub fn connection_block(conn: &ConnectionSpec) -> String {
    let config = [
        leaf(fields::MAINTENANCE_STATE, conn.service_state().as_str()),
        leaf(fields::BLOCKED, bool_text(conn.is_blocked())),
        leaf(fields::START_FREQ, &conn.start_freq_text()),
        leaf(fields::END_FREQ, &conn.end_freq_text()),
        leaf(fields::ATTENUATION, &conn.attenuation_text()),
        leaf(
            fields::INPUT_PORT_REFERENCE,
            &dn::port_dn(conn.input_port()),
        ),
        leaf(
            fields::OUTPUT_PORT_REFERENCE,
            &dn::port_dn(conn.output_port()),
        ),
        leaf(fields::CUSTOM_NAME, &escape(conn.label())),
    ]
    .concat();

    format!(
        "<{}>{}<{}>{}</{}></{}>",
        tables::CONNECTION,
        leaf(
            fields::DN,
            &dn::connection_dn(conn.module(), conn.connection_id())
        ),
        fields::CONFIG,
        config,
        fields::CONFIG,
        tables::CONNECTION
    )
}

/// Bulk add: every connection as a repeated block inside one
/// `<connections>` element.
pub fn bulk_add_config(connections: &[ConnectionSpec]) -> String {
    let blocks: String = connections.iter().map(connection_block).collect();
    edit_document(&format!(
        "{}{}</{}>",
        connections_open(),
        blocks,
        tables::CONNECTIONS
    ))
}

/// Per-connection patch of a single config leaf, without touching any
/// other connection.
fn connection_patch_config<'a>(
    module: WssModule,
    field: &str,
    values: impl Iterator<Item = (&'a str, String)>,
) -> String {
    let blocks: String = values
        .map(|(id, value)| {
            format!(
                "<{}>{}<{}>{}</{}></{}>",
                tables::CONNECTION,
                leaf(fields::DN, &dn::connection_dn(module, id)),
                fields::CONFIG,
                leaf(field, &value),
                fields::CONFIG,
                tables::CONNECTION
            )
        })
        .collect();
    edit_document(&format!(
        "{}{}</{}>",
        connections_open(),
        blocks,
        tables::CONNECTIONS
    ))
}

/// Attenuation-only patch for a set of connections.
pub fn attenuation_patch_config(module: WssModule, values: &[(String, f64)]) -> String {
    connection_patch_config(
        module,
        fields::ATTENUATION,
        values
            .iter()
            .map(|(id, atten)| (id.as_str(), format!("{:.2}", atten))),
    )
}

/// Blocked-flag-only patch for a set of connections.
pub fn blocked_patch_config(module: WssModule, states: &[(String, bool)]) -> String {
    connection_patch_config(
        module,
        fields::BLOCKED,
        states
            .iter()
            .map(|(id, blocked)| (id.as_str(), bool_text(*blocked).to_string())),
    )
}

/// `remove-all-connections` scoped to one module.
pub fn remove_all_rpc(module: WssModule) -> String {
    format!(
        r#"<{} xmlns="{}">{}</{}>"#,
        rpcs::REMOVE_ALL_CONNECTIONS,
        CONNECTION_NS,
        leaf(fields::DN, &dn::module_dn(module)),
        rpcs::REMOVE_ALL_CONNECTIONS
    )
}

/// `delete-connection` for a single connection.
pub fn delete_connection_rpc(module: WssModule, connection_id: &str) -> String {
    format!(
        r#"<{} xmlns="{}">{}</{}>"#,
        rpcs::DELETE_CONNECTION,
        CONNECTION_NS,
        leaf(fields::DN, &dn::connection_dn(module, connection_id)),
        rpcs::DELETE_CONNECTION
    )
}

/// Rebinds the add port of a MUX connection or the drop port of a DEMUX
/// connection.
pub fn set_port_rpc(module: WssModule, connection_id: &str, port: u16) -> String {
    let reference = match module {
        WssModule::Mux => fields::INPUT_PORT_REFERENCE,
        WssModule::Demux => fields::OUTPUT_PORT_REFERENCE,
    };
    format!(
        r#"<{} xmlns="{}">{}{}</{}>"#,
        rpcs::ADD_CONNECTION,
        CONNECTION_NS,
        leaf(fields::DN, &dn::connection_dn(module, connection_id)),
        leaf(reference, &dn::port_dn(port)),
        rpcs::ADD_CONNECTION
    )
}

/// Amplifier config edit carrying the given leaves, in order.
pub fn edfa_edit_config(role: AmplifierRole, leaves: &[(&str, String)]) -> String {
    let config: String = leaves.iter().map(|(name, value)| leaf(name, value)).collect();
    edit_document(&format!(
        "{}<{}>{}<{}>{}</{}></{}></{}>",
        edfas_open(),
        tables::EDFA,
        leaf(fields::DN, &dn::edfa_dn(role)),
        fields::CONFIG,
        config,
        fields::CONFIG,
        tables::EDFA,
        tables::EDFAS
    ))
}

/// Suspends automatic laser shutdown on an amplifier for `timeout_secs`.
pub fn disable_als_rpc(role: AmplifierRole, timeout_secs: u32) -> String {
    format!(
        r#"<{} xmlns="{}">{}{}</{}>"#,
        rpcs::DISABLE_ALS,
        EDFA_NS,
        leaf(fields::DN, &dn::edfa_dn(role)),
        leaf(fields::TIMEOUT_PERIOD, &timeout_secs.to_string()),
        rpcs::DISABLE_ALS
    )
}

fn bool_text(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
