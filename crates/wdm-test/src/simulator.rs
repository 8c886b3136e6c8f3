//! A WSS line card that interprets command documents.
//!
//! [`SimulatedWss`] keeps a connection table and two amplifiers, applies
//! the writes the driver sends (remove-all, delete, add-connection, bulk
//! and patch edits, amplifier edits) and answers reads with documents in
//! the card's shape. Like the card, it refuses amplifier mode or target
//! changes unless the amplifier is out of service.
//!
//! Rejections are answered with an `<rpc-error>` reply, not a transport
//! error, so the driver sees what it would see on hardware.

use std::collections::VecDeque;

use tracing::debug;

use wdm_common::{dn, Datastore, NetconfTransport, RpcReply, WdmError, WdmResult, XmlElement};
use wdm_types::{
    AmplifierRole, PortRole, WssModule, DEMUX_INPUT_PORT, DEMUX_MONITOR_PORT, DEMUX_OUTPUT_PORTS,
    LINE_PORT, MUX_INPUT_PORTS, MUX_MONITOR_PORT, MUX_OUTPUT_PORT,
};

use crate::fixtures::{
    connections_table, data_reply, edfas_table, monitored_channels_table, monitored_channel_row,
    physical_port_row, physical_ports_table, rpc_error, ConnectionRow, EdfaRow,
};
use crate::recording::TransportCall;

/// Power seen on every add port and on the line input, dBm.
const NOMINAL_INPUT_POWER: f64 = -12.0;

/// Power reported for a blocked passband, dBm.
const DARK_POWER: f64 = -60.0;

/// Simulated line card.
#[derive(Debug)]
pub struct SimulatedWss {
    connections: Vec<ConnectionRow>,
    edfas: [EdfaRow; 2],
    calls: Vec<TransportCall>,
    reject_markers: VecDeque<String>,
    failing_reads: u32,
}

impl Default for SimulatedWss {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedWss {
    pub fn new() -> Self {
        Self {
            connections: Vec::new(),
            edfas: [
                EdfaRow::new(AmplifierRole::Booster),
                EdfaRow::new(AmplifierRole::Preamp),
            ],
            calls: Vec::new(),
            reject_markers: VecDeque::new(),
            failing_reads: 0,
        }
    }

    /// Rejects the next write whose document contains `marker`, without
    /// applying it. Queued markers are consumed in order.
    pub fn reject_write_containing(&mut self, marker: impl Into<String>) -> &mut Self {
        self.reject_markers.push_back(marker.into());
        self
    }

    /// Fails the next `count` reads with a transport error.
    pub fn fail_reads(&mut self, count: u32) -> &mut Self {
        self.failing_reads = count;
        self
    }

    pub fn connections(&self, module: WssModule) -> Vec<&ConnectionRow> {
        self.connections
            .iter()
            .filter(|c| c.module == module)
            .collect()
    }

    pub fn edfa(&self, role: AmplifierRole) -> &EdfaRow {
        &self.edfas[edfa_index(role)]
    }

    pub fn calls(&self) -> &[TransportCall] {
        &self.calls
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    pub fn write_count(&self) -> usize {
        self.calls.iter().filter(|c| c.is_write()).count()
    }

    fn write(&mut self, call: TransportCall) -> WdmResult<RpcReply> {
        let doc = call.document().to_string();
        self.calls.push(call);

        let rejected = self
            .reject_markers
            .front()
            .is_some_and(|marker| doc.contains(marker.as_str()));
        if rejected {
            self.reject_markers.pop_front();
            return Ok(RpcReply::new(rpc_error("injected failure")));
        }

        Ok(match self.apply(&doc) {
            Ok(()) => RpcReply::ok(),
            Err(message) => {
                debug!("Simulated card rejected write: {}", message);
                RpcReply::new(rpc_error(&message))
            }
        })
    }

    fn read(&mut self, call: TransportCall) -> WdmResult<RpcReply> {
        let doc = call.document().to_string();
        let is_config = matches!(call, TransportCall::GetConfig(..));
        self.calls.push(call);

        if self.failing_reads > 0 {
            self.failing_reads -= 1;
            return Err(WdmError::rpc("get", "session busy", ""));
        }

        let filter = XmlElement::parse(&doc)?;
        let inner = if is_config {
            self.render_config(&filter)
        } else {
            self.render_state(&filter)
        };
        Ok(RpcReply::new(data_reply(&inner)))
    }

    fn apply(&mut self, doc: &str) -> Result<(), String> {
        let root = XmlElement::parse(doc).map_err(|e| e.to_string())?;
        match root.name() {
            "config" => {
                for table in root.children() {
                    match table.name() {
                        "connections" => self.edit_connections(table)?,
                        "edfas" => self.edit_edfas(table)?,
                        other => return Err(format!("unknown table {}", other)),
                    }
                }
                Ok(())
            }
            "remove-all-connections" => {
                let module = module_of(&root)?;
                self.connections.retain(|c| c.module != module);
                Ok(())
            }
            "delete-connection" => {
                let (module, id) = connection_of(&root)?;
                let before = self.connections.len();
                self.connections
                    .retain(|c| !(c.module == module && c.connection_id == id));
                if self.connections.len() == before {
                    return Err(format!("connection {} does not exist", id));
                }
                Ok(())
            }
            "add-connection" => {
                let (module, id) = connection_of(&root)?;
                let conn = self
                    .find_mut(module, &id)
                    .ok_or_else(|| format!("connection {} does not exist", id))?;
                for leaf in root.children() {
                    apply_connection_leaf(conn, leaf)?;
                }
                validate_ports(conn)
            }
            "disable-als" => {
                let dn_text = root.text_at(&["dn"]).map_err(|e| e.to_string())?;
                dn::edfa_id(dn_text)
                    .ok_or_else(|| format!("'{}' is not an amplifier", dn_text))?;
                root.parse_at::<u32>(&["timeout-period"])
                    .map_err(|e| e.to_string())?;
                Ok(())
            }
            other => Err(format!("unknown operation {}", other)),
        }
    }

    fn find_mut(&mut self, module: WssModule, id: &str) -> Option<&mut ConnectionRow> {
        self.connections
            .iter_mut()
            .find(|c| c.module == module && c.connection_id == id)
    }

    fn edit_connections(&mut self, table: &XmlElement) -> Result<(), String> {
        for entry in table.children_named("connection") {
            let (module, id) = connection_of(entry)?;
            let config = entry
                .child("config")
                .ok_or_else(|| format!("connection {} has no config", id))?;

            match self.find_mut(module, &id) {
                Some(conn) => {
                    for leaf in config.children() {
                        apply_connection_leaf(conn, leaf)?;
                    }
                    validate_ports(conn)?;
                }
                None => {
                    let conn = new_connection(module, &id, config)?;
                    self.connections.push(conn);
                }
            }
        }
        self.refresh_powers();
        Ok(())
    }

    fn edit_edfas(&mut self, table: &XmlElement) -> Result<(), String> {
        for entry in table.children_named("edfa") {
            let dn_text = entry.text_at(&["dn"]).map_err(|e| e.to_string())?;
            let role = dn::edfa_id(dn_text)
                .and_then(|id| AmplifierRole::from_edfa_id(id).ok())
                .ok_or_else(|| format!("'{}' is not an amplifier", dn_text))?;
            let config = entry
                .child("config")
                .ok_or_else(|| format!("{} edit has no config", role))?;
            let edfa = &mut self.edfas[edfa_index(role)];

            let changes_settings = config
                .children()
                .iter()
                .any(|leaf| leaf.name() != "maintenance-state");
            if changes_settings && edfa.maintenance_state != "out-of-service" {
                return Err(format!("{} must be out of service to change settings", role));
            }

            for leaf in config.children() {
                apply_edfa_leaf(edfa, leaf)?;
            }
        }
        Ok(())
    }

    /// Recomputes per-connection powers from the blocked flag and attenuation.
    fn refresh_powers(&mut self) {
        for conn in &mut self.connections {
            conn.input_power = NOMINAL_INPUT_POWER;
            conn.output_power = if conn.blocked {
                DARK_POWER
            } else {
                NOMINAL_INPUT_POWER - conn.attenuation
            };
        }
    }

    fn render_state(&self, filter: &XmlElement) -> String {
        let Some(table) = filter.children().first() else {
            return String::new();
        };
        match table.name() {
            "connections" => {
                let rows: Vec<String> = self.connections.iter().map(|c| c.render()).collect();
                connections_table(&rows)
            }
            "monitored-channels" => monitored_channels_table(&self.monitored_rows()),
            "physical-ports" => physical_ports_table(&self.port_rows()),
            "edfas" => {
                let rows: Vec<String> = self.edfas.iter().map(|e| e.render()).collect();
                edfas_table(&rows)
            }
            _ => String::new(),
        }
    }

    /// Answers a `get-config` subtree filter on one amplifier.
    fn render_config(&self, filter: &XmlElement) -> String {
        let Some(entry) = filter.child("edfa") else {
            return String::new();
        };
        let role = entry
            .text_at(&["dn"])
            .ok()
            .and_then(dn::edfa_id)
            .and_then(|id| AmplifierRole::from_edfa_id(id).ok());
        let Some(role) = role else {
            return String::new();
        };
        let edfa = self.edfa(role);

        let leaves: String = entry
            .child("config")
            .map(|config| {
                config
                    .children()
                    .iter()
                    .filter_map(|leaf| {
                        edfa.config_leaf(leaf.name())
                            .map(|v| format!("<lotee:{n}>{}</lotee:{n}>", v, n = leaf.name()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        edfas_table(&[format!(
            "<edfa><dn>{}</dn><config>{}</config></edfa>",
            dn::edfa_dn(role),
            leaves
        )])
    }

    fn monitored_rows(&self) -> Vec<String> {
        let mut rows = Vec::new();
        for module in WssModule::ALL {
            let lit = self
                .connections
                .iter()
                .filter(|c| c.module == module && !c.blocked);
            for (i, conn) in lit.enumerate() {
                rows.push(monitored_channel_row(
                    module.monitor_port(),
                    i as u32 + 1,
                    conn.output_power,
                    (conn.start_freq + conn.end_freq) / 2.0,
                ));
            }
        }
        rows
    }

    fn port_rows(&self) -> Vec<String> {
        let mut rows = vec![physical_port_row(
            LINE_PORT,
            Some(NOMINAL_INPUT_POWER),
            Some(self.edfa(AmplifierRole::Booster).output_power),
            Some(1.0),
        )];
        rows.push(physical_port_row(MUX_MONITOR_PORT, None, None, None));
        rows.push(physical_port_row(DEMUX_MONITOR_PORT, None, None, None));
        for port in MUX_INPUT_PORTS.chain(DEMUX_OUTPUT_PORTS) {
            let role = PortRole::classify(port);
            rows.push(physical_port_row(
                port,
                (role == Some(PortRole::MuxInput)).then_some(NOMINAL_INPUT_POWER),
                (role == Some(PortRole::DemuxOutput)).then_some(DARK_POWER),
                None,
            ));
        }
        rows.push(physical_port_row(MUX_OUTPUT_PORT, None, None, None));
        rows.push(physical_port_row(DEMUX_INPUT_PORT, None, None, None));
        rows
    }
}

impl NetconfTransport for SimulatedWss {
    fn get(&mut self, filter: &str) -> WdmResult<RpcReply> {
        self.read(TransportCall::Get(filter.to_string()))
    }

    fn get_config(&mut self, source: Datastore, filter: &str) -> WdmResult<RpcReply> {
        self.read(TransportCall::GetConfig(source, filter.to_string()))
    }

    fn edit_config(&mut self, target: Datastore, config: &str) -> WdmResult<RpcReply> {
        self.write(TransportCall::EditConfig(target, config.to_string()))
    }

    fn dispatch(&mut self, rpc: &str) -> WdmResult<RpcReply> {
        self.write(TransportCall::Dispatch(rpc.to_string()))
    }
}

fn edfa_index(role: AmplifierRole) -> usize {
    match role {
        AmplifierRole::Booster => 0,
        AmplifierRole::Preamp => 1,
    }
}

fn module_of(entry: &XmlElement) -> Result<WssModule, String> {
    let dn_text = entry.text_at(&["dn"]).map_err(|e| e.to_string())?;
    dn::module_id(dn_text)
        .and_then(|id| WssModule::from_id(id).ok())
        .ok_or_else(|| format!("'{}' names no module", dn_text))
}

fn connection_of(entry: &XmlElement) -> Result<(WssModule, String), String> {
    let module = module_of(entry)?;
    let dn_text = entry.text_at(&["dn"]).map_err(|e| e.to_string())?;
    let id = dn::connection_id(dn_text)
        .ok_or_else(|| format!("'{}' names no connection", dn_text))?;
    Ok((module, id.to_string()))
}

fn parse_leaf<T: std::str::FromStr>(leaf: &XmlElement) -> Result<T, String> {
    leaf.text()
        .parse()
        .map_err(|_| format!("invalid {} '{}'", leaf.name(), leaf.text()))
}

fn port_ref(leaf: &XmlElement) -> Result<u16, String> {
    dn::port_number(leaf.text()).ok_or_else(|| format!("'{}' names no port", leaf.text()))
}

fn new_connection(module: WssModule, id: &str, config: &XmlElement) -> Result<ConnectionRow, String> {
    for required in [
        "start-freq",
        "end-freq",
        "input-port-reference",
        "output-port-reference",
    ] {
        if config.child(required).is_none() {
            return Err(format!("connection {} does not exist", id));
        }
    }

    let mut conn = ConnectionRow::new(module, id, 0, 0);
    conn.attenuation = 0.0;
    for leaf in config.children() {
        apply_connection_leaf(&mut conn, leaf)?;
    }
    if conn.start_freq >= conn.end_freq {
        return Err(format!("connection {} has an empty passband", id));
    }
    validate_ports(&conn)?;
    Ok(conn)
}

fn apply_connection_leaf(conn: &mut ConnectionRow, leaf: &XmlElement) -> Result<(), String> {
    match leaf.name() {
        "dn" => {}
        "maintenance-state" => conn.maintenance_state = leaf.text().to_string(),
        "blocked" => conn.blocked = parse_leaf(leaf)?,
        "start-freq" => conn.start_freq = parse_leaf(leaf)?,
        "end-freq" => conn.end_freq = parse_leaf(leaf)?,
        "attenuation" => conn.attenuation = parse_leaf(leaf)?,
        "input-port-reference" => conn.input_port = port_ref(leaf)?,
        "output-port-reference" => conn.output_port = port_ref(leaf)?,
        "custom-name" => conn.label = leaf.text().to_string(),
        other => return Err(format!("unknown connection leaf {}", other)),
    }
    Ok(())
}

fn validate_ports(conn: &ConnectionRow) -> Result<(), String> {
    let ok = match conn.module {
        WssModule::Mux => {
            MUX_INPUT_PORTS.contains(&conn.input_port) && conn.output_port == MUX_OUTPUT_PORT
        }
        WssModule::Demux => {
            conn.input_port == DEMUX_INPUT_PORT && DEMUX_OUTPUT_PORTS.contains(&conn.output_port)
        }
    };
    if ok {
        Ok(())
    } else {
        Err(format!(
            "ports {} -> {} invalid on {}",
            conn.input_port, conn.output_port, conn.module
        ))
    }
}

fn apply_edfa_leaf(edfa: &mut EdfaRow, leaf: &XmlElement) -> Result<(), String> {
    match leaf.name() {
        "maintenance-state" => edfa.maintenance_state = leaf.text().to_string(),
        "control-mode" => edfa.control_mode = leaf.text().to_string(),
        "gain-switch-mode" => edfa.gain_switch_mode = leaf.text().to_string(),
        "target-power" => edfa.target_power = parse_leaf(leaf)?,
        "target-gain" => edfa.target_gain = parse_leaf(leaf)?,
        "target-gain-tilt" => edfa.target_gain_tilt = parse_leaf(leaf)?,
        "los-shutdown" => edfa.los_shutdown = parse_leaf(leaf)?,
        "optical-loo-threshold" => edfa.optical_loo_threshold = parse_leaf(leaf)?,
        other => return Err(format!("unknown amplifier leaf {}", other)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ADD_ONE: &str = "<xc:config xmlns:xc=\"urn:ietf:params:xml:ns:netconf:base:1.0\">\
        <connections><connection><dn>ne=1;chassis=1;card=1;module=1;connection=3</dn><config>\
        <maintenance-state>in-service</maintenance-state><blocked>false</blocked>\
        <start-freq>191425.00</start-freq><end-freq>191475.00</end-freq>\
        <attenuation>4.00</attenuation>\
        <input-port-reference>ne=1;chassis=1;card=1;port=4101</input-port-reference>\
        <output-port-reference>ne=1;chassis=1;card=1;port=4201</output-port-reference>\
        <custom-name>CH3</custom-name></config></connection></connections></xc:config>";

    #[test]
    fn test_add_and_remove_all() {
        let mut card = SimulatedWss::new();
        assert!(card.edit_config(Datastore::Running, ADD_ONE).unwrap().is_ok());
        assert_eq!(card.connections(WssModule::Mux).len(), 1);
        assert_eq!(card.connections(WssModule::Mux)[0].output_power, -16.0);

        let remove = "<remove-all-connections><dn>ne=1;chassis=1;card=1;module=1</dn></remove-all-connections>";
        assert!(card.dispatch(remove).unwrap().is_ok());
        assert!(card.connections(WssModule::Mux).is_empty());
    }

    #[test]
    fn test_patch_unknown_connection_rejected() {
        let mut card = SimulatedWss::new();
        let patch = "<xc:config><connections><connection>\
            <dn>ne=1;chassis=1;card=1;module=2;connection=9</dn>\
            <config><blocked>true</blocked></config></connection></connections></xc:config>";
        assert!(!card.edit_config(Datastore::Running, patch).unwrap().is_ok());
    }

    #[test]
    fn test_edfa_requires_out_of_service() {
        let mut card = SimulatedWss::new();
        let edit = |state: &str| {
            format!(
                "<xc:config><edfas><edfa><dn>ne=1;chassis=1;card=1;edfa=2</dn><config>\
                 <maintenance-state>{}</maintenance-state><target-gain>12.0</target-gain>\
                 </config></edfa></edfas></xc:config>",
                state
            )
        };
        assert!(!card
            .edit_config(Datastore::Running, &edit("in-service"))
            .unwrap()
            .is_ok());

        card.edfas[1].maintenance_state = "out-of-service".to_string();
        assert!(card
            .edit_config(Datastore::Running, &edit("in-service"))
            .unwrap()
            .is_ok());
        assert_eq!(card.edfa(AmplifierRole::Preamp).target_gain, 12.0);
        assert_eq!(card.edfa(AmplifierRole::Preamp).maintenance_state, "in-service");
    }

    #[test]
    fn test_injected_rejection_is_consumed() {
        let mut card = SimulatedWss::new();
        card.reject_write_containing("module=1");
        assert!(!card.edit_config(Datastore::Running, ADD_ONE).unwrap().is_ok());
        assert!(card.connections(WssModule::Mux).is_empty());
        assert!(card.edit_config(Datastore::Running, ADD_ONE).unwrap().is_ok());
    }

    #[test]
    fn test_failing_reads() {
        let mut card = SimulatedWss::new();
        card.fail_reads(1);
        assert!(card.get("<filter><edfas/></filter>").is_err());
        assert!(card.get("<filter><edfas/></filter>").is_ok());
        assert_eq!(card.call_count(), 2);
        assert_eq!(card.write_count(), 0);
    }
}
