//! In-memory mirror of a WSS line card's live state.
//!
//! [`WssState`] holds four independent sections: the cross-connect table,
//! OCM monitor points, physical-port readings and the amplifier pair. Each
//! section is rebuilt in full by its own `refresh_*` call and never merged
//! into a previous snapshot. A failed refresh leaves its section empty and
//! returns the error; no defaults are substituted.
//!
//! The `parse_*` functions turn a reply's `<data>` element into typed
//! records and can be used on their own.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, instrument};

use wdm_common::{dn, NetconfTransport, WdmError, WdmResult, XmlElement};
use wdm_types::{
    channel_for_frequency, AmplifierRole, Channel, ParseError, PortRole, ServiceState, WssModule,
};

use crate::commands;
use crate::tables::{fields, tables};

/// A pair of values, one per WSS module.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModuleMap<T> {
    pub mux: T,
    pub demux: T,
}

impl<T> ModuleMap<T> {
    pub fn get(&self, module: WssModule) -> &T {
        match module {
            WssModule::Mux => &self.mux,
            WssModule::Demux => &self.demux,
        }
    }

    pub fn get_mut(&mut self, module: WssModule) -> &mut T {
        match module {
            WssModule::Mux => &mut self.mux,
            WssModule::Demux => &mut self.demux,
        }
    }
}

/// One cross-connect as reported by the device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionStatus {
    /// 1-based position within its module in reply order.
    pub id: u32,
    /// The device's description of the connection (its custom name).
    pub connection_id: String,
    pub start_freq: f64,
    pub end_freq: f64,
    pub attenuation: f64,
    pub blocked: bool,
    pub input_port: u16,
    pub input_power: f64,
    pub input_valid: bool,
    pub output_port: u16,
    pub output_power: f64,
    pub output_valid: bool,
}

impl ConnectionStatus {
    /// Positional key, `conn-<id>`.
    pub fn key(&self) -> String {
        format!("conn-{}", self.id)
    }

    pub fn attenuation_text(&self) -> String {
        format!("{:.2}", self.attenuation)
    }
}

/// One OCM reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonitoredChannel {
    /// 1-based position within its module in reply order.
    pub id: u32,
    pub power: f64,
    /// Measured frequency in GHz.
    pub frequency: f64,
}

impl MonitoredChannel {
    /// Positional key, `mon-<id>`.
    pub fn key(&self) -> String {
        format!("mon-{}", self.id)
    }

    /// Grid channel containing the measured frequency.
    pub fn channel(&self) -> Option<Channel> {
        channel_for_frequency(self.frequency)
    }
}

/// Readings of one tracked physical port.
///
/// Which powers are present depends on the role: line ports report both
/// directions and VOA attenuation, MUX add ports only input power, DEMUX
/// drop ports only output power.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortReading {
    pub port: u16,
    pub role: PortRole,
    pub description: String,
    pub operational_state: String,
    pub input_power: Option<f64>,
    pub output_power: Option<f64>,
    pub voa_attenuation: Option<f64>,
}

/// Configuration and telemetry of one amplifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdfaInfo {
    pub role: AmplifierRole,
    pub control_mode: String,
    pub maintenance_state: ServiceState,
    pub target_power: f64,
    pub target_gain: f64,
    pub target_gain_tilt: f64,
    pub input_power: f64,
    pub output_power: f64,
    pub voa_input_power: f64,
    pub voa_output_power: f64,
    pub voa_attenuation: f64,
}

/// Booster and preamp, resolved from each entry's DN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdfaPair {
    pub booster: EdfaInfo,
    pub preamp: EdfaInfo,
}

impl EdfaPair {
    pub fn get(&self, role: AmplifierRole) -> &EdfaInfo {
        match role {
            AmplifierRole::Booster => &self.booster,
            AmplifierRole::Preamp => &self.preamp,
        }
    }
}

/// Snapshot of a line card.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WssState {
    connections: ModuleMap<Vec<ConnectionStatus>>,
    monitored: ModuleMap<Vec<MonitoredChannel>>,
    ports: BTreeMap<u16, PortReading>,
    edfa: Option<EdfaPair>,
}

impl WssState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connections(&self, module: WssModule) -> &[ConnectionStatus] {
        self.connections.get(module)
    }

    /// Looks up a connection by its `conn-<n>` key.
    pub fn connection(&self, module: WssModule, key: &str) -> Option<&ConnectionStatus> {
        self.connections(module).iter().find(|c| c.key() == key)
    }

    pub fn monitored_channels(&self, module: WssModule) -> &[MonitoredChannel] {
        self.monitored.get(module)
    }

    pub fn ports(&self) -> &BTreeMap<u16, PortReading> {
        &self.ports
    }

    pub fn edfa(&self) -> Option<&EdfaPair> {
        self.edfa.as_ref()
    }

    /// Drops the connection table after a write.
    pub fn invalidate_connections(&mut self) {
        self.connections = ModuleMap::default();
    }

    /// Re-reads the cross-connect table.
    #[instrument(skip_all)]
    pub fn refresh_connections<T>(&mut self, session: &mut T) -> WdmResult<()>
    where
        T: NetconfTransport + ?Sized,
    {
        self.connections = ModuleMap::default();
        let reply = session.get(&commands::connections_filter())?;
        let data = reply.data()?;
        self.connections = parse_connections(&data).map_err(|e| e.with_raw(reply.raw()))?;
        debug!(
            mux = self.connections.mux.len(),
            demux = self.connections.demux.len(),
            "Refreshed connections"
        );
        Ok(())
    }

    /// Re-reads OCM monitor points.
    #[instrument(skip_all)]
    pub fn refresh_monitored_channels<T>(&mut self, session: &mut T) -> WdmResult<()>
    where
        T: NetconfTransport + ?Sized,
    {
        self.monitored = ModuleMap::default();
        let reply = session.get(&commands::monitored_channels_filter())?;
        let data = reply.data()?;
        self.monitored = parse_monitored_channels(&data).map_err(|e| e.with_raw(reply.raw()))?;
        debug!(
            mux = self.monitored.mux.len(),
            demux = self.monitored.demux.len(),
            "Refreshed monitored channels"
        );
        Ok(())
    }

    /// Re-reads the tracked physical ports.
    #[instrument(skip_all)]
    pub fn refresh_ports<T>(&mut self, session: &mut T) -> WdmResult<()>
    where
        T: NetconfTransport + ?Sized,
    {
        self.ports.clear();
        let reply = session.get(&commands::physical_ports_filter())?;
        let data = reply.data()?;
        self.ports = parse_ports(&data).map_err(|e| e.with_raw(reply.raw()))?;
        debug!(ports = self.ports.len(), "Refreshed port readings");
        Ok(())
    }

    /// Re-reads both amplifiers.
    #[instrument(skip_all)]
    pub fn refresh_edfa<T>(&mut self, session: &mut T) -> WdmResult<()>
    where
        T: NetconfTransport + ?Sized,
    {
        self.edfa = None;
        let reply = session.get(&commands::edfas_filter())?;
        let data = reply.data()?;
        self.edfa = Some(parse_edfas(&data).map_err(|e| e.with_raw(reply.raw()))?);
        Ok(())
    }
}

/// Rows of `data/<table>/<row>`; a missing table is an empty one.
fn rows<'a>(data: &'a XmlElement, table: &str, row: &'a str) -> Vec<&'a XmlElement> {
    data.child(table)
        .map(|t| t.children_named(row).collect())
        .unwrap_or_default()
}

fn port_reference(conn: &XmlElement, field: &str) -> WdmResult<u16> {
    let reference = conn.text_at(&[fields::CONFIG, field])?;
    dn::port_number(reference).ok_or_else(|| {
        WdmError::rpc(
            "read connections",
            format!("{} '{}' names no port", field, reference),
            "",
        )
    })
}

/// Builds the per-module connection tables.
///
/// Each connection is classified by the `module=` component of its DN and
/// numbered in reply order within its module. Rows for other modules are
/// skipped.
pub fn parse_connections(data: &XmlElement) -> WdmResult<ModuleMap<Vec<ConnectionStatus>>> {
    let mut table: ModuleMap<Vec<ConnectionStatus>> = ModuleMap::default();

    for conn in rows(data, tables::CONNECTIONS, tables::CONNECTION) {
        let dn_text = conn.text_at(&[fields::DN])?;
        let Some(module) = dn::module_id(dn_text).and_then(|id| WssModule::from_id(id).ok())
        else {
            debug!("Skipping connection outside the WSS modules: {}", dn_text);
            continue;
        };

        let entries = table.get_mut(module);
        let status = ConnectionStatus {
            id: entries.len() as u32 + 1,
            connection_id: conn
                .text_at(&[fields::STATE, fields::ENTITY_DESCRIPTION])?
                .to_string(),
            start_freq: conn.parse_at(&[fields::STATE, fields::START_FREQ])?,
            end_freq: conn.parse_at(&[fields::STATE, fields::END_FREQ])?,
            attenuation: conn.parse_at(&[fields::STATE, fields::ATTENUATION])?,
            blocked: conn.parse_at(&[fields::STATE, fields::BLOCKED])?,
            input_port: port_reference(conn, fields::INPUT_PORT_REFERENCE)?,
            input_power: conn.parse_at(&[
                fields::STATE,
                fields::INPUT_CHANNEL_ATTRIBUTES,
                fields::POWER,
            ])?,
            input_valid: conn.parse_at(&[
                fields::STATE,
                fields::INPUT_CHANNEL_ATTRIBUTES,
                fields::VALID_DATA,
            ])?,
            output_port: port_reference(conn, fields::OUTPUT_PORT_REFERENCE)?,
            output_power: conn.parse_at(&[
                fields::STATE,
                fields::OUTPUT_CHANNEL_ATTRIBUTES,
                fields::POWER,
            ])?,
            output_valid: conn.parse_at(&[
                fields::STATE,
                fields::OUTPUT_CHANNEL_ATTRIBUTES,
                fields::VALID_DATA,
            ])?,
        };
        entries.push(status);
    }
    Ok(table)
}

/// Builds the per-module OCM tables.
///
/// A monitor point belongs to the MUX when its DN names port 6201 and to
/// the DEMUX when it names port 3101; other points are ignored.
pub fn parse_monitored_channels(data: &XmlElement) -> WdmResult<ModuleMap<Vec<MonitoredChannel>>> {
    let mut table: ModuleMap<Vec<MonitoredChannel>> = ModuleMap::default();

    for point in rows(data, tables::MONITORED_CHANNELS, tables::MONITORED_CHANNEL) {
        let port = dn::port_number(point.text_at(&[fields::DN])?);
        let Some(module) = WssModule::ALL
            .into_iter()
            .find(|m| Some(m.monitor_port()) == port)
        else {
            continue;
        };

        let entries = table.get_mut(module);
        let reading = MonitoredChannel {
            id: entries.len() as u32 + 1,
            power: point.parse_at(&[fields::STATE, fields::POWER])?,
            frequency: point.parse_at(&[fields::STATE, fields::MEASURED_FREQUENCY])?,
        };
        entries.push(reading);
    }
    Ok(table)
}

/// Builds the port table for the line port, MUX add ports and DEMUX drop
/// ports, attaching only the readings meaningful for each role.
pub fn parse_ports(data: &XmlElement) -> WdmResult<BTreeMap<u16, PortReading>> {
    let mut ports = BTreeMap::new();

    for entry in rows(data, tables::PHYSICAL_PORTS, tables::PHYSICAL_PORT) {
        let dn_text = entry.text_at(&[fields::DN])?;
        let port = dn::port_number(dn_text).ok_or_else(|| {
            WdmError::rpc(
                "read physical ports",
                format!("DN '{}' names no port", dn_text),
                "",
            )
        })?;
        let Some(role) = PortRole::classify(port) else {
            continue;
        };

        let reading = PortReading {
            port,
            role,
            description: entry
                .text_at(&[fields::STATE, fields::ENTITY_DESCRIPTION])?
                .to_string(),
            operational_state: entry
                .text_at(&[fields::STATE, fields::OPERATIONAL_STATE])?
                .to_string(),
            input_power: if role.has_input_power() {
                Some(entry.parse_at(&[fields::STATE, fields::INPUT_POWER])?)
            } else {
                None
            },
            output_power: if role.has_output_power() {
                Some(entry.parse_at(&[fields::STATE, fields::OUTPUT_POWER])?)
            } else {
                None
            },
            voa_attenuation: if role.has_voa() {
                Some(entry.parse_at(&[fields::STATE, fields::OUTVOA_ACTUAL_ATTENUATION])?)
            } else {
                None
            },
        };
        ports.insert(port, reading);
    }
    Ok(ports)
}

fn parse_edfa(entry: &XmlElement, role: AmplifierRole) -> WdmResult<EdfaInfo> {
    use crate::tables::fields::{CONFIG, STATE, VOA, VOAS};

    let maintenance = entry.text_at(&[CONFIG, fields::MAINTENANCE_STATE])?;
    Ok(EdfaInfo {
        role,
        control_mode: entry.text_at(&[CONFIG, fields::CONTROL_MODE])?.to_string(),
        maintenance_state: maintenance
            .parse()
            .map_err(|e: ParseError| WdmError::rpc("read edfas", e.to_string(), ""))?,
        target_power: entry.parse_at(&[CONFIG, fields::TARGET_POWER])?,
        target_gain: entry.parse_at(&[CONFIG, fields::TARGET_GAIN])?,
        target_gain_tilt: entry.parse_at(&[CONFIG, fields::TARGET_GAIN_TILT])?,
        input_power: entry.parse_at(&[STATE, fields::INPUT_POWER])?,
        output_power: entry.parse_at(&[STATE, fields::OUTPUT_POWER])?,
        voa_input_power: entry.parse_at(&[STATE, VOAS, VOA, fields::VOA_INPUT_POWER])?,
        voa_output_power: entry.parse_at(&[STATE, VOAS, VOA, fields::VOA_OUTPUT_POWER])?,
        voa_attenuation: entry.parse_at(&[STATE, VOAS, VOA, fields::VOA_ATTENUATION])?,
    })
}

/// Builds the amplifier pair.
///
/// The reply must hold exactly two amplifiers, one whose DN names `edfa=1`
/// (booster) and one naming `edfa=2` (preamp).
pub fn parse_edfas(data: &XmlElement) -> WdmResult<EdfaPair> {
    let entries = rows(data, tables::EDFAS, tables::EDFA);
    if entries.len() != 2 {
        return Err(WdmError::rpc(
            "read edfas",
            format!("expected 2 amplifiers, found {}", entries.len()),
            "",
        ));
    }

    let mut booster = None;
    let mut preamp = None;
    for entry in entries {
        let dn_text = entry.text_at(&[fields::DN])?;
        let role = dn::edfa_id(dn_text)
            .and_then(|id| AmplifierRole::from_edfa_id(id).ok())
            .ok_or_else(|| {
                WdmError::rpc(
                    "read edfas",
                    format!("DN '{}' names no known amplifier", dn_text),
                    "",
                )
            })?;
        let slot = match role {
            AmplifierRole::Booster => &mut booster,
            AmplifierRole::Preamp => &mut preamp,
        };
        if slot.is_some() {
            return Err(WdmError::rpc(
                "read edfas",
                format!("{} reported twice", role),
                "",
            ));
        }
        *slot = Some(parse_edfa(entry, role)?);
    }

    match (booster, preamp) {
        (Some(booster), Some(preamp)) => Ok(EdfaPair { booster, preamp }),
        _ => Err(WdmError::rpc(
            "read edfas",
            "booster or preamp missing",
            "",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wdm_common::RpcReply;

    fn connection_xml(module: u8, id: &str, blocked: bool, in_port: u16, out_port: u16) -> String {
        format!(
            "<connection><dn>ne=1;chassis=1;card=1;module={module};connection={id}</dn>\
             <config><input-port-reference>ne=1;chassis=1;card=1;port={in_port}</input-port-reference>\
             <output-port-reference>ne=1;chassis=1;card=1;port={out_port}</output-port-reference></config>\
             <state><entity-description>CH{id}</entity-description>\
             <start-freq>191325.0</start-freq><end-freq>191375.0</end-freq>\
             <attenuation>4.00</attenuation><blocked>{blocked}</blocked>\
             <input-channel-attributes><power>-12.5</power><valid-data>true</valid-data></input-channel-attributes>\
             <output-channel-attributes><power>-16.5</power><valid-data>false</valid-data></output-channel-attributes>\
             </state></connection>"
        )
    }

    fn data(inner: &str) -> XmlElement {
        XmlElement::parse(&format!("<data>{}</data>", inner)).unwrap()
    }

    #[test]
    fn test_connections_shapes_normalize() {
        let empty = parse_connections(&data("")).unwrap();
        assert!(empty.mux.is_empty() && empty.demux.is_empty());

        let bare = parse_connections(&data("<connections/>")).unwrap();
        assert!(bare.mux.is_empty());

        let single = parse_connections(&data(&format!(
            "<connections>{}</connections>",
            connection_xml(1, "7", false, 4101, 4201)
        )))
        .unwrap();
        assert_eq!(single.mux.len(), 1);
        assert_eq!(single.mux[0].key(), "conn-1");
        assert_eq!(single.mux[0].id, 1);
        assert_eq!(single.mux[0].connection_id, "CH7");

        let many = parse_connections(&data(&format!(
            "<connections>{}{}{}</connections>",
            connection_xml(2, "9", true, 5101, 5203),
            connection_xml(1, "2", false, 4102, 4201),
            connection_xml(2, "1", false, 5101, 5201),
        )))
        .unwrap();
        assert_eq!(many.mux.len(), 1);
        assert_eq!(many.demux.len(), 2);
        let keys: Vec<String> = many.demux.iter().map(|c| c.key()).collect();
        assert_eq!(keys, vec!["conn-1", "conn-2"]);
        assert_eq!(many.demux[0].connection_id, "CH9");
        assert!(many.demux[0].blocked);
        assert_eq!(many.demux[0].output_port, 5203);
        assert_eq!(many.demux[0].input_power, -12.5);
        assert!(many.demux[0].input_valid);
        assert!(!many.demux[0].output_valid);
    }

    #[test]
    fn test_connections_missing_field() {
        let doc = data(
            "<connections><connection><dn>ne=1;chassis=1;card=1;module=1;connection=1</dn>\
             </connection></connections>",
        );
        let err = parse_connections(&doc).unwrap_err();
        assert!(matches!(err, WdmError::Rpc { .. }));
    }

    #[test]
    fn test_monitored_channels() {
        let doc = data(
            "<monitored-channels>\
             <monitored-channel><dn>ne=1;chassis=1;card=1;port=6201;monitored-channel=1</dn>\
             <state><power>-20.1</power><measured-frequency>191350.0</measured-frequency></state></monitored-channel>\
             <monitored-channel><dn>ne=1;chassis=1;card=1;port=3101;monitored-channel=1</dn>\
             <state><power>-18.0</power><measured-frequency>191400.0</measured-frequency></state></monitored-channel>\
             <monitored-channel><dn>ne=1;chassis=1;card=1;port=6201;monitored-channel=2</dn>\
             <state><power>-21.0</power><measured-frequency>191450.0</measured-frequency></state></monitored-channel>\
             <monitored-channel><dn>ne=1;chassis=1;card=1;port=9999;monitored-channel=1</dn>\
             <state><power>0</power><measured-frequency>0</measured-frequency></state></monitored-channel>\
             </monitored-channels>",
        );
        let table = parse_monitored_channels(&doc).unwrap();
        assert_eq!(table.mux.len(), 2);
        assert_eq!(table.demux.len(), 1);
        assert_eq!(table.mux[1].key(), "mon-2");
        assert_eq!(table.mux[1].channel(), Channel::new(3).ok());
        assert_eq!(table.demux[0].power, -18.0);
    }

    #[test]
    fn test_ports_by_role() {
        let port = |n: u16, extra: &str| {
            format!(
                "<physical-port><dn>ne=1;chassis=1;card=1;port={n}</dn><state>\
                 <entity-description>P{n}</entity-description>\
                 <operational-state>in-service</operational-state>{extra}</state></physical-port>"
            )
        };
        let doc = data(&format!(
            "<physical-ports>{}{}{}{}</physical-ports>",
            port(
                3001,
                "<lotepopt:input-power>-3.0</lotepopt:input-power>\
                 <lotepopt:output-power>1.0</lotepopt:output-power>\
                 <lotepopt:outvoa-actual-attenuation>2.5</lotepopt:outvoa-actual-attenuation>"
            ),
            port(4101, "<lotepopt:input-power>-7.0</lotepopt:input-power>"),
            port(5220, "<lotepopt:output-power>-9.0</lotepopt:output-power>"),
            port(4201, ""),
        ));
        let ports = parse_ports(&doc).unwrap();
        assert_eq!(ports.keys().copied().collect::<Vec<_>>(), vec![3001, 4101, 5220]);
        assert_eq!(ports[&3001].voa_attenuation, Some(2.5));
        assert_eq!(ports[&4101].input_power, Some(-7.0));
        assert_eq!(ports[&4101].output_power, None);
        assert_eq!(ports[&5220].output_power, Some(-9.0));
        assert_eq!(ports[&5220].role, PortRole::DemuxOutput);
    }

    fn edfa_xml(id: u8, target_power: f64) -> String {
        format!(
            "<edfa><dn>ne=1;chassis=1;card=1;edfa={id}</dn><config>\
             <lotee:maintenance-state>in-service</lotee:maintenance-state>\
             <lotee:control-mode>constant-power</lotee:control-mode>\
             <lotee:target-power>{target_power}</lotee:target-power>\
             <lotee:target-gain>15.0</lotee:target-gain>\
             <lotee:target-gain-tilt>0.0</lotee:target-gain-tilt></config>\
             <state><input-power>-20.0</input-power><output-power>{target_power}</output-power>\
             <voas><voa><voa-input-power>1.0</voa-input-power><voa-output-power>0.5</voa-output-power>\
             <voa-attentuation>0.5</voa-attentuation></voa></voas></state></edfa>"
        )
    }

    #[test]
    fn test_edfas_resolved_by_dn() {
        // Preamp listed first: roles come from the DN, not the position.
        let doc = data(&format!(
            "<edfas>{}{}</edfas>",
            edfa_xml(2, -3.0),
            edfa_xml(1, 2.0)
        ));
        let pair = parse_edfas(&doc).unwrap();
        assert_eq!(pair.booster.target_power, 2.0);
        assert_eq!(pair.preamp.target_power, -3.0);
        assert_eq!(pair.get(AmplifierRole::Preamp).role, AmplifierRole::Preamp);
        assert_eq!(pair.booster.voa_attenuation, 0.5);
        assert_eq!(pair.booster.maintenance_state, ServiceState::InService);
    }

    #[test]
    fn test_edfas_count_and_duplicates() {
        let one = data(&format!("<edfas>{}</edfas>", edfa_xml(1, 0.0)));
        assert!(parse_edfas(&one).is_err());

        let twins = data(&format!(
            "<edfas>{}{}</edfas>",
            edfa_xml(1, 0.0),
            edfa_xml(1, 0.0)
        ));
        assert!(parse_edfas(&twins).unwrap_err().to_string().contains("twice"));
    }

    struct CannedReply(String);

    impl NetconfTransport for CannedReply {
        fn get(&mut self, _filter: &str) -> WdmResult<RpcReply> {
            Ok(RpcReply::new(self.0.clone()))
        }
        fn get_config(&mut self, _: wdm_common::Datastore, _: &str) -> WdmResult<RpcReply> {
            Ok(RpcReply::new(self.0.clone()))
        }
        fn edit_config(&mut self, _: wdm_common::Datastore, _: &str) -> WdmResult<RpcReply> {
            Ok(RpcReply::ok())
        }
        fn dispatch(&mut self, _: &str) -> WdmResult<RpcReply> {
            Ok(RpcReply::ok())
        }
    }

    #[test]
    fn test_refresh_replaces_and_clears_on_failure() {
        let mut state = WssState::new();
        let mut good = CannedReply(format!(
            "<rpc-reply><data><connections>{}</connections></data></rpc-reply>",
            connection_xml(1, "1", false, 4101, 4201)
        ));
        state.refresh_connections(&mut good).unwrap();
        assert_eq!(state.connections(WssModule::Mux).len(), 1);
        assert!(state.connection(WssModule::Mux, "conn-1").is_some());

        let broken = "<rpc-reply><data><connections><connection><dn>ne=1;chassis=1;card=1;module=1;connection=1</dn></connection></connections></data></rpc-reply>";
        let mut bad = CannedReply(broken.to_string());
        let err = state.refresh_connections(&mut bad).unwrap_err();
        assert_eq!(err.raw_payload(), Some(broken));
        assert!(state.connections(WssModule::Mux).is_empty());
    }
}
