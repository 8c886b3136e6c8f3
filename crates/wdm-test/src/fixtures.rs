//! Reply documents in the shape the line card sends them.
//!
//! Each builder renders one table row; [`data_reply`] wraps rows into a full
//! `<rpc-reply>`. Some leaves carry the vendor prefixes the card emits
//! (`lotet:`, `lotee:`) so parsers are exercised against them.

use wdm_common::dn::{self, CARD_DN};
use wdm_types::{AmplifierRole, WssModule};

pub const CONNECTION_NS: &str = "http://www.lumentum.com/lumentum-ote-connection";
pub const MONITORED_CHANNEL_NS: &str = "http://www.lumentum.com/lumentum-ote-monitored-channel";
pub const PORT_NS: &str = "http://www.lumentum.com/lumentum-ote-port";
pub const EDFA_NS: &str = "http://www.lumentum.com/lumentum-ote-edfa";

/// `<rpc-reply><data>{inner}</data></rpc-reply>`
pub fn data_reply(inner: &str) -> String {
    format!(
        r#"<rpc-reply xmlns="urn:ietf:params:xml:ns:netconf:base:1.0" message-id="101"><data>{}</data></rpc-reply>"#,
        inner
    )
}

/// An `<rpc-error>` reply.
pub fn rpc_error(message: &str) -> String {
    format!(
        r#"<rpc-reply xmlns="urn:ietf:params:xml:ns:netconf:base:1.0" message-id="101"><rpc-error><error-type>application</error-type><error-tag>operation-failed</error-tag><error-severity>error</error-severity><error-message>{}</error-message></rpc-error></rpc-reply>"#,
        message
    )
}

pub fn connections_table(rows: &[String]) -> String {
    format!(
        r#"<connections xmlns="{ns}" xmlns:lotet="{ns}">{}</connections>"#,
        rows.concat(),
        ns = CONNECTION_NS
    )
}

pub fn monitored_channels_table(rows: &[String]) -> String {
    format!(
        r#"<monitored-channels xmlns="{}">{}</monitored-channels>"#,
        MONITORED_CHANNEL_NS,
        rows.concat()
    )
}

pub fn physical_ports_table(rows: &[String]) -> String {
    format!(
        r#"<physical-ports xmlns="{ns}" xmlns:lotep="{ns}">{}</physical-ports>"#,
        rows.concat(),
        ns = PORT_NS
    )
}

pub fn edfas_table(rows: &[String]) -> String {
    format!(
        r#"<edfas xmlns="{ns}" xmlns:lotee="{ns}">{}</edfas>"#,
        rows.concat(),
        ns = EDFA_NS
    )
}

/// One row of the connection table.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionRow {
    pub module: WssModule,
    pub connection_id: String,
    pub label: String,
    pub maintenance_state: String,
    pub blocked: bool,
    pub start_freq: f64,
    pub end_freq: f64,
    pub attenuation: f64,
    pub input_port: u16,
    pub output_port: u16,
    pub input_power: f64,
    pub output_power: f64,
}

impl ConnectionRow {
    /// An unblocked channel-sized connection with nominal powers.
    pub fn new(module: WssModule, connection_id: &str, input_port: u16, output_port: u16) -> Self {
        Self {
            module,
            connection_id: connection_id.to_string(),
            label: format!("CH{}", connection_id),
            maintenance_state: "in-service".to_string(),
            blocked: false,
            start_freq: 191_325.0,
            end_freq: 191_375.0,
            attenuation: 4.0,
            input_port,
            output_port,
            input_power: -12.0,
            output_power: -16.0,
        }
    }

    pub fn render(&self) -> String {
        let valid = !self.blocked;
        format!(
            "<connection>\
             <dn>{dn}</dn>\
             <config>\
             <maintenance-state>{state}</maintenance-state>\
             <blocked>{blocked}</blocked>\
             <start-freq>{start:.3}</start-freq>\
             <end-freq>{end:.3}</end-freq>\
             <attenuation>{atten:.2}</attenuation>\
             <input-port-reference>{input}</input-port-reference>\
             <output-port-reference>{output}</output-port-reference>\
             <custom-name>{label}</custom-name>\
             </config>\
             <state>\
             <lotet:entity-description>{label}</lotet:entity-description>\
             <lotet:start-freq>{start:.3}</lotet:start-freq>\
             <lotet:end-freq>{end:.3}</lotet:end-freq>\
             <lotet:attenuation>{atten:.2}</lotet:attenuation>\
             <lotet:blocked>{blocked}</lotet:blocked>\
             <lotet:input-channel-attributes>\
             <lotet:power>{in_power:.2}</lotet:power>\
             <lotet:valid-data>{valid}</lotet:valid-data>\
             </lotet:input-channel-attributes>\
             <lotet:output-channel-attributes>\
             <lotet:power>{out_power:.2}</lotet:power>\
             <lotet:valid-data>{valid}</lotet:valid-data>\
             </lotet:output-channel-attributes>\
             </state>\
             </connection>",
            dn = dn::connection_dn(self.module, &self.connection_id),
            state = self.maintenance_state,
            blocked = self.blocked,
            start = self.start_freq,
            end = self.end_freq,
            atten = self.attenuation,
            input = dn::port_dn(self.input_port),
            output = dn::port_dn(self.output_port),
            label = self.label,
            in_power = self.input_power,
            out_power = self.output_power,
            valid = valid,
        )
    }
}

/// One OCM monitor point on `port` (6201 for MUX, 3101 for DEMUX).
pub fn monitored_channel_row(port: u16, index: u32, power: f64, frequency: f64) -> String {
    format!(
        "<monitored-channel>\
         <dn>{};port={};monitored-channel={}</dn>\
         <state><power>{:.2}</power><measured-frequency>{:.3}</measured-frequency></state>\
         </monitored-channel>",
        CARD_DN, port, index, power, frequency
    )
}

/// One physical port row. Powers are emitted only when given.
pub fn physical_port_row(
    port: u16,
    input_power: Option<f64>,
    output_power: Option<f64>,
    voa_attenuation: Option<f64>,
) -> String {
    let mut state = format!(
        "<lotep:entity-description>Port {}</lotep:entity-description>\
         <lotep:operational-state>in-service</lotep:operational-state>",
        port
    );
    if let Some(p) = input_power {
        state.push_str(&format!("<lotep:input-power>{:.2}</lotep:input-power>", p));
    }
    if let Some(p) = output_power {
        state.push_str(&format!("<lotep:output-power>{:.2}</lotep:output-power>", p));
    }
    if let Some(a) = voa_attenuation {
        state.push_str(&format!(
            "<lotep:outvoa-actual-attenuation>{:.2}</lotep:outvoa-actual-attenuation>",
            a
        ));
    }
    format!(
        "<physical-port><dn>{}</dn><state>{}</state></physical-port>",
        dn::port_dn(port),
        state
    )
}

/// One amplifier row.
#[derive(Debug, Clone, PartialEq)]
pub struct EdfaRow {
    pub role: AmplifierRole,
    pub maintenance_state: String,
    pub control_mode: String,
    pub gain_switch_mode: String,
    pub target_power: f64,
    pub target_gain: f64,
    pub target_gain_tilt: f64,
    pub los_shutdown: bool,
    pub optical_loo_threshold: f64,
    pub input_power: f64,
    pub output_power: f64,
}

impl EdfaRow {
    pub fn new(role: AmplifierRole) -> Self {
        Self {
            role,
            maintenance_state: "in-service".to_string(),
            control_mode: "constant-power".to_string(),
            gain_switch_mode: "low-gain".to_string(),
            target_power: -10.0,
            target_gain: 0.0,
            target_gain_tilt: 0.0,
            los_shutdown: true,
            optical_loo_threshold: -50.0,
            input_power: -20.0,
            output_power: -10.0,
        }
    }

    /// Text of one config leaf, if the amplifier has it.
    pub fn config_leaf(&self, name: &str) -> Option<String> {
        let value = match name {
            "maintenance-state" => self.maintenance_state.clone(),
            "control-mode" => self.control_mode.clone(),
            "gain-switch-mode" => self.gain_switch_mode.clone(),
            "target-power" => format!("{:.1}", self.target_power),
            "target-gain" => format!("{:.1}", self.target_gain),
            "target-gain-tilt" => format!("{:.1}", self.target_gain_tilt),
            "los-shutdown" => self.los_shutdown.to_string(),
            "optical-loo-threshold" => format!("{:.1}", self.optical_loo_threshold),
            _ => return None,
        };
        Some(value)
    }

    pub fn render(&self) -> String {
        let config: String = [
            "maintenance-state",
            "control-mode",
            "gain-switch-mode",
            "target-power",
            "target-gain",
            "target-gain-tilt",
            "los-shutdown",
            "optical-loo-threshold",
        ]
        .iter()
        .filter_map(|name| {
            self.config_leaf(name)
                .map(|v| format!("<lotee:{n}>{}</lotee:{n}>", v, n = name))
        })
        .collect();

        format!(
            "<edfa><dn>{dn}</dn><config>{config}</config>\
             <state>\
             <input-power>{input:.2}</input-power>\
             <output-power>{output:.2}</output-power>\
             <voas><voa>\
             <voa-input-power>{output:.2}</voa-input-power>\
             <voa-output-power>{voa_out:.2}</voa-output-power>\
             <voa-attentuation>1.00</voa-attentuation>\
             </voa></voas>\
             </state></edfa>",
            dn = dn::edfa_dn(self.role),
            config = config,
            input = self.input_power,
            output = self.output_power,
            voa_out = self.output_power - 1.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wdm_common::XmlElement;

    #[test]
    fn test_rows_parse() {
        let reply = data_reply(&connections_table(&[
            ConnectionRow::new(WssModule::Mux, "1", 4101, 4201).render(),
        ]));
        let doc = XmlElement::parse(&reply).unwrap();
        let data = doc.child("data").unwrap();
        assert_eq!(
            data.text_at(&["connections", "connection", "state", "entity-description"])
                .unwrap(),
            "CH1"
        );

        let edfa = XmlElement::parse(&EdfaRow::new(AmplifierRole::Preamp).render()).unwrap();
        assert_eq!(edfa.text_at(&["config", "target-power"]).unwrap(), "-10.0");
        assert_eq!(
            edfa.text_at(&["state", "voas", "voa", "voa-attentuation"]).unwrap(),
            "1.00"
        );
    }

    #[test]
    fn test_rpc_error_is_not_ok() {
        let reply = wdm_common::RpcReply::new(rpc_error("bad"));
        assert!(!reply.is_ok());
    }
}
