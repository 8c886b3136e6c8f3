//! Distinguished names used by the line card's data model.
//!
//! Every entity is addressed by a `;`-separated DN rooted at
//! `ne=1;chassis=1;card=1`, for example
//! `ne=1;chassis=1;card=1;module=1;connection=7` or
//! `ne=1;chassis=1;card=1;port=4101`.

use once_cell::sync::Lazy;
use regex::Regex;
use wdm_types::{AmplifierRole, WssModule};

/// DN prefix of the single card every driver talks to.
pub const CARD_DN: &str = "ne=1;chassis=1;card=1";

static MODULE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|;)module=(\d+)").expect("Invalid regex pattern"));
static CONNECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|;)connection=([^;]+)").expect("Invalid regex pattern"));
static PORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|;)port=(\d+)").expect("Invalid regex pattern"));
static EDFA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|;)edfa=(\d+)").expect("Invalid regex pattern"));

/// `ne=1;chassis=1;card=1;module=<id>`
pub fn module_dn(module: WssModule) -> String {
    format!("{};module={}", CARD_DN, module.id())
}

/// `ne=1;chassis=1;card=1;module=<id>;connection=<connection_id>`
pub fn connection_dn(module: WssModule, connection_id: &str) -> String {
    format!("{};module={};connection={}", CARD_DN, module.id(), connection_id)
}

/// `ne=1;chassis=1;card=1;port=<port>`
pub fn port_dn(port: u16) -> String {
    format!("{};port={}", CARD_DN, port)
}

/// `ne=1;chassis=1;card=1;edfa=<id>`
pub fn edfa_dn(role: AmplifierRole) -> String {
    format!("{};edfa={}", CARD_DN, role.edfa_id())
}

/// Module number encoded in a DN.
pub fn module_id(dn: &str) -> Option<u8> {
    capture(&MODULE_RE, dn)?.parse().ok()
}

/// Connection id encoded in a DN.
pub fn connection_id(dn: &str) -> Option<&str> {
    capture(&CONNECTION_RE, dn)
}

/// Port number encoded in a DN or port reference.
pub fn port_number(dn: &str) -> Option<u16> {
    capture(&PORT_RE, dn)?.parse().ok()
}

/// EDFA number encoded in a DN.
pub fn edfa_id(dn: &str) -> Option<u8> {
    capture(&EDFA_RE, dn)?.parse().ok()
}

fn capture<'a>(re: &Regex, dn: &'a str) -> Option<&'a str> {
    re.captures(dn)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builders() {
        assert_eq!(module_dn(WssModule::Demux), "ne=1;chassis=1;card=1;module=2");
        assert_eq!(
            connection_dn(WssModule::Mux, "7"),
            "ne=1;chassis=1;card=1;module=1;connection=7"
        );
        assert_eq!(port_dn(4101), "ne=1;chassis=1;card=1;port=4101");
        assert_eq!(
            edfa_dn(AmplifierRole::Preamp),
            "ne=1;chassis=1;card=1;edfa=2"
        );
    }

    #[test]
    fn test_parsers() {
        let dn = "ne=1;chassis=1;card=1;module=2;connection=14";
        assert_eq!(module_id(dn), Some(2));
        assert_eq!(connection_id(dn), Some("14"));
        assert_eq!(port_number(dn), None);
        assert_eq!(port_number("ne=1;chassis=1;card=1;port=5203"), Some(5203));
        assert_eq!(edfa_id("ne=1;chassis=1;card=1;edfa=1"), Some(1));
    }

    #[test]
    fn test_parsers_ignore_similar_keys() {
        // "submodule=" must not be read as "module=".
        assert_eq!(module_id("ne=1;submodule=3"), None);
        assert_eq!(port_number("ne=1;chassis=1;card=1;export=9"), None);
    }
}
