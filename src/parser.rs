//! Functions for extracting facts from the output of IOS show commands.
//!
//! All functions are pure and operate on the raw text returned by a device.
//! A missing fact is reported as `None` (or an empty vector), never as an error.
use lazy_static::lazy_static;
use regex::Regex;

/// Line of the running configuration that marks an interface as a trunk.
pub const TRUNK_MODE_MARKER: &str = "switchport mode trunk";

lazy_static! {
    static ref MAC_RE: Regex =
        Regex::new(r"([0-9a-fA-F]{4}\.[0-9a-fA-F]{4}\.[0-9a-fA-F]{4})").unwrap();
    // <vlan> <mac> <type> <port>, e.g. ` 10    aabb.ccdd.eeff    DYNAMIC     Gi1/0/13`.
    static ref MAC_TABLE_ROW_RE: Regex = Regex::new(
        r"(?m)^\s*(\d+)\s+([0-9a-fA-F]{4}\.[0-9a-fA-F]{4}\.[0-9a-fA-F]{4})\s+\S+\s+(\S+)"
    )
    .unwrap();
    static ref CHANNEL_MEMBERS_RE: Regex = Regex::new(r"Members in this channel:[ \t]*(.+)").unwrap();
    static ref NEIGHBOR_IP_RE: Regex = Regex::new(r"IP address:\s*(\d{1,3}(?:\.\d{1,3}){3})").unwrap();
}

/// Return the first MAC address found in the output of `show ip arp`.
pub fn extract_mac(arp_text: &str) -> Option<String> {
    MAC_RE
        .captures(arp_text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

/// Return the port of the first row of `show mac address-table`.
pub fn extract_port(mac_table_text: &str) -> Option<String> {
    MAC_TABLE_ROW_RE
        .captures(mac_table_text)
        .and_then(|captures| captures.get(3))
        .map(|m| m.as_str().to_string())
}

/// Return true if the interface configuration declares a trunk.
pub fn is_trunk(running_config_text: &str) -> bool {
    running_config_text.contains(TRUNK_MODE_MARKER)
}

/// Return the physical members of a port-channel, in the order reported by the device.
pub fn extract_channel_members(interface_detail_text: &str) -> Vec<String> {
    CHANNEL_MEMBERS_RE
        .captures(interface_detail_text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().split_whitespace().map(String::from).collect())
        .unwrap_or_default()
}

/// Return the management IP of the first neighbor in `show cdp neighbors ... detail`.
pub fn extract_neighbor_ip(cdp_detail_text: &str) -> Option<String> {
    NEIGHBOR_IP_RE
        .captures(cdp_detail_text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use crate::parser::*;

    #[test]
    fn test_extract_mac() {
        let text = "Internet  10.0.0.5  -   aabb.ccdd.eeff  ARPA   Vlan10";
        assert_eq!(extract_mac(text), Some("aabb.ccdd.eeff".to_string()));
        assert_eq!(extract_mac("Internet  10.0.0.5  -  Incomplete  ARPA"), None);
        assert_eq!(extract_mac(""), None);
    }

    #[test]
    fn test_extract_port() {
        let text = "10   aabb.ccdd.eeff    DYNAMIC     Gi1/0/13";
        assert_eq!(extract_port(text), Some("Gi1/0/13".to_string()));
        assert_eq!(extract_port(""), None);
    }

    #[test]
    fn test_is_trunk_case_sensitive() {
        assert!(is_trunk(" switchport mode trunk\n"));
        assert!(!is_trunk(" switchport mode access\n"));
        assert!(!is_trunk(" Switchport Mode Trunk\n"));
    }

    #[test]
    fn test_extract_channel_members() {
        assert_eq!(
            extract_channel_members("Members in this channel: Gi1/0/1 Gi2/0/1"),
            vec!["Gi1/0/1", "Gi2/0/1"]
        );
        assert!(extract_channel_members("Hardware is EtherChannel").is_empty());
    }

    #[test]
    fn test_extract_neighbor_ip() {
        let text = "Entry address(es): \n  IP address: 10.1.1.2\n";
        assert_eq!(extract_neighbor_ip(text), Some("10.1.1.2".to_string()));
        assert_eq!(extract_neighbor_ip("Total cdp entries displayed : 0"), None);
    }
}
