//! IOS commands sent to the switches during a trace.
use std::net::IpAddr;

pub fn show_ip_arp(ip: IpAddr) -> String {
    format!("show ip arp {ip}")
}

pub fn show_mac_address_table(mac: &str) -> String {
    format!("show mac address-table address {mac}")
}

pub fn show_running_config_interface(port: &str) -> String {
    format!("show running-config interface {port}")
}

pub fn show_interfaces(port: &str) -> String {
    format!("show interfaces {port}")
}

pub fn show_cdp_neighbors_detail(port: &str) -> String {
    format!("show cdp neighbors {port} detail")
}
