use std::fmt::{Display, Formatter};
use std::net::IpAddr;
use std::str::FromStr;

use anyhow::{bail, Error};

use crate::mac::{is_valid, normalize};

/// The end host to locate.
///
/// ```
/// use l2trace::models::TargetIdentifier;
///
/// let by_ip: TargetIdentifier = "10.0.0.5".parse().unwrap();
/// let by_mac: TargetIdentifier = "AA:BB:CC:DD:EE:FF".parse().unwrap();
/// assert_eq!(by_mac, TargetIdentifier::ByMac("aabb.ccdd.eeff".to_string()));
/// assert!(by_ip.ip().is_some());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetIdentifier {
    /// The MAC address will be resolved through ARP on the seed switch.
    ByIp(IpAddr),
    /// A MAC address in canonical `xxxx.xxxx.xxxx` notation.
    ByMac(String),
}

impl TargetIdentifier {
    /// Build a MAC identifier, rejecting anything that is not a 48-bit address.
    pub fn from_mac(raw: &str) -> Result<Self, Error> {
        if !is_valid(raw) {
            bail!("invalid MAC address: {raw}")
        }
        Ok(Self::ByMac(normalize(raw)))
    }

    pub fn ip(&self) -> Option<IpAddr> {
        match self {
            Self::ByIp(ip) => Some(*ip),
            Self::ByMac(_) => None,
        }
    }

    pub fn mac(&self) -> Option<&str> {
        match self {
            Self::ByIp(_) => None,
            Self::ByMac(mac) => Some(mac),
        }
    }
}

/// One entry of a target list.
///
/// Lines that are neither an IP nor a MAC address are kept with their raw text, so
/// that a batch reports them instead of dropping them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetEntry {
    Valid(TargetIdentifier),
    Invalid(String),
}

impl TargetEntry {
    /// Parse a line, keeping it as [`TargetEntry::Invalid`] if it is not a target.
    pub fn parse(line: &str) -> Self {
        match line.parse() {
            Ok(target) => Self::Valid(target),
            Err(_) => Self::Invalid(line.trim().to_string()),
        }
    }
}

impl From<TargetIdentifier> for TargetEntry {
    fn from(target: TargetIdentifier) -> Self {
        Self::Valid(target)
    }
}

impl FromStr for TargetIdentifier {
    type Err = Error;

    /// Parse an IP address, or a MAC address in any notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.parse::<IpAddr>() {
            Ok(ip) => Ok(Self::ByIp(ip)),
            Err(_) => Self::from_mac(s),
        }
    }
}

impl Display for TargetIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByIp(ip) => write!(f, "IP {ip}"),
            Self::ByMac(mac) => write!(f, "MAC {mac}"),
        }
    }
}
