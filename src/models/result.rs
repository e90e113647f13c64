use std::fmt;
use std::fmt::Formatter;
use std::net::IpAddr;

use serde::Serialize;
use strum::{Display, EnumString};

/// Switchport mode of the interface on which the target MAC was learned.
#[derive(Copy, Clone, Debug, Display, EnumString, PartialEq, Eq, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PortMode {
    Access,
    Trunk,
}

/// The outcome of a trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceResult {
    Found {
        /// The target IP, when the trace started from an IP address.
        ip: Option<IpAddr>,
        mac: String,
        /// The last switch of the walk.
        switch_address: String,
        port: String,
        /// `Trunk` when the walk stopped on an uplink without a reachable neighbor.
        mode: PortMode,
    },
    NotFound,
}

impl TraceResult {
    pub fn is_found(&self) -> bool {
        matches!(self, TraceResult::Found { .. })
    }

    /// True for a best-effort result pointing at an uplink rather than an access port.
    pub fn is_inconclusive(&self) -> bool {
        matches!(
            self,
            TraceResult::Found {
                mode: PortMode::Trunk,
                ..
            }
        )
    }
}

impl fmt::Display for TraceResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TraceResult::Found {
                ip,
                mac,
                switch_address,
                port,
                mode,
            } => {
                if let Some(ip) = ip {
                    write!(f, "IP Address: {ip}, ")?;
                }
                write!(
                    f,
                    "MAC Address: {mac}, Switch IP: {switch_address}, Switch Interface: {port}"
                )?;
                if *mode == PortMode::Trunk {
                    write!(f, " (uplink, no further neighbor)")?;
                }
                Ok(())
            }
            TraceResult::NotFound => write!(f, "not found"),
        }
    }
}
