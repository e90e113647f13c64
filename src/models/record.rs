use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::models::{PortMode, TargetIdentifier, TraceResult};

/// Status of a target list line that is not a target.
pub const STATUS_INVALID: &str = "invalid";

/// A flat representation of a trace, suitable for CSV output.
#[derive(Debug, Serialize)]
pub struct TraceRecord {
    pub target: String,
    pub status: &'static str,
    pub ip: Option<String>,
    pub mac: Option<String>,
    pub switch: Option<String>,
    pub port: Option<String>,
    pub mode: Option<PortMode>,
    /// Switches dialed during the trace, separated by ` > `.
    pub path: String,
    /// RFC 3339 UTC timestamp of the end of the trace.
    pub traced_at: String,
}

impl TraceRecord {
    pub fn new(target: &TargetIdentifier, result: &TraceResult, path: &[String]) -> Self {
        let target_str = match target {
            TargetIdentifier::ByIp(ip) => ip.to_string(),
            TargetIdentifier::ByMac(mac) => mac.clone(),
        };
        let path = path.join(" > ");
        let traced_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        match result {
            TraceResult::Found {
                ip,
                mac,
                switch_address,
                port,
                mode,
            } => Self {
                target: target_str,
                status: "found",
                ip: ip.map(|ip| ip.to_string()),
                mac: Some(mac.clone()),
                switch: Some(switch_address.clone()),
                port: Some(port.clone()),
                mode: Some(*mode),
                path,
                traced_at,
            },
            TraceResult::NotFound => Self {
                target: target_str,
                status: "not_found",
                ip: target.ip().map(|ip| ip.to_string()),
                mac: target.mac().map(String::from),
                switch: None,
                port: None,
                mode: None,
                path,
                traced_at,
            },
        }
    }

    /// Record for a line that could not be traced, since no switch was dialed.
    pub fn invalid(line: &str) -> Self {
        Self {
            target: line.to_string(),
            status: STATUS_INVALID,
            ip: None,
            mac: None,
            switch: None,
            port: None,
            mode: None,
            path: String::new(),
            traced_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}
