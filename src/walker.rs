//! Hop-by-hop search of the switch port an end host is attached to.
//!
//! Starting from a seed switch, the walker resolves the MAC address of the target
//! (through ARP if only its IP is known), looks up the port on which the MAC was
//! learned and, if this port is a trunk, follows the CDP neighbor behind it.
//! The walk stops on the first access port, or when it cannot go further.
//!
//! ```no_run
//! use l2trace::models::TargetIdentifier;
//! use l2trace::session::Credentials;
//! use l2trace::ssh::SshProvider;
//! use l2trace::walker::Walker;
//!
//! let provider = SshProvider::default();
//! let credentials = Credentials::new("netops", "secret");
//! let walker = Walker::new(&provider, &credentials);
//!
//! let target: TargetIdentifier = "10.0.0.5".parse().unwrap();
//! println!("{}", walker.locate("10.0.0.1", &target));
//! ```
use std::any::Any;
use std::collections::HashSet;
use std::net::IpAddr;
use std::panic::{self, AssertUnwindSafe};

use log::{debug, error, info, warn};

use crate::commands::*;
use crate::models::{PortMode, TargetIdentifier, TraceResult};
use crate::parser::{
    extract_channel_members, extract_mac, extract_neighbor_ip, extract_port, is_trunk,
};
use crate::session::{Credentials, ScopedSession, SessionError, SessionProvider};
use crate::tree::SwitchFilter;

/// A completed trace: its result and the switches that were dialed, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trace {
    pub result: TraceResult,
    pub path: Vec<String>,
}

/// Mutable state of a single trace.
struct TraceState {
    current: String,
    ip: Option<IpAddr>,
    /// Set at most once, either from the target or from the first ARP lookup.
    mac: Option<String>,
    visited: HashSet<String>,
    path: Vec<String>,
}

impl TraceState {
    fn new(start: &str, target: &TargetIdentifier) -> Self {
        TraceState {
            current: start.to_string(),
            ip: target.ip(),
            mac: target.mac().map(String::from),
            visited: HashSet::new(),
            path: Vec::new(),
        }
    }

    fn found(&self, mac: String, port: String, mode: PortMode) -> TraceResult {
        TraceResult::Found {
            ip: self.ip,
            mac,
            switch_address: self.current.clone(),
            port,
            mode,
        }
    }
}

/// What to do after visiting a switch.
enum Step {
    Hop(String),
    Done(TraceResult),
}

pub struct Walker<'a, P: SessionProvider + ?Sized> {
    provider: &'a P,
    credentials: &'a Credentials,
    filter: SwitchFilter,
}

impl<'a, P: SessionProvider + ?Sized> Walker<'a, P> {
    pub fn new(provider: &'a P, credentials: &'a Credentials) -> Self {
        Walker {
            provider,
            credentials,
            filter: SwitchFilter::default(),
        }
    }

    /// Restrict the neighbors the walk may hop to. The seed switch is always dialed.
    pub fn with_filter(mut self, filter: SwitchFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Locate the access port of `target`, starting from the `start` switch.
    pub fn locate(&self, start: &str, target: &TargetIdentifier) -> TraceResult {
        self.trace(start, target).result
    }

    /// Same as [`Walker::locate`], but also return the switches visited.
    ///
    /// Device failures never escape this function: they are logged and reported as
    /// [`TraceResult::NotFound`]. So does a panic of the session provider or of one of its
    /// sessions, the session being closed while unwinding.
    pub fn trace(&self, start: &str, target: &TargetIdentifier) -> Trace {
        let mut state = TraceState::new(start, target);
        let result = loop {
            if !state.visited.insert(state.current.clone()) {
                warn!("target={} switch={} loop detected", target, state.current);
                break TraceResult::NotFound;
            }
            state.path.push(state.current.clone());
            debug!(
                "target={} switch={} hop={}",
                target,
                state.current,
                state.path.len()
            );
            let step = panic::catch_unwind(AssertUnwindSafe(|| self.visit(&mut state)));
            match step {
                Ok(Ok(Step::Hop(next))) => state.current = next,
                Ok(Ok(Step::Done(result))) => break result,
                Ok(Err(
                    err @ (SessionError::AuthFailure { .. } | SessionError::Timeout { .. }),
                )) => {
                    warn!("target={} {}", target, err);
                    break TraceResult::NotFound;
                }
                Ok(Err(err)) => {
                    error!("target={} switch={} {:?}", target, state.current, err);
                    break TraceResult::NotFound;
                }
                Err(payload) => {
                    error!(
                        "target={} switch={} panicked: {}",
                        target,
                        state.current,
                        panic_message(payload.as_ref())
                    );
                    break TraceResult::NotFound;
                }
            }
        };
        Trace {
            result,
            path: state.path,
        }
    }

    /// Run the commands of one hop. The session is closed when this function returns.
    fn visit(&self, state: &mut TraceState) -> Result<Step, SessionError> {
        let mut session = ScopedSession::open(self.provider, &state.current, self.credentials)?;

        let mac = match state.mac.clone() {
            Some(mac) => mac,
            None => {
                let Some(mac) = self.resolve_mac(&mut session, state)? else {
                    return Ok(Step::Done(TraceResult::NotFound));
                };
                state.mac = Some(mac.clone());
                mac
            }
        };

        let output = session.execute(&show_mac_address_table(&mac))?;
        let Some(port) = extract_port(&output) else {
            info!("switch={} mac={} not in MAC address table", state.current, mac);
            return Ok(Step::Done(TraceResult::NotFound));
        };

        let output = session.execute(&show_running_config_interface(&port))?;
        if !is_trunk(&output) {
            debug!("switch={} port={} mode=access", state.current, port);
            return Ok(Step::Done(state.found(mac, port, PortMode::Access)));
        }

        // The port may be a port-channel, in which case CDP runs on its members.
        let output = session.execute(&show_interfaces(&port))?;
        let members = extract_channel_members(&output);
        let cdp_port = members.first().unwrap_or(&port);
        debug!(
            "switch={} port={} mode=trunk members={:?} cdp_port={}",
            state.current, port, members, cdp_port
        );

        let output = session.execute(&show_cdp_neighbors_detail(cdp_port))?;
        match extract_neighbor_ip(&output) {
            Some(neighbor) if self.filter.permits(&neighbor) => {
                debug!("switch={} port={} neighbor={}", state.current, cdp_port, neighbor);
                Ok(Step::Hop(neighbor))
            }
            Some(neighbor) => {
                info!(
                    "switch={} port={} neighbor={} excluded by switch filter",
                    state.current, cdp_port, neighbor
                );
                Ok(Step::Done(state.found(mac, port, PortMode::Trunk)))
            }
            None => {
                info!("switch={} port={} no CDP neighbor", state.current, cdp_port);
                Ok(Step::Done(state.found(mac, port, PortMode::Trunk)))
            }
        }
    }

    fn resolve_mac(
        &self,
        session: &mut ScopedSession,
        state: &TraceState,
    ) -> Result<Option<String>, SessionError> {
        let Some(ip) = state.ip else {
            return Ok(None);
        };
        let output = session.execute(&show_ip_arp(ip))?;
        let mac = extract_mac(&output);
        match &mac {
            Some(mac) => debug!("switch={} ip={} mac={}", state.current, ip, mac),
            None => info!("switch={} ip={} no ARP entry", state.current, ip),
        }
        Ok(mac)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown cause"
    }
}

/// Locate `target` from the `start` switch with the default switch filter.
pub fn locate<P: SessionProvider + ?Sized>(
    start: &str,
    target: &TargetIdentifier,
    provider: &P,
    credentials: &Credentials,
) -> TraceResult {
    Walker::new(provider, credentials).locate(start, target)
}
