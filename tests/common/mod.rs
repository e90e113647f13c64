//! An in-memory network of switches answering canned command outputs.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use l2trace::{Credentials, Session, SessionError, SessionProvider};

pub const SEED: &str = "10.0.0.1";

#[derive(Copy, Clone)]
pub enum Failure {
    Auth,
    Timeout,
}

#[derive(Default)]
struct Journal {
    opened: Vec<String>,
    commands: Vec<(String, String)>,
    closed: usize,
}

#[derive(Clone, Default)]
struct FakeSwitch {
    outputs: HashMap<String, String>,
    broken_commands: HashSet<String>,
    panicking_commands: HashSet<String>,
}

#[derive(Default)]
pub struct FakeNetwork {
    switches: HashMap<String, FakeSwitch>,
    failures: HashMap<String, Failure>,
    journal: Rc<RefCell<Journal>>,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a switch answering `outputs` (command, output). Unknown commands return nothing.
    pub fn switch(mut self, address: &str, outputs: &[(String, String)]) -> Self {
        let switch = self.switches.entry(address.to_string()).or_default();
        for (command, output) in outputs {
            switch.outputs.insert(command.clone(), output.clone());
        }
        self
    }

    /// Make `open` fail on this switch.
    pub fn failing(mut self, address: &str, failure: Failure) -> Self {
        self.failures.insert(address.to_string(), failure);
        self
    }

    /// Make a command fail with a protocol error on this switch.
    pub fn broken(mut self, address: &str, command: &str) -> Self {
        self.switches
            .entry(address.to_string())
            .or_default()
            .broken_commands
            .insert(command.to_string());
        self
    }

    /// Make a command panic on this switch.
    pub fn panicking(mut self, address: &str, command: &str) -> Self {
        self.switches
            .entry(address.to_string())
            .or_default()
            .panicking_commands
            .insert(command.to_string());
        self
    }

    pub fn opened(&self) -> Vec<String> {
        self.journal.borrow().opened.clone()
    }

    pub fn closed(&self) -> usize {
        self.journal.borrow().closed
    }

    pub fn commands_sent(&self, address: &str) -> Vec<String> {
        self.journal
            .borrow()
            .commands
            .iter()
            .filter(|(switch, _)| switch == address)
            .map(|(_, command)| command.clone())
            .collect()
    }
}

impl SessionProvider for FakeNetwork {
    fn open(
        &self,
        address: &str,
        _credentials: &Credentials,
    ) -> Result<Box<dyn Session>, SessionError> {
        self.journal.borrow_mut().opened.push(address.to_string());
        let address = address.to_string();
        match self.failures.get(&address) {
            Some(Failure::Auth) => return Err(SessionError::AuthFailure { address }),
            Some(Failure::Timeout) => return Err(SessionError::Timeout { address }),
            None => {}
        }
        // Switches that are not part of the network never answer.
        let Some(switch) = self.switches.get(&address) else {
            return Err(SessionError::Timeout { address });
        };
        Ok(Box::new(FakeSession {
            address,
            switch: switch.clone(),
            journal: self.journal.clone(),
        }))
    }
}

struct FakeSession {
    address: String,
    switch: FakeSwitch,
    journal: Rc<RefCell<Journal>>,
}

impl Session for FakeSession {
    fn execute(&mut self, command: &str) -> Result<String, SessionError> {
        self.journal
            .borrow_mut()
            .commands
            .push((self.address.clone(), command.to_string()));
        if self.switch.panicking_commands.contains(command) {
            panic!("unexpected answer to {command}");
        }
        if self.switch.broken_commands.contains(command) {
            return Err(SessionError::Protocol {
                address: self.address.clone(),
                reason: "connection reset by peer".to_string(),
            });
        }
        Ok(self.switch.outputs.get(command).cloned().unwrap_or_default())
    }

    fn close(&mut self) {
        self.journal.borrow_mut().closed += 1;
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("netops", "s3cret")
}

// Canned outputs, in the format of IOS show commands.

pub fn arp(ip: &str, mac: &str) -> (String, String) {
    (
        format!("show ip arp {ip}"),
        format!(
            "Protocol  Address          Age (min)  Hardware Addr   Type   Interface\n\
             Internet  {ip}              3   {mac}  ARPA   Vlan20\n"
        ),
    )
}

pub fn mac_table(mac: &str, port: &str) -> (String, String) {
    (
        format!("show mac address-table address {mac}"),
        format!(
            "          Mac Address Table\n\
             -------------------------------------------\n\n\
             Vlan    Mac Address       Type        Ports\n\
             ----    -----------       --------    -----\n  \
             20    {mac}    DYNAMIC     {port}\n\
             Total Mac Addresses for this criterion: 1\n"
        ),
    )
}

pub fn access_config(port: &str) -> (String, String) {
    (
        format!("show running-config interface {port}"),
        format!("interface {port}\n switchport access vlan 20\n switchport mode access\nend\n"),
    )
}

pub fn trunk_config(port: &str) -> (String, String) {
    (
        format!("show running-config interface {port}"),
        format!("interface {port}\n switchport trunk allowed vlan 10,20\n switchport mode trunk\nend\n"),
    )
}

pub fn channel(port: &str, members: &[&str]) -> (String, String) {
    (
        format!("show interfaces {port}"),
        format!(
            "{port} is up, line protocol is up (connected)\n  \
             Hardware is EtherChannel\n  \
             Members in this channel: {}\n",
            members.join(" ")
        ),
    )
}

pub fn cdp(port: &str, neighbor: &str) -> (String, String) {
    (
        format!("show cdp neighbors {port} detail"),
        format!(
            "-------------------------\n\
             Device ID: switch-{neighbor}\n\
             Entry address(es):\n  \
             IP address: {neighbor}\n\
             Interface: {port},  Port ID (outgoing port): GigabitEthernet1/0/1\n"
        ),
    )
}
