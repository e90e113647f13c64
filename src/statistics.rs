//! Counters for a batch of traces.
use std::fmt::{Display, Formatter};

use crate::walker::Trace;

#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct TraceStatistics {
    pub targets: u64,
    /// Traces ending on an access port.
    pub found: u64,
    /// Traces ending on an uplink without a reachable neighbor.
    pub inconclusive: u64,
    pub not_found: u64,
    /// Target list lines that are neither an IP nor a MAC address.
    pub invalid: u64,
    /// Total number of switches dialed, including unreachable ones.
    pub switches_dialed: u64,
}

impl TraceStatistics {
    pub fn record(&mut self, trace: &Trace) {
        self.targets += 1;
        self.switches_dialed += trace.path.len() as u64;
        if trace.result.is_inconclusive() {
            self.inconclusive += 1;
        } else if trace.result.is_found() {
            self.found += 1;
        } else {
            self.not_found += 1;
        }
    }

    pub fn record_invalid(&mut self) {
        self.targets += 1;
        self.invalid += 1;
    }
}

impl Display for TraceStatistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "targets={}", self.targets)?;
        write!(f, " found={}", self.found)?;
        write!(f, " inconclusive={}", self.inconclusive)?;
        write!(f, " not_found={}", self.not_found)?;
        write!(f, " invalid={}", self.invalid)?;
        write!(f, " switches_dialed={}", self.switches_dialed)
    }
}
