//! High-level interface for tracing a batch of targets.
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::stdout;
//! use l2trace::easy::{read_credentials, read_targets, trace_targets, Config};
//! use l2trace::ssh::SshProvider;
//!
//! let config = Config {
//!     start_switch: "10.0.0.1".to_string(),
//!     ..Default::default()
//! };
//! let credentials = read_credentials(File::open("credentials.txt").unwrap()).unwrap();
//! let targets = read_targets(File::open("input.txt").unwrap());
//! let provider = SshProvider::default();
//! let statistics = trace_targets(&config, &provider, &credentials, &targets, stdout()).unwrap();
//!
//! println!("{}", statistics);
//! ```
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use log::{info, warn};

use crate::models::{TargetEntry, TargetIdentifier, TraceRecord, TraceResult};
use crate::session::{Credentials, SessionProvider};
use crate::statistics::TraceStatistics;
use crate::tree::{IpTree, SwitchFilter};
use crate::utilities::read_lines_lossy;
use crate::walker::Walker;

/// Default file containing the targets, one per line.
pub const DEFAULT_INPUT_FILE: &str = "input.txt";
/// Default file containing the username and the password.
pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.txt";

/// Read the username (first line) and the password (second line).
pub fn read_credentials<T: Read>(input: T) -> Result<Credentials> {
    let mut lines = BufReader::new(input).lines();
    let username = lines.next().context("missing username")??;
    let password = lines.next().context("missing password")??;
    let username = username.trim();
    if username.is_empty() {
        bail!("empty username");
    }
    Ok(Credentials::new(username, password.trim()))
}

/// Read one target (IP or MAC address) per line.
///
/// Blank lines and lines starting with `#` are ignored. Any other line yields an entry,
/// so that it gets its own output line: lines that are not targets are kept as
/// [`TargetEntry::Invalid`].
pub fn read_targets<T: Read>(input: T) -> Vec<TargetEntry> {
    read_lines_lossy(input)
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let entry = TargetEntry::parse(&line);
            if let TargetEntry::Invalid(line) = &entry {
                warn!("not an IP or MAC address: {:?}", line);
            }
            entry
        })
        .collect()
}

/// Format the line reported to the operator for one target.
pub fn format_result(target: &TargetIdentifier, result: &TraceResult) -> String {
    match (result, target) {
        (TraceResult::Found { .. }, _) => result.to_string(),
        (TraceResult::NotFound, TargetIdentifier::ByIp(ip)) => {
            format!("MAC address for IP {ip} not found.")
        }
        (TraceResult::NotFound, TargetIdentifier::ByMac(mac)) => {
            format!("Switch port for MAC {mac} not found.")
        }
    }
}

/// Format the line reported for a target list line that is not a target.
pub fn format_invalid(line: &str) -> String {
    format!("Invalid target {line}: not an IP or MAC address, not found.")
}

/// Trace each target in order, writing one line per target to `output`.
///
/// Errors are only returned for local I/O (filter files, CSV output); a device failure
/// makes its target not found without affecting the following ones.
pub fn trace_targets<P: SessionProvider + ?Sized, W: Write>(
    config: &Config,
    provider: &P,
    credentials: &Credentials,
    targets: &[TargetEntry],
    mut output: W,
) -> Result<TraceStatistics> {
    info!("{}", config);

    let filter = SwitchFilter {
        allowed: match &config.allowed_switches_file {
            None => None,
            Some(path) => Some(IpTree::from_file(path)?),
        },
        blocked: match &config.blocked_switches_file {
            None => None,
            Some(path) => Some(IpTree::from_file(path)?),
        },
    };

    let mut csv_writer = match &config.output_file_csv {
        None => None,
        Some(path) => {
            let file = File::create(path).with_context(|| format!("cannot create {path:?}"))?;
            Some(csv::Writer::from_writer(BufWriter::new(file)))
        }
    };

    let walker = Walker::new(provider, credentials).with_filter(filter);
    let mut statistics = TraceStatistics::default();

    for entry in targets {
        let target = match entry {
            TargetEntry::Valid(target) => target,
            TargetEntry::Invalid(line) => {
                writeln!(output, "{}", format_invalid(line))?;
                if let Some(writer) = csv_writer.as_mut() {
                    writer.serialize(TraceRecord::invalid(line))?;
                }
                statistics.record_invalid();
                continue;
            }
        };
        let trace = walker.trace(&config.start_switch, target);
        writeln!(output, "{}", format_result(target, &trace.result))?;
        if let Some(writer) = csv_writer.as_mut() {
            writer.serialize(TraceRecord::new(target, &trace.result, &trace.path))?;
        }
        statistics.record(&trace);
    }

    if let Some(mut writer) = csv_writer {
        writer.flush()?;
    }
    output.flush()?;
    info!("{}", statistics);
    Ok(statistics)
}

/// Batch configuration.
#[derive(Default)]
pub struct Config {
    /// Switch from which every trace starts.
    pub start_switch: String,
    /// Only hop to switches in the prefixes specified in the file (allow list).
    pub allowed_switches_file: Option<PathBuf>,
    /// Never hop to switches in the prefixes specified in the file (block list).
    pub blocked_switches_file: Option<PathBuf>,
    /// File to which the results will be written as CSV.
    pub output_file_csv: Option<PathBuf>,
}

impl Display for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "start_switch={:?}", self.start_switch)?;
        write!(f, " allowed_switches_file={:?}", self.allowed_switches_file)?;
        write!(f, " blocked_switches_file={:?}", self.blocked_switches_file)?;
        write!(f, " output_file_csv={:?}", self.output_file_csv)
    }
}

#[cfg(test)]
mod tests {
    use crate::easy::{format_invalid, format_result, read_credentials, read_targets};
    use crate::models::{TargetEntry, TargetIdentifier, TraceResult};

    #[test]
    fn test_read_credentials() {
        let credentials = read_credentials("netops\n s3cret \n".as_bytes()).unwrap();
        assert_eq!(credentials.username, "netops");
        assert_eq!(credentials.password, "s3cret");
        assert!(read_credentials("netops\n".as_bytes()).is_err());
        assert!(read_credentials("\npassword\n".as_bytes()).is_err());
    }

    #[test]
    fn test_read_targets() {
        let input = "10.0.0.5\n\n# printers\n  10.0.0.6  \nnot-a-target\naa:bb:cc:dd:ee:ff\n";
        let targets = read_targets(input.as_bytes());
        assert_eq!(
            targets,
            vec![
                TargetEntry::parse("10.0.0.5"),
                TargetEntry::parse("10.0.0.6"),
                TargetEntry::Invalid("not-a-target".to_string()),
                TargetEntry::Valid(TargetIdentifier::ByMac("aabb.ccdd.eeff".to_string())),
            ]
        );
    }

    #[test]
    fn test_read_targets_past_invalid_utf8() {
        let input: &[u8] = b"10.0.20.31\n\xff\xfe garbage\n10.0.20.40\r\n10.0.20.41\n";
        let targets = read_targets(input);
        assert_eq!(targets.len(), 4);
        assert!(matches!(&targets[1], TargetEntry::Invalid(line) if line.ends_with(" garbage")));
        assert_eq!(targets[2], TargetEntry::parse("10.0.20.40"));
        assert_eq!(targets[3], TargetEntry::parse("10.0.20.41"));
    }

    #[test]
    fn test_format_not_found() {
        let target: TargetIdentifier = "10.0.0.5".parse().unwrap();
        assert_eq!(
            format_result(&target, &TraceResult::NotFound),
            "MAC address for IP 10.0.0.5 not found."
        );
        let target: TargetIdentifier = "aabb.ccdd.eeff".parse().unwrap();
        assert_eq!(
            format_result(&target, &TraceResult::NotFound),
            "Switch port for MAC aabb.ccdd.eeff not found."
        );
        assert_eq!(
            format_invalid("host-a"),
            "Invalid target host-a: not an IP or MAC address, not found."
        );
    }
}
