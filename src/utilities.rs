//! Utilities.
use std::io::{stdin, stdout, BufRead, BufReader, Read, Write};
use std::net::{IpAddr, Ipv6Addr};

use anyhow::{bail, Context, Result};
use log::{warn, LevelFilter};

/// Initialize the global logger with the given minimum level.
///
/// `RUST_LOG` still takes precedence, so that per-module levels can be used for debugging.
pub fn configure_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .init();
}

/// Iterate over the lines of `input`, without their line terminator.
///
/// Invalid UTF-8 sequences are replaced rather than ending the iteration, as
/// `BufRead::lines` would. Reading stops on the first I/O error.
pub fn read_lines_lossy<T: Read>(input: T) -> impl Iterator<Item = String> {
    BufReader::new(input)
        .split(b'\n')
        .map_while(|line| match line {
            Ok(bytes) => Some(
                String::from_utf8_lossy(&bytes)
                    .trim_end_matches('\r')
                    .to_string(),
            ),
            Err(error) => {
                warn!("cannot read line: {}", error);
                None
            }
        })
}

/// Parse an IPv4 or IPv6 address, mapping IPv4 addresses into the IPv6 space.
pub fn parse_as_ipv6(s: &str) -> Result<Ipv6Addr> {
    match s.trim().parse::<IpAddr>()? {
        IpAddr::V4(addr) => Ok(addr.to_ipv6_mapped()),
        IpAddr::V6(addr) => Ok(addr),
    }
}

/// Print `message` and read a non-empty line from stdin.
pub fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    stdout().flush()?;
    let mut line = String::new();
    stdin()
        .lock()
        .read_line(&mut line)
        .context("cannot read from stdin")?;
    let line = line.trim();
    if line.is_empty() {
        bail!("no value entered");
    }
    Ok(line.to_string())
}
