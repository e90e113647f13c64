//! Locate the switch ports of end hosts.
use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use l2trace::easy::{
    read_credentials, read_targets, trace_targets, Config, DEFAULT_CREDENTIALS_FILE,
    DEFAULT_INPUT_FILE,
};
use l2trace::models::{TargetEntry, TargetIdentifier};
use l2trace::ssh::{SshProvider, DEFAULT_SSHPASS_BINARY, DEFAULT_SSH_BINARY};
use l2trace::utilities::{configure_logger, prompt};
use log::{info, LevelFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// MAC address of the host to locate (any notation).
    #[arg(short = 'm', long, conflicts_with = "ip")]
    mac: Option<String>,
    /// IP address of the host to locate.
    #[arg(short = 'i', long)]
    ip: Option<std::net::IpAddr>,
    /// Switch from which the traces start (prompted if not specified).
    #[arg(short = 's', long)]
    switch: Option<String>,
    /// File containing the username and the password, one per line.
    #[arg(short = 'c', long, default_value = DEFAULT_CREDENTIALS_FILE)]
    credentials_file: PathBuf,
    /// File containing the hosts to locate, used when neither --mac nor --ip is specified.
    #[arg(short = 'f', long, default_value = DEFAULT_INPUT_FILE)]
    input_file: PathBuf,
    /// File to which the results will be written as CSV.
    #[arg(short = 'o', long)]
    output_file_csv: Option<PathBuf>,
    /// Only hop to switches in the prefixes specified in the file (allow list).
    #[arg(long)]
    allowed_switches_file: Option<PathBuf>,
    /// Never hop to switches in the prefixes specified in the file (block list).
    #[arg(long)]
    blocked_switches_file: Option<PathBuf>,
    /// Path to the ssh binary.
    #[arg(long, default_value = DEFAULT_SSH_BINARY)]
    ssh_binary: PathBuf,
    /// Path to the sshpass binary.
    #[arg(long, default_value = DEFAULT_SSHPASS_BINARY)]
    sshpass_binary: PathBuf,
    /// Time in seconds to wait for a switch to answer.
    #[arg(short = 'W', long, default_value_t = 10)]
    connect_timeout: u64,
    /// Minimum log level.
    #[arg(short = 'L', long, default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let args = Args::parse();

    configure_logger(args.log_level);

    let credentials_file = File::open(&args.credentials_file)
        .with_context(|| format!("cannot open {:?}", args.credentials_file))?;
    let credentials = read_credentials(credentials_file)?;

    let targets = match (args.mac, args.ip) {
        (Some(mac), _) => vec![TargetEntry::from(TargetIdentifier::from_mac(&mac)?)],
        (None, Some(ip)) => vec![TargetEntry::from(TargetIdentifier::ByIp(ip))],
        (None, None) => {
            info!("Reading targets from {:?}", args.input_file);
            let input = File::open(&args.input_file)
                .with_context(|| format!("cannot open {:?}", args.input_file))?;
            read_targets(input)
        }
    };
    if targets.is_empty() {
        bail!("no target to locate");
    }

    let start_switch = match args.switch {
        Some(switch) => switch,
        None => prompt("Enter Switch IP address: ")?,
    };

    let config = Config {
        start_switch,
        allowed_switches_file: args.allowed_switches_file,
        blocked_switches_file: args.blocked_switches_file,
        output_file_csv: args.output_file_csv,
    };

    let provider = SshProvider {
        ssh_binary: args.ssh_binary,
        sshpass_binary: args.sshpass_binary,
        connect_timeout: Duration::from_secs(args.connect_timeout),
    };

    trace_targets(&config, &provider, &credentials, &targets, stdout().lock())?;
    Ok(())
}
