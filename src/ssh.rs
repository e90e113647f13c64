//! Run commands on switches with the system OpenSSH client.
//!
//! Each command is executed in its own `ssh <switch> <command>` invocation,
//! which IOS supports for exec-mode commands. Password authentication is
//! delegated to `sshpass`, the password being passed through the `SSHPASS`
//! environment variable rather than on the command line.
//!
//! Like `netstat` for routing tables, there is no need for a native SSH stack
//! here: a trace sends a handful of commands per switch and spawning a process
//! for each of them is negligible compared to the device response time.
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::Duration;

use log::debug;

use crate::session::{Credentials, Session, SessionError, SessionProvider};

/// Default path to the ssh binary (resolved through `PATH`).
pub const DEFAULT_SSH_BINARY: &str = "ssh";
/// Default path to the sshpass binary (resolved through `PATH`).
pub const DEFAULT_SSHPASS_BINARY: &str = "sshpass";
/// Command sent when opening a session, to surface connection and authentication failures early.
pub const HANDSHAKE_COMMAND: &str = "terminal length 0";
/// Exit status used by sshpass when the password is rejected.
const SSHPASS_INVALID_PASSWORD: i32 = 5;

#[derive(Clone, Debug)]
pub struct SshProvider {
    pub ssh_binary: PathBuf,
    pub sshpass_binary: PathBuf,
    /// Applied both to the TCP connection and to unresponsive sessions.
    pub connect_timeout: Duration,
}

impl Default for SshProvider {
    fn default() -> Self {
        Self {
            ssh_binary: PathBuf::from(DEFAULT_SSH_BINARY),
            sshpass_binary: PathBuf::from(DEFAULT_SSHPASS_BINARY),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl SshProvider {
    pub fn build_command(
        &self,
        address: &str,
        credentials: &Credentials,
        command: &str,
    ) -> Command {
        // ssh does not accept sub-second timeouts.
        let timeout = self.connect_timeout.as_secs().max(1);
        let mut cmd = Command::new(&self.sshpass_binary);
        cmd.env("SSHPASS", &credentials.password)
            .arg("-e")
            .arg(&self.ssh_binary)
            .args(["-o", format!("ConnectTimeout={timeout}").as_str()])
            .args(["-o", format!("ServerAliveInterval={timeout}").as_str()])
            .args(["-o", "ServerAliveCountMax=1"])
            .args(["-o", "StrictHostKeyChecking=accept-new"])
            .args(["-o", "PubkeyAuthentication=no"])
            .args(["-o", "NumberOfPasswordPrompts=1"])
            .args(["-l", credentials.username.as_str()])
            .arg(address)
            .arg(command);
        cmd
    }

    fn run(
        &self,
        address: &str,
        credentials: &Credentials,
        command: &str,
    ) -> Result<String, SessionError> {
        let output = self
            .build_command(address, credentials, command)
            .output()
            .map_err(|error| SessionError::Protocol {
                address: address.to_string(),
                reason: format!("cannot spawn {:?}: {}", self.sshpass_binary, error),
            })?;
        into_result(address, output)
    }
}

impl SessionProvider for SshProvider {
    fn open(
        &self,
        address: &str,
        credentials: &Credentials,
    ) -> Result<Box<dyn Session>, SessionError> {
        debug!("switch={} connecting as {}", address, credentials.username);
        self.run(address, credentials, HANDSHAKE_COMMAND)?;
        Ok(Box::new(SshSession {
            provider: self.clone(),
            address: address.to_string(),
            credentials: credentials.clone(),
            closed: false,
        }))
    }
}

pub struct SshSession {
    provider: SshProvider,
    address: String,
    credentials: Credentials,
    closed: bool,
}

impl Session for SshSession {
    fn execute(&mut self, command: &str) -> Result<String, SessionError> {
        if self.closed {
            return Err(SessionError::Protocol {
                address: self.address.clone(),
                reason: "session is closed".to_string(),
            });
        }
        self.provider.run(&self.address, &self.credentials, command)
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

fn into_result(address: &str, output: Output) -> Result<String, SessionError> {
    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(classify_failure(address, output.status.code(), &stderr))
}

/// Map a failed ssh invocation to a session error.
pub fn classify_failure(address: &str, code: Option<i32>, stderr: &str) -> SessionError {
    let address = address.to_string();
    let unreachable = [
        "timed out",
        "Connection refused",
        "No route to host",
        "Could not resolve hostname",
        "Network is unreachable",
    ];
    if code == Some(SSHPASS_INVALID_PASSWORD) || stderr.contains("Permission denied") {
        SessionError::AuthFailure { address }
    } else if unreachable.iter().any(|pattern| stderr.contains(pattern)) {
        SessionError::Timeout { address }
    } else {
        let reason = match (code, stderr.trim()) {
            (None, _) => "ssh terminated by a signal".to_string(),
            (Some(code), "") => format!("ssh exited with status {code}"),
            (Some(code), message) => format!("ssh exited with status {code}: {message}"),
        };
        SessionError::Protocol { address, reason }
    }
}
