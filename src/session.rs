//! Remote command sessions on network devices.
//!
//! The walker only depends on the [`SessionProvider`] and [`Session`] traits,
//! so that a live SSH transport ([`crate::ssh::SshProvider`]) can be swapped
//! for an in-memory fake in tests.
use std::fmt::{Debug, Formatter};

use log::trace;
use thiserror::Error;

/// Failures reported by a session provider.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("authentication failed on {address}")]
    AuthFailure { address: String },
    #[error("timed out while talking to {address}")]
    Timeout { address: String },
    #[error("protocol error on {address}: {reason}")]
    Protocol { address: String, reason: String },
}

/// Username and password used for every switch of a run.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated command session to one device.
pub trait Session {
    /// Send a command and return its raw output.
    fn execute(&mut self, command: &str) -> Result<String, SessionError>;
    /// Release the session. Must be idempotent and must not fail.
    fn close(&mut self);
}

/// Opens sessions to devices.
pub trait SessionProvider {
    fn open(
        &self,
        address: &str,
        credentials: &Credentials,
    ) -> Result<Box<dyn Session>, SessionError>;
}

/// A session that is closed when it goes out of scope.
pub struct ScopedSession {
    address: String,
    inner: Box<dyn Session>,
}

impl ScopedSession {
    pub fn open<P: SessionProvider + ?Sized>(
        provider: &P,
        address: &str,
        credentials: &Credentials,
    ) -> Result<Self, SessionError> {
        let inner = provider.open(address, credentials)?;
        trace!("switch={} session=open", address);
        Ok(Self {
            address: address.to_string(),
            inner,
        })
    }

    pub fn execute(&mut self, command: &str) -> Result<String, SessionError> {
        trace!("switch={} command={:?}", self.address, command);
        let output = self.inner.execute(command)?;
        trace!("switch={} output={:?}", self.address, output);
        Ok(output)
    }
}

impl Drop for ScopedSession {
    fn drop(&mut self) {
        self.inner.close();
        trace!("switch={} session=closed", self.address);
    }
}
