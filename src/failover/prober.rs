//! Endpoint connectivity probes.
//!
//! # Responsibilities
//! - Define the probe seam used by the failover manager
//! - Provide the default TCP connect probe
//!
//! # Design Decisions
//! - A probe answers reachability only; protocol-level health is a health
//!   check's job
//! - Probe timeout is distinct from the breaker's reset timeout

use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::net::TcpStream;

use crate::error::BoxError;

/// Connectivity probe for one address.
pub trait EndpointProber: Send + Sync {
    /// Resolve to `Ok(())` when the address is reachable.
    fn probe<'a>(&'a self, addr: &'a str) -> BoxFuture<'a, Result<(), BoxError>>;
}

/// Default probe: a bounded TCP connect.
pub struct TcpProber {
    timeout: Duration,
}

impl TcpProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl EndpointProber for TcpProber {
    fn probe<'a>(&'a self, addr: &'a str) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            match tokio::time::timeout(self.timeout, TcpStream::connect(addr)).await {
                Ok(Ok(_stream)) => Ok(()),
                Ok(Err(e)) => Err(e.into()),
                Err(_) => Err(format!("connect to {} timed out", addr).into()),
            }
        })
    }
}
