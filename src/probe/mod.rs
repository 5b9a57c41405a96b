//! TCP-connect latency probe
//!
//! A probe times one connection attempt to `address:port`. Failures of any
//! kind are reported as an outcome, never as an error: unreachable addresses
//! are the common case when sampling CIDR ranges.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

/// Result of a single connection attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProbeAttempt {
    /// Connection established after this many milliseconds
    Connected(f64),
    /// The attempt did not complete within the timeout
    TimedOut,
    /// Refused, unreachable or any other transport error
    Failed(String),
}

impl ProbeAttempt {
    /// Latency when the attempt succeeded
    pub fn latency_ms(&self) -> Option<f64> {
        match self {
            Self::Connected(ms) => Some(*ms),
            Self::TimedOut | Self::Failed(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    /// Short reason for logging
    pub fn describe(&self) -> String {
        match self {
            Self::Connected(ms) => format!("{:.1}ms", ms),
            Self::TimedOut => "timeout".to_string(),
            Self::Failed(reason) => reason.clone(),
        }
    }
}

/// One timed connection attempt per call, no retries
#[async_trait]
pub trait LatencyProbe: Send + Sync {
    /// Attempt a connection and classify the outcome
    async fn attempt(&self, address: Ipv4Addr, port: u16, timeout: Duration) -> ProbeAttempt;

    /// Latency in milliseconds, or `None` on timeout, refusal or error
    async fn measure(&self, address: Ipv4Addr, port: u16, timeout: Duration) -> Option<f64> {
        self.attempt(address, port, timeout).await.latency_ms()
    }
}

/// Probe backed by a real TCP handshake
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnectProbe;

impl TcpConnectProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LatencyProbe for TcpConnectProbe {
    async fn attempt(&self, address: Ipv4Addr, port: u16, timeout: Duration) -> ProbeAttempt {
        let target = SocketAddr::from((address, port));
        let start = Instant::now();

        // Dropping the connect future on timeout closes the pending socket
        match tokio::time::timeout(timeout, TcpStream::connect(target)).await {
            Ok(Ok(stream)) => {
                let elapsed = start.elapsed();
                drop(stream);
                ProbeAttempt::Connected(elapsed.as_secs_f64() * 1000.0)
            }
            Ok(Err(e)) => ProbeAttempt::Failed(e.to_string()),
            Err(_) => ProbeAttempt::TimedOut,
        }
    }
}
