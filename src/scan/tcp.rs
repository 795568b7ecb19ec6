use std::{
    net::TcpStream,
    time::{Duration, Instant},
};

use crate::resolver;

use super::{Executor, ProbeOutcome};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Full TCP handshake probe. The stream is dropped right after it
/// connects, so nothing is ever sent to the target.
#[derive(Debug, Clone, Copy)]
pub struct TcpScan {
    timeout: Duration,
}

impl TcpScan {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpScan {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Executor for TcpScan {
    fn scan(&self, host: &str, port: u16) -> ProbeOutcome {
        probe(host, port, self.timeout)
    }
}

/// Single connection attempt to `host:port`, bounded by `timeout`.
///
/// Never fails: refusals, timeouts and resolver errors all end up as
/// [`ProbeOutcome::NotOpen`]. When `host` maps to several addresses they
/// share the same `timeout` budget.
pub fn probe(host: &str, port: u16, timeout: Duration) -> ProbeOutcome {
    let addrs = match resolver::lookup(host, port) {
        Ok(addrs) => addrs,
        Err(e) => {
            log::debug!("Port {} on `{}` not probed: {}", port, host, e);
            return ProbeOutcome::NotOpen(port);
        }
    };

    let start = Instant::now();

    for addr in addrs {
        // connect_timeout rejects a zero duration.
        let remaining = timeout.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            break;
        }

        if TcpStream::connect_timeout(&addr, remaining).is_ok() {
            return ProbeOutcome::Open(port);
        }
    }

    ProbeOutcome::NotOpen(port)
}
