use error::ScanError;
use scan::{ScanConfig, Scanner};

pub mod error;
pub mod logger;
pub mod report;
pub mod resolver;
pub mod scan;

/// Scans `start_port..=end_port` of `host` over TCP with at most
/// `concurrency` simultaneous probes and returns the open ports in
/// ascending order.
///
/// Network problems never surface here: an unreachable or unresolvable
/// host just yields no open ports. Only a zero `concurrency` or port `0`
/// are errors.
pub fn scan(
    host: &str,
    start_port: u16,
    end_port: u16,
    concurrency: usize,
) -> Result<Vec<u16>, ScanError> {
    let config = ScanConfig::new(host, start_port, end_port, concurrency)?;
    Scanner::new(config).start().map(|result| result.ports)
}
