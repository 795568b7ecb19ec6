use std::{
    fmt::Debug,
    ops::RangeInclusive,
    time::{Duration, Instant},
};

use rayon::{
    prelude::{IntoParallelIterator, ParallelIterator},
    ThreadPoolBuilder,
};

use crate::error::ScanError;

pub use self::tcp::{probe, TcpScan, DEFAULT_TIMEOUT};

mod tcp;

/// What a single probe found out about a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Open(u16),
    /// Refused, timed out, unreachable or unresolvable.
    NotOpen(u16),
}

impl ProbeOutcome {
    #[inline]
    pub fn port(&self) -> u16 {
        match *self {
            ProbeOutcome::Open(port) | ProbeOutcome::NotOpen(port) => port,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        matches!(self, ProbeOutcome::Open(_))
    }
}

/// Probes one port of a host. Called concurrently from the scan workers.
pub trait Executor: Debug + Sync {
    fn scan(&self, host: &str, port: u16) -> ProbeOutcome;
}

/// Validated scan parameters.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    host: String,
    start_port: u16,
    end_port: u16,
    concurrency: usize,
    timeout: Duration,
}

impl ScanConfig {
    /// Rejects a zero `concurrency` and port `0`. A `start_port` greater
    /// than `end_port` is accepted and yields an empty scan.
    pub fn new(
        host: impl Into<String>,
        start_port: u16,
        end_port: u16,
        concurrency: usize,
    ) -> Result<Self, ScanError> {
        if concurrency == 0 {
            return Err(ScanError::InvalidConcurrency(concurrency));
        }

        if let Some(&port) = [start_port, end_port].iter().find(|&&p| p == 0) {
            return Err(ScanError::InvalidPort(port));
        }

        Ok(Self {
            host: host.into(),
            start_port,
            end_port,
            concurrency,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[inline]
    pub fn ports(&self) -> RangeInclusive<u16> {
        self.start_port..=self.end_port
    }

    #[inline]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of ports in the range.
    pub fn len(&self) -> usize {
        if self.start_port > self.end_port {
            0
        } else {
            (self.end_port - self.start_port) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
pub struct ScanResult {
    pub elapsed: Duration,
    /// Open ports in ascending order.
    pub ports: Vec<u16>,
}

impl ScanResult {
    #[inline]
    fn new(elapsed: Duration, ports: Vec<u16>) -> Self {
        Self { elapsed, ports }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

pub struct Scanner<E = TcpScan> {
    config: ScanConfig,
    executor: E,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        let executor = TcpScan::new(config.timeout());
        Self { config, executor }
    }
}

impl<E: Executor> Scanner<E> {
    pub fn with_executor(config: ScanConfig, executor: E) -> Self {
        Self { config, executor }
    }

    /// Probes every port of the range exactly once, with at most
    /// `concurrency` probes running at the same time, and blocks until
    /// all of them are done.
    pub fn start(&self) -> Result<ScanResult, ScanError> {
        let now = Instant::now();

        if self.config.is_empty() {
            log::debug!("Empty port range, nothing to probe");
            return Ok(ScanResult::new(now.elapsed(), Vec::new()));
        }

        // Extra threads beyond the number of ports would stay idle.
        let workers = self.config.concurrency().min(self.config.len());
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("probe-{}", i))
            .build()
            .map_err(ScanError::PoolBuildFailed)?;

        let host = self.config.host();

        log::debug!(
            "Probing {} port(s) of `{}` with {} worker(s)",
            self.config.len(),
            host,
            workers
        );

        // Indexed collect keeps outcomes in port order whatever the
        // completion order was.
        let outcomes: Vec<ProbeOutcome> = pool.install(|| {
            self.config
                .ports()
                .into_par_iter()
                .map(|port| self.executor.scan(host, port))
                .collect()
        });

        let ports = outcomes
            .into_iter()
            .filter(ProbeOutcome::is_open)
            .map(|outcome| {
                log::debug!("Port {} is open", outcome.port());
                outcome.port()
            })
            .collect();

        Ok(ScanResult::new(now.elapsed(), ports))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
        thread,
    };

    use super::*;

    #[derive(Debug)]
    struct Listening(Vec<u16>);

    impl Executor for Listening {
        fn scan(&self, _: &str, port: u16) -> ProbeOutcome {
            if self.0.contains(&port) {
                ProbeOutcome::Open(port)
            } else {
                ProbeOutcome::NotOpen(port)
            }
        }
    }

    /// Sleeps on every probe while tracking how many run at once.
    #[derive(Debug, Default)]
    struct Tracked {
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        probed: Mutex<Vec<u16>>,
    }

    impl Tracked {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                ..Default::default()
            }
        }
    }

    impl Executor for Tracked {
        fn scan(&self, _: &str, port: u16) -> ProbeOutcome {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(current, Ordering::SeqCst);

            thread::sleep(self.delay);

            self.probed.lock().unwrap().push(port);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            ProbeOutcome::NotOpen(port)
        }
    }

    /// Lower ports finish last.
    #[derive(Debug)]
    struct SlowLowPorts;

    impl Executor for SlowLowPorts {
        fn scan(&self, _: &str, port: u16) -> ProbeOutcome {
            thread::sleep(Duration::from_millis(u64::from(110 - port) * 2));
            ProbeOutcome::Open(port)
        }
    }

    fn config(start: u16, end: u16, concurrency: usize) -> ScanConfig {
        ScanConfig::new("127.0.0.1", start, end, concurrency).unwrap()
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        assert!(matches!(
            ScanConfig::new("127.0.0.1", 1, 1024, 0),
            Err(ScanError::InvalidConcurrency(0))
        ));
    }

    #[test]
    fn port_zero_is_rejected() {
        assert!(matches!(
            ScanConfig::new("127.0.0.1", 0, 10, 1),
            Err(ScanError::InvalidPort(0))
        ));
        assert!(matches!(
            ScanConfig::new("127.0.0.1", 10, 0, 1),
            Err(ScanError::InvalidPort(0))
        ));
    }

    #[test]
    fn config_defaults_to_one_second_timeout() {
        let config = config(1, 1024, 100);
        assert_eq!(config.timeout(), Duration::from_secs(1));
        assert_eq!(config.len(), 1024);

        let config = config.with_timeout(Duration::from_millis(200));
        assert_eq!(config.timeout(), Duration::from_millis(200));
    }

    #[test]
    fn reports_only_open_ports_in_range() {
        let executor = Listening(vec![7989, 8000, 8011]);
        let result = Scanner::with_executor(config(7990, 8010, 10), executor)
            .start()
            .unwrap();

        assert_eq!(result.ports, vec![8000]);
    }

    #[test]
    fn single_port_range() {
        let result = Scanner::with_executor(config(8000, 8000, 10), Listening(vec![8000]))
            .start()
            .unwrap();

        assert_eq!(result.ports, vec![8000]);
    }

    #[test]
    fn inverted_range_is_empty_and_probes_nothing() {
        let scanner = Scanner::with_executor(config(9005, 9000, 4), Tracked::default());
        let result = scanner.start().unwrap();

        assert!(result.is_empty());
        assert!(scanner.executor.probed.lock().unwrap().is_empty());
    }

    #[test]
    fn every_port_is_probed_exactly_once() {
        let scanner = Scanner::with_executor(config(1, 200, 16), Tracked::default());
        scanner.start().unwrap();

        let mut probed = scanner.executor.probed.lock().unwrap().clone();
        probed.sort_unstable();
        assert_eq!(probed, (1..=200).collect::<Vec<_>>());
    }

    #[test]
    fn in_flight_probes_never_exceed_concurrency() {
        let scanner = Scanner::with_executor(
            config(1, 40, 4),
            Tracked::new(Duration::from_millis(10)),
        );
        scanner.start().unwrap();

        let peak = scanner.executor.peak.load(Ordering::SeqCst);
        assert!(peak <= 4, "peak in flight was {}", peak);
        assert_eq!(scanner.executor.probed.lock().unwrap().len(), 40);
    }

    #[test]
    fn single_worker_serializes_probes() {
        let delay = Duration::from_millis(10);
        let scanner = Scanner::with_executor(config(1, 10, 1), Tracked::new(delay));
        let result = scanner.start().unwrap();

        assert_eq!(scanner.executor.peak.load(Ordering::SeqCst), 1);
        assert!(result.elapsed >= delay * 10);
    }

    #[test]
    fn result_is_ascending_regardless_of_completion_order() {
        let result = Scanner::with_executor(config(100, 109, 10), SlowLowPorts)
            .start()
            .unwrap();

        assert_eq!(result.ports, (100..=109).collect::<Vec<_>>());
    }

    #[test]
    fn outcome_accessors() {
        assert_eq!(ProbeOutcome::Open(22).port(), 22);
        assert_eq!(ProbeOutcome::NotOpen(23).port(), 23);
        assert!(ProbeOutcome::Open(22).is_open());
        assert!(!ProbeOutcome::NotOpen(23).is_open());
    }
}
