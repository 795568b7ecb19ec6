use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("port `{0}` is invalid (must be between 1 and 65535)")]
    InvalidPort(u16),
    #[error("concurrency must be at least 1, got `{0}`")]
    InvalidConcurrency(usize),
    #[error("failed to check target kind (ensure it's a domain or an IP address)")]
    HostParseFailed(#[source] url::ParseError),
    #[error("failed to resolve the given target: {0}")]
    ResolverFailed(#[source] std::io::Error),
    #[error("resolver didn't find any address mapped by `{0}`")]
    DomainLookupFailed(String),
    #[error("failed to start worker pool: {0}")]
    PoolBuildFailed(#[source] rayon::ThreadPoolBuildError),
}
