//! API constants

/// Versioned prefix for every JSON route
pub const API_PREFIX: &str = "/api/v1";

/// Prefix for the static file routes
pub const FILES_PREFIX: &str = "/files";

/// Slack on top of the largest file cap for multipart boundaries and headers
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Upper bound on in-flight requests across the whole router
pub const HTTP_CONCURRENCY_LIMIT: usize = 1024;

pub const RATE_LIMITER_SHARDS: usize = 16;

/// How often expired rate limit buckets are purged
pub const RATE_LIMIT_CLEANUP_INTERVAL_SECS: u64 = 60;

/// Timeout for each health probe
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 2;
