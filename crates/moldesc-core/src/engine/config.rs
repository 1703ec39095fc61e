use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("worker_count must be at least 1")]
    InvalidWorkerCount,
}

/// Per-call execution settings for a batch computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeSettings {
    /// Number of concurrent workers the dispatcher may use. A value of 1
    /// yields ordinary sequential execution with identical results.
    pub worker_count: usize,
    /// Optional per-unit time budget. A unit whose computation overruns the
    /// budget is recorded as a `Timeout` failure once it returns; there is
    /// no preemption, so an overrunning worker can never corrupt the cache.
    pub unit_timeout: Option<Duration>,
    /// Whether freshly computed failures are written to the cache so a
    /// deterministic failure is not retried on every call. Timeouts are
    /// never cached regardless of this flag.
    pub cache_failures: bool,
}

impl ComputeSettings {
    /// Settings with the given worker count and defaults for everything else.
    pub fn with_workers(worker_count: usize) -> Result<Self, ConfigError> {
        ComputeSettingsBuilder::new().worker_count(worker_count).build()
    }
}

impl Default for ComputeSettings {
    fn default() -> Self {
        Self {
            worker_count: 1,
            unit_timeout: None,
            cache_failures: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct ComputeSettingsBuilder {
    worker_count: Option<usize>,
    unit_timeout: Option<Duration>,
    cache_failures: Option<bool>,
}

impl ComputeSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn worker_count(mut self, count: usize) -> Self {
        self.worker_count = Some(count);
        self
    }

    pub fn unit_timeout(mut self, timeout: Duration) -> Self {
        self.unit_timeout = Some(timeout);
        self
    }

    pub fn cache_failures(mut self, cache: bool) -> Self {
        self.cache_failures = Some(cache);
        self
    }

    pub fn build(self) -> Result<ComputeSettings, ConfigError> {
        let worker_count = self.worker_count.unwrap_or(1);
        if worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount);
        }
        Ok(ComputeSettings {
            worker_count,
            unit_timeout: self.unit_timeout,
            cache_failures: self.cache_failures.unwrap_or(true),
        })
    }
}
