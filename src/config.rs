// SPDX-License-Identifier: Apache-2.0 OR MIT
// Logger configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a producer does when its ring is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackpressurePolicy {
    /// Retry a bounded number of times, then drop the record silently
    /// (counted). Producers never block.
    Drop,
    /// Yield and retry until the record is accepted.
    Block,
}

/// Errors from [`Config::validate`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ring capacity must be a power of two >= 2, got {0}")]
    BadRingCapacity(usize),

    #[error("registry capacity must be a power of two >= 1, got {0}")]
    BadRegistryCapacity(usize),

    #[error("max message length must be >= 2, got {0}")]
    BadMaxMsgLen(usize),

    #[error("batch size must be >= 1, got {0}")]
    BadBatch(usize),

    #[error("enqueue retries must be >= 1, got {0}")]
    BadRetries(usize),
}

/// Runtime configuration of a [`Logger`](crate::Logger).
///
/// The per-record argument capacity ([`MAX_ARGS`](crate::MAX_ARGS)) and
/// the minimum level (`min-level-*` features) are compile-time constants
/// and do not appear here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Power-of-two capacity of each producer's private ring.
    /// Usable capacity is one less.
    pub ring_capacity: usize,
    /// Power-of-two capacity of the format registry. Sized so it can
    /// never fill within a program's call-site count.
    pub registry_capacity: usize,
    /// Emitted lines are truncated to `max_msg_len - 1` bytes plus the
    /// trailing newline.
    pub max_msg_len: usize,
    /// Maximum records drained from one ring per consumer pass.
    pub batch: usize,
    /// Ring-full behavior.
    pub policy: BackpressurePolicy,
    /// Enqueue attempts before a record is dropped (Drop policy only).
    pub enqueue_retries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ring_capacity: 1024,
            registry_capacity: 65536,
            max_msg_len: 256,
            batch: 64,
            policy: BackpressurePolicy::Drop,
            enqueue_retries: 4,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ring_capacity < 2 || !self.ring_capacity.is_power_of_two() {
            return Err(ConfigError::BadRingCapacity(self.ring_capacity));
        }
        if self.registry_capacity == 0 || !self.registry_capacity.is_power_of_two() {
            return Err(ConfigError::BadRegistryCapacity(self.registry_capacity));
        }
        if self.max_msg_len < 2 {
            return Err(ConfigError::BadMaxMsgLen(self.max_msg_len));
        }
        if self.batch == 0 {
            return Err(ConfigError::BadBatch(self.batch));
        }
        if self.enqueue_retries == 0 {
            return Err(ConfigError::BadRetries(self.enqueue_retries));
        }
        Ok(())
    }
}
