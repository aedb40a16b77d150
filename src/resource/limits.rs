//! Per-call batch ceilings.

use crate::error::ValidationError;

/// Default per-call item ceiling.
pub const DEFAULT_BATCH_LIMIT: usize = 1000;

/// Maximum items per call, per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub create: usize,
    pub update: usize,
    pub upsert: usize,
    pub delete: usize,
    pub retrieve: usize,
}

impl BatchLimits {
    /// The same ceiling for every operation.
    pub fn uniform(max: usize) -> Self {
        Self {
            create: max,
            update: max,
            upsert: max,
            delete: max,
            retrieve: max,
        }
    }

    /// Fails on the first operation whose ceiling is zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let ceilings = [
            ("create", self.create),
            ("update", self.update),
            ("upsert", self.upsert),
            ("delete", self.delete),
            ("retrieve", self.retrieve),
        ];
        match ceilings.into_iter().find(|(_, max)| *max == 0) {
            Some((operation, _)) => Err(ValidationError::ZeroLimit { operation }),
            None => Ok(()),
        }
    }
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self::uniform(DEFAULT_BATCH_LIMIT)
    }
}

/// Reject empty batches and batches above `max`.
pub fn validate_batch(operation: &'static str, len: usize, max: usize) -> Result<(), ValidationError> {
    if len == 0 {
        return Err(ValidationError::EmptyBatch { operation });
    }
    if len > max {
        return Err(ValidationError::BatchTooLarge { operation, len, max });
    }
    Ok(())
}
