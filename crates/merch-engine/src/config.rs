//! Engine configuration.

use std::time::Duration;

/// Default deadline for a single transfer or purchase.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings shared by both engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Upper bound on one unit of work, including the wait for the wallet
    /// lock. Past it the unit is dropped (rolled back).
    pub operation_timeout: Duration,
}

impl EngineConfig {
    /// Sets the per-operation deadline.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}
