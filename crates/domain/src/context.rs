//! Per-request context passed into every service call.

use common::CorrelationId;

/// Context of the request driving a service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestContext {
    /// Stamped on every event the call publishes.
    pub correlation_id: CorrelationId,
}

impl RequestContext {
    /// Creates a context with a fresh correlation id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context carrying an existing correlation id.
    pub fn with_correlation_id(correlation_id: CorrelationId) -> Self {
        Self { correlation_id }
    }
}
