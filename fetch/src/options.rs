//! Options for one detail-fetch batch.

use std::num::NonZeroUsize;
use std::time::Duration;

use crate::error::OptionsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Per-item budget, measured from the moment the item is dispatched.
    pub timeout: Duration,
    /// Maximum in-flight requests. `None` dispatches the whole batch at once.
    pub concurrency: Option<NonZeroUsize>,
    /// JSON pointer to the record's display attribute.
    pub display_pointer: String,
}

impl FetchOptions {
    pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

    pub const DEFAULT_DISPLAY_POINTER: &'static str = "/sprites/front_default";

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Result<Self, OptionsError> {
        if timeout_ms == 0 {
            return Err(OptionsError::ZeroTimeout);
        }
        self.timeout = Duration::from_millis(timeout_ms);
        Ok(self)
    }

    /// Cap in-flight requests. Zero means no cap.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = NonZeroUsize::new(limit);
        self
    }

    pub fn with_display_pointer(mut self, pointer: impl Into<String>) -> Result<Self, OptionsError> {
        let pointer = pointer.into();
        if !pointer.is_empty() && !pointer.starts_with('/') {
            return Err(OptionsError::InvalidPointer(pointer));
        }
        self.display_pointer = pointer;
        Ok(self)
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(Self::DEFAULT_TIMEOUT_MS),
            concurrency: None,
            display_pointer: Self::DEFAULT_DISPLAY_POINTER.to_string(),
        }
    }
}
