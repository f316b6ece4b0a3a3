//! Post-collection delay used as a simple cross-request rate limit.

use std::future::Future;
use std::time::Duration;

/// A fixed pause applied once after each collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostCollectionDelay {
    duration: Duration,
}

impl PostCollectionDelay {
    /// Create a delay of `duration`.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// A delay that does not pause at all.
    pub fn none() -> Self {
        Self::new(Duration::ZERO)
    }

    /// The configured pause length.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Run `operation` to completion, then pause, then hand back its output.
    ///
    /// The pause happens whatever the operation produced, including an
    /// empty or failed result. It only follows normal completion: if
    /// `operation` panics, the panic unwinds straight through and no pause
    /// is taken.
    pub async fn around<F, T>(&self, operation: F) -> T
    where
        F: Future<Output = T>,
    {
        let output = operation.await;
        if !self.duration.is_zero() {
            tracing::trace!(delay_ms = self.duration.as_millis() as u64, "post-collection delay");
            tokio::time::sleep(self.duration).await;
        }
        output
    }
}

impl Default for PostCollectionDelay {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
