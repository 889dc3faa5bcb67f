//! Concurrency limiter for file I/O.
//!
//! Copying a large tileset spawns one task per asset. Without a ceiling the
//! process would open every file at once and run out of file descriptors, so
//! each task holds a permit from this limiter for the duration of its copy.
//!
//! ```ignore
//! use std::sync::Arc;
//! use tilecombine::limiter::ConcurrencyLimiter;
//!
//! let limiter = Arc::new(ConcurrencyLimiter::new(1024, "asset_copy"));
//! let permit = limiter.acquire().await?;
//! tokio::spawn(async move {
//!     let _permit = permit;
//!     // copy happens here, permit released on drop
//! });
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{CombineError, CombineResult};

/// Semaphore-backed limit on concurrent operations.
#[derive(Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,

    max_permits: usize,

    /// Current number of in-flight operations.
    /// Uses Arc so permits are 'static and can move into spawned tasks.
    in_flight: Arc<AtomicUsize>,

    /// Peak concurrent operations observed.
    peak_in_flight: AtomicUsize,

    label: String,
}

impl ConcurrencyLimiter {
    /// Creates a limiter allowing `max_concurrent` operations at once.
    ///
    /// A `max_concurrent` of zero is raised to one.
    pub fn new(max_concurrent: usize, label: impl Into<String>) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_permits: max_concurrent,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: AtomicUsize::new(0),
            label: label.into(),
        }
    }

    /// Waits for a permit. The permit is released when dropped.
    pub async fn acquire(&self) -> CombineResult<ConcurrencyPermit> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| CombineError::Task(format!("{} limiter closed", self.label)))?;

        let current = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.update_peak(current);

        Ok(ConcurrencyPermit {
            _permit: permit,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    fn update_peak(&self, current: usize) {
        let mut peak = self.peak_in_flight.load(Ordering::Relaxed);
        while current > peak {
            match self.peak_in_flight.compare_exchange_weak(
                peak,
                current,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(p) => peak = p,
            }
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_permits
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Highest number of simultaneous permits seen so far.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Relaxed)
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// A held slot in a [`ConcurrencyLimiter`].
#[derive(Debug)]
pub struct ConcurrencyPermit {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl Drop for ConcurrencyPermit {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}
