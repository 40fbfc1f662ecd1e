//! Bounded concurrency for acquisitions
//!
//! The gate only counts: each admitted unit runs a whole pipeline and
//! returns its own structured result. Callers beyond the bound wait for a
//! permit; there is no ordering across requests.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::error::{Error, Result};

/// Semaphore-backed bound on in-flight acquisitions
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    permits: Arc<Semaphore>,
    limit: usize,
}

impl ConcurrencyGate {
    /// Gate admitting at most `limit` units at once (at least one)
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            permits: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// Configured bound
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Permits not currently held
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `unit` once a permit is free
    ///
    /// # Errors
    ///
    /// [`Error::ShuttingDown`] when the gate was closed before a permit was
    /// granted; `unit` is not polled in that case.
    pub async fn run<F, T>(&self, unit: F) -> Result<T>
    where
        F: Future<Output = T>,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| Error::ShuttingDown)?;
        Ok(unit.await)
    }

    /// Run every unit through the gate; results keep input order
    pub async fn run_all<I, F, T>(&self, units: I) -> Vec<Result<T>>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = T>,
    {
        join_all(units.into_iter().map(|unit| self.run(unit))).await
    }

    /// Stop admitting new units; units already running finish normally
    pub fn close(&self) {
        self.permits.close();
    }
}
