use crate::error::{AppError, AppResult};
use sea_orm::DatabaseConnection;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Process-wide handle to the notification store.
///
/// Wraps the shared sea-orm pool with a per-session lease count so every
/// open stream holds exactly one lease and the number of concurrent streams
/// is bounded.
#[derive(Clone)]
pub struct StorePool {
    db: Arc<DatabaseConnection>,
    permits: Arc<Semaphore>,
    active: Arc<AtomicUsize>,
    capacity: usize,
}

impl StorePool {
    pub fn new(db: Arc<DatabaseConnection>, max_sessions: usize) -> Self {
        let capacity = max_sessions.max(1);
        Self {
            db,
            permits: Arc::new(Semaphore::new(capacity)),
            active: Arc::new(AtomicUsize::new(0)),
            capacity,
        }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    /// Take a session lease. Fails fast instead of queueing when all leases
    /// are out.
    pub fn lease(&self) -> AppResult<StoreLease> {
        let permit = self
            .permits
            .clone()
            .try_acquire_owned()
            .map_err(|_| AppError::TooManySessions)?;
        self.active.fetch_add(1, Ordering::SeqCst);

        Ok(StoreLease {
            db: self.db.clone(),
            permit: Some(permit),
            active: self.active.clone(),
        })
    }

    pub fn active_leases(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A session-scoped share of the store. Released on [`StoreLease::release`]
/// or on drop, whichever comes first.
pub struct StoreLease {
    db: Arc<DatabaseConnection>,
    permit: Option<OwnedSemaphorePermit>,
    active: Arc<AtomicUsize>,
}

impl StoreLease {
    /// Shared handle for the services working under this lease.
    pub fn connection(&self) -> &Arc<DatabaseConnection> {
        &self.db
    }

    pub fn is_released(&self) -> bool {
        self.permit.is_none()
    }

    /// Returns `true` only for the call that actually gave the lease back.
    pub fn release(&mut self) -> bool {
        match self.permit.take() {
            Some(permit) => {
                self.active.fetch_sub(1, Ordering::SeqCst);
                drop(permit);
                true
            }
            None => false,
        }
    }
}

impl Drop for StoreLease {
    fn drop(&mut self) {
        self.release();
    }
}
