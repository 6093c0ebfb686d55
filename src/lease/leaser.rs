use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use super::error::LeaseError;
use crate::{collections::SafeMap, config::Config};

/// Grants and renews time-bounded exclusive leases per identifier.
pub trait Leaser: Send + Sync {
    /// Grants a lease for `id` and returns its expiry.
    ///
    /// Fails with [`LeaseError::Held`] while an unexpired lease exists.
    fn get_lease(&self, id: &str) -> Result<Instant, LeaseError>;

    /// Extends the lease for `id` if `alleged` equals the stored expiry exactly.
    ///
    /// On any mismatch nothing is mutated.
    fn reset_lease(&self, id: &str, alleged: Instant) -> Result<Instant, LeaseError>;
}

/// Builder for [`InMemoryLeaser`].
///
/// # Example
/// ```
/// use std::time::Duration;
/// use slotvisor::{Leaser, LeaserBuilder};
///
/// let leaser = LeaserBuilder::new().lease_duration(Duration::from_secs(10)).build();
/// let expiry = leaser.get_lease("job-42").unwrap();
/// assert!(leaser.get_lease("job-42").is_err());
/// assert!(leaser.reset_lease("job-42", expiry).is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct LeaserBuilder {
    lease_duration: Duration,
}

impl LeaserBuilder {
    /// Starts from the default lease duration of [`Config`].
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self {
            lease_duration: cfg.lease_duration,
        }
    }

    pub fn lease_duration(mut self, d: Duration) -> Self {
        self.lease_duration = d;
        self
    }

    pub fn build(self) -> InMemoryLeaser {
        InMemoryLeaser {
            store: SafeMap::new(),
            lease_duration: self.lease_duration,
            lock: Mutex::new(()),
        }
    }
}

impl Default for LeaserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// [`Leaser`] backed by a [`SafeMap`] of expiries.
///
/// The map serializes single reads and writes; the outer `lock` makes each
/// read-then-write sequence atomic.
#[derive(Debug)]
pub struct InMemoryLeaser {
    store: SafeMap<String, Instant>,
    lease_duration: Duration,
    lock: Mutex<()>,
}

impl InMemoryLeaser {
    pub fn lease_duration(&self) -> Duration {
        self.lease_duration
    }
}

impl Leaser for InMemoryLeaser {
    fn get_lease(&self, id: &str) -> Result<Instant, LeaseError> {
        let _guard = self.lock.lock();
        let now = Instant::now();

        if let Some(expiry) = self.store.get(id) {
            if now < expiry {
                return Err(LeaseError::Held {
                    id: id.to_string(),
                    remaining: expiry - now,
                });
            }
        }
        let (_, expiry) = self.store.set(id.to_string(), now + self.lease_duration);
        Ok(expiry)
    }

    fn reset_lease(&self, id: &str, alleged: Instant) -> Result<Instant, LeaseError> {
        let _guard = self.lock.lock();

        match self.store.get(id) {
            None => Err(LeaseError::Unknown { id: id.to_string() }),
            Some(stored) if stored != alleged => Err(LeaseError::Mismatch { id: id.to_string() }),
            Some(_) => {
                let (_, expiry) = self
                    .store
                    .set(id.to_string(), Instant::now() + self.lease_duration);
                Ok(expiry)
            }
        }
    }
}
