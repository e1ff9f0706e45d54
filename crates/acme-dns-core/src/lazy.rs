//! Deferred zone construction
//!
//! Runs that never mutate DNS (validation-only invocations, early failures
//! in the ACME driver) must not pay for credential exchange or client
//! construction. [`LazyDnsZone`] holds a [`ZoneInitializer`] and only calls
//! it on the first zone operation.
//!
//! ## State
//!
//! ```text
//! Uninitialized ──first call──┬──► Ready(zone)
//!                             └──► Failed(error)
//! ```
//!
//! Both outcomes are final for the lifetime of the wrapper. A failed
//! initialization is not retried; every later call gets the cached error.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::challenge::Order;
use crate::error::{Error, Result};
use crate::traits::{DnsZone, ReconcileReport, ZoneInitializer};

enum LazyState {
    Uninitialized,
    Ready(Arc<dyn DnsZone>),
    Failed(Arc<Error>),
}

/// DNS zone built on first use
///
/// Constructing the wrapper performs no I/O and cannot fail.
pub struct LazyDnsZone {
    provider: &'static str,
    initializer: Box<dyn ZoneInitializer>,
    state: Mutex<LazyState>,
}

impl LazyDnsZone {
    /// Wrap an initializer
    ///
    /// # Parameters
    ///
    /// - `provider`: Provider name reported before initialization
    /// - `initializer`: Builds the real zone on first use
    pub fn new(provider: &'static str, initializer: Box<dyn ZoneInitializer>) -> Self {
        Self {
            provider,
            initializer,
            state: Mutex::new(LazyState::Uninitialized),
        }
    }

    /// Whether initialization has run (successfully or not)
    pub async fn is_initialized(&self) -> bool {
        !matches!(*self.state.lock().await, LazyState::Uninitialized)
    }

    /// Get the zone, initializing it on first use
    ///
    /// The lock is held across initialization so concurrent first callers
    /// wait for the single attempt instead of starting their own.
    async fn zone(&self) -> Result<Arc<dyn DnsZone>> {
        let mut state = self.state.lock().await;

        match &*state {
            LazyState::Ready(zone) => return Ok(Arc::clone(zone)),
            LazyState::Failed(error) => return Err(Error::Initialization(Arc::clone(error))),
            LazyState::Uninitialized => {}
        }

        debug!(provider = self.provider, "Initializing DNS zone client");

        match self.initializer.initialize().await {
            Ok(zone) => {
                let zone: Arc<dyn DnsZone> = Arc::from(zone);
                *state = LazyState::Ready(Arc::clone(&zone));
                Ok(zone)
            }
            Err(e) => {
                let error = Arc::new(e);
                *state = LazyState::Failed(Arc::clone(&error));
                Err(Error::Initialization(error))
            }
        }
    }
}

impl fmt::Debug for LazyDnsZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state.try_lock() {
            Ok(guard) => match *guard {
                LazyState::Uninitialized => "uninitialized",
                LazyState::Ready(_) => "ready",
                LazyState::Failed(_) => "failed",
            },
            Err(_) => "busy",
        };

        f.debug_struct("LazyDnsZone")
            .field("provider", &self.provider)
            .field("state", &state)
            .finish()
    }
}

#[async_trait]
impl DnsZone for LazyDnsZone {
    async fn set_challenge_records(&self, order: &mut Order) -> Result<ReconcileReport> {
        self.zone().await?.set_challenge_records(order).await
    }

    async fn remove_challenge_records(&self, order: &mut Order) -> Result<ReconcileReport> {
        self.zone().await?.remove_challenge_records(order).await
    }

    fn provider_name(&self) -> &'static str {
        self.provider
    }
}
