use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

// Identifiable defines common traits that can be shared by stored objects
pub trait Identifiable: Sync + Send {
    fn id(&self) -> String;
    fn version(&self) -> i64;
}

// Configuration abstracts config options for the circulation system
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub loan_days: i64,
}

impl Configuration {
    pub fn new() -> Self {
        Configuration {
            loan_days: 14,
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration::new()
    }
}

// CirculationLock serializes every read-modify-write transition on the
// shared circulation state. Checkout, return, reserve and cancel take the
// exclusive guard for their whole sequence; snapshot readers take the
// shared guard so they observe either the pre- or post-state of a
// transition, never an intermediate one.
#[derive(Debug, Clone, Default)]
pub struct CirculationLock {
    inner: Arc<RwLock<()>>,
}

impl CirculationLock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(())),
        }
    }

    pub async fn exclusive(&self) -> RwLockWriteGuard<'_, ()> {
        self.inner.write().await
    }

    pub async fn shared(&self) -> RwLockReadGuard<'_, ()> {
        self.inner.read().await
    }
}
