use std::sync::Arc;

use crate::catalog::domain::CatalogService;
use crate::core::domain::{CirculationLock, Configuration};
use crate::core::repository::RepositoryStore;
use crate::gateway::events::EventPublisher;
use crate::hold::domain::HoldService;
use crate::hold::domain::service::HoldServiceImpl;
use crate::hold::repository::HoldRepository;
use crate::hold::repository::memory_hold_repository::MemoryHoldRepository;
use crate::patrons::domain::PatronService;

pub fn create_hold_repository(store: RepositoryStore) -> Arc<dyn HoldRepository> {
    match store {
        RepositoryStore::Memory => {
            Arc::new(MemoryHoldRepository::new())
        }
    }
}

pub fn create_hold_service(config: &Configuration, hold_repository: Arc<dyn HoldRepository>,
                           patron_service: Arc<dyn PatronService>, catalog_service: Arc<dyn CatalogService>,
                           events_publisher: Arc<dyn EventPublisher>, lock: CirculationLock) -> Arc<dyn HoldService> {
    Arc::new(HoldServiceImpl::new(config, hold_repository, patron_service,
                                  catalog_service, events_publisher, lock))
}
