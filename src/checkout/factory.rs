use std::sync::Arc;

use crate::catalog::domain::CatalogService;
use crate::checkout::domain::LendingService;
use crate::checkout::domain::service::LendingServiceImpl;
use crate::checkout::repository::CheckoutRepository;
use crate::checkout::repository::memory_checkout_repository::MemoryCheckoutRepository;
use crate::core::domain::{CirculationLock, Configuration};
use crate::core::repository::RepositoryStore;
use crate::gateway::events::EventPublisher;
use crate::hold::domain::HoldService;
use crate::patrons::domain::PatronService;

pub fn create_checkout_repository(store: RepositoryStore) -> Arc<dyn CheckoutRepository> {
    match store {
        RepositoryStore::Memory => {
            Arc::new(MemoryCheckoutRepository::new())
        }
    }
}

pub fn create_lending_service(config: &Configuration, checkout_repository: Arc<dyn CheckoutRepository>,
                              patron_service: Arc<dyn PatronService>, catalog_service: Arc<dyn CatalogService>,
                              hold_service: Arc<dyn HoldService>, events_publisher: Arc<dyn EventPublisher>,
                              lock: CirculationLock) -> Arc<dyn LendingService> {
    Arc::new(LendingServiceImpl::new(config, checkout_repository, patron_service,
                                     catalog_service, hold_service, events_publisher, lock))
}
