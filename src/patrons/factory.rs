use std::sync::Arc;

use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::patrons::domain::PatronService;
use crate::patrons::domain::service::PatronServiceImpl;
use crate::patrons::repository::PatronRepository;
use crate::patrons::repository::memory_patron_repository::MemoryPatronRepository;

pub fn create_patron_repository(store: RepositoryStore) -> Arc<dyn PatronRepository> {
    match store {
        RepositoryStore::Memory => {
            Arc::new(MemoryPatronRepository::new())
        }
    }
}

pub fn create_patron_service(config: &Configuration,
                             patron_repository: Arc<dyn PatronRepository>) -> Arc<dyn PatronService> {
    Arc::new(PatronServiceImpl::new(config, patron_repository))
}
