use std::sync::Arc;

use crate::books::factory::create_book_repository;
use crate::catalog::domain::CatalogService;
use crate::catalog::factory::create_catalog_service;
use crate::checkout::domain::LendingService;
use crate::checkout::factory::{create_checkout_repository, create_lending_service};
use crate::core::domain::{CirculationLock, Configuration};
use crate::core::repository::RepositoryStore;
use crate::hold::domain::HoldService;
use crate::hold::factory::{create_hold_repository, create_hold_service};
use crate::gateway::factory::create_publisher;
use crate::patrons::domain::PatronService;
use crate::patrons::factory::{create_patron_repository, create_patron_service};
use crate::search::domain::SearchService;
use crate::search::factory::create_search_service;

// LibrarySystem is the in-process API surface: one wired object graph of
// services sharing the same repositories, publisher and circulation lock.
pub struct LibrarySystem {
    pub catalog_service: Arc<dyn CatalogService>,
    pub patron_service: Arc<dyn PatronService>,
    pub lending_service: Arc<dyn LendingService>,
    pub hold_service: Arc<dyn HoldService>,
    pub search_service: Arc<dyn SearchService>,
}

pub fn create_library_system(config: &Configuration, store: RepositoryStore) -> LibrarySystem {
    let book_repository = create_book_repository(store);
    let patron_repository = create_patron_repository(store);
    let checkout_repository = create_checkout_repository(store);
    let hold_repository = create_hold_repository(store);
    let events_publisher = create_publisher(store.gateway_publisher());
    let lock = CirculationLock::new();

    let catalog_service = create_catalog_service(config, book_repository.clone(), events_publisher.clone());
    let patron_service = create_patron_service(config, patron_repository);
    let hold_service = create_hold_service(config, hold_repository, patron_service.clone(),
                                           catalog_service.clone(), events_publisher.clone(), lock.clone());
    let lending_service = create_lending_service(config, checkout_repository, patron_service.clone(),
                                                 catalog_service.clone(), hold_service.clone(),
                                                 events_publisher, lock.clone());
    let search_service = create_search_service(book_repository, patron_service.clone(), lock);

    LibrarySystem {
        catalog_service,
        patron_service,
        lending_service,
        hold_service,
        search_service,
    }
}
