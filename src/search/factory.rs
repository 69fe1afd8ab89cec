use std::sync::Arc;

use crate::books::repository::BookRepository;
use crate::core::domain::CirculationLock;
use crate::patrons::domain::PatronService;
use crate::search::domain::SearchService;
use crate::search::domain::service::SearchServiceImpl;

pub fn create_search_service(book_repository: Arc<dyn BookRepository>,
                             patron_service: Arc<dyn PatronService>,
                             lock: CirculationLock) -> Arc<dyn SearchService> {
    Arc::new(SearchServiceImpl::new(book_repository, patron_service, lock))
}
