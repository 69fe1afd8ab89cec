pub mod memory_patron_repository;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;
use crate::patrons::domain::model::PatronEntity;

#[async_trait]
pub trait PatronRepository: Repository<PatronEntity> {
    // snapshot of every patron in registration order
    async fn find_all(&self) -> LibraryResult<Vec<PatronEntity>>;
}
