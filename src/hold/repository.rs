pub mod memory_hold_repository;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;
use crate::hold::domain::model::HoldEntity;

#[async_trait]
pub trait HoldRepository: Repository<HoldEntity> {
    // open (OnHold) entries for a book in queue order; this IS the FIFO
    async fn find_open(&self, isbn: &str) -> LibraryResult<Vec<HoldEntity>>;
}
