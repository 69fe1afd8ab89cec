pub mod memory_book_repository;

use async_trait::async_trait;
use crate::books::domain::model::BookEntity;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;

#[async_trait]
pub trait BookRepository: Repository<BookEntity> {
    // snapshot of every book in catalog insertion order
    async fn find_all(&self) -> LibraryResult<Vec<BookEntity>>;

    async fn find_by_author(&self, author: &str,
                            page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>>;
}
