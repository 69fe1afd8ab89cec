use std::sync::Arc;

use crate::books::repository::BookRepository;
use crate::books::repository::memory_book_repository::MemoryBookRepository;
use crate::core::repository::RepositoryStore;

// Repositories are the shared state of the system, so they are built once
// and handed to every service as an Arc.
pub fn create_book_repository(store: RepositoryStore) -> Arc<dyn BookRepository> {
    match store {
        RepositoryStore::Memory => {
            Arc::new(MemoryBookRepository::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::books::domain::model::BookEntity;
    use crate::books::factory::create_book_repository;
    use crate::core::repository::{Repository, RepositoryStore};

    #[tokio::test]
    async fn test_should_create_book_repository() {
        let repo = create_book_repository(RepositoryStore::Memory);
        let _ = repo.create(&BookEntity::new("isbn1", "title", "author", 2020)).await.expect("should create book");
        let loaded = repo.get("isbn1").await.expect("should return book");
        assert_eq!("isbn1", loaded.isbn.as_str());
    }
}
