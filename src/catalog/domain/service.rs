use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::books::domain::model::BookEntity;
use crate::books::dto::BookDto;
use crate::books::repository::BookRepository;
use crate::catalog::domain::CatalogService;
use crate::core::domain::Configuration;
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryError, LibraryResult};
use crate::gateway::events::EventPublisher;

pub struct CatalogServiceImpl {
    book_repository: Arc<dyn BookRepository>,
    events_publisher: Arc<dyn EventPublisher>,
}

impl CatalogServiceImpl {
    pub fn new(_config: &Configuration, book_repository: Arc<dyn BookRepository>,
               events_publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            book_repository,
            events_publisher,
        }
    }

    async fn filter_by_availability(&self, available: bool) -> LibraryResult<Vec<BookDto>> {
        let res = self.book_repository.query(
            &HashMap::from([("available".to_string(), available.to_string())]), None, 500).await?;
        Ok(res.records.iter().map(BookDto::from).collect())
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn add_book(&self, book: &BookDto) -> LibraryResult<BookDto> {
        if book.isbn.trim().is_empty() {
            return Err(LibraryError::validation("book isbn cannot be blank", Some("blank_id".to_string())));
        }
        let _ = self.book_repository.create(&BookEntity::from(book)).await.map(|_| ())?;
        let _ = self.events_publisher.publish(&DomainEvent::added(
            "book_added", book.isbn.as_str(), &HashMap::new(), book)?).await?;
        info!("book added {}", book.isbn);
        Ok(book.clone())
    }

    async fn remove_book(&self, id: &str) -> LibraryResult<BookDto> {
        let removed = self.book_repository.get(id).await.map(|b| BookDto::from(&b))?;
        let _ = self.book_repository.delete(id).await.map(|_| ())?;
        let _ = self.events_publisher.publish(&DomainEvent::deleted(
            "book_removed", id, &HashMap::new(), &removed)?).await?;
        info!("book removed {}", id);
        Ok(removed)
    }

    async fn update_book(&self, book: &BookDto) -> LibraryResult<BookDto> {
        let _ = self.book_repository.update(&BookEntity::from(book)).await.map(|_| ())?;
        let _ = self.events_publisher.publish(&DomainEvent::updated(
            "book_updated", book.isbn.as_str(), &HashMap::new(), book)?).await?;
        Ok(book.clone())
    }

    async fn find_book_by_id(&self, id: &str) -> LibraryResult<BookDto> {
        self.book_repository.get(id).await.map(|b| BookDto::from(&b))
    }

    async fn list_books(&self) -> LibraryResult<Vec<BookDto>> {
        let res = self.book_repository.find_all().await?;
        Ok(res.iter().map(BookDto::from).collect())
    }

    async fn available_books(&self) -> LibraryResult<Vec<BookDto>> {
        self.filter_by_availability(true).await
    }

    async fn checked_out_books(&self) -> LibraryResult<Vec<BookDto>> {
        self.filter_by_availability(false).await
    }
}

impl From<&BookEntity> for BookDto {
    fn from(other: &BookEntity) -> Self {
        Self {
            isbn: other.isbn.to_string(),
            version: other.version,
            title: other.title.to_string(),
            author: other.author.to_string(),
            publication_year: other.publication_year,
            available: other.available,
            times_borrowed: other.times_borrowed,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&BookDto> for BookEntity {
    fn from(other: &BookDto) -> Self {
        Self {
            isbn: other.isbn.to_string(),
            version: other.version,
            title: other.title.to_string(),
            author: other.author.to_string(),
            publication_year: other.publication_year,
            available: other.available,
            times_borrowed: other.times_borrowed,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::books::dto::BookDto;
    use crate::books::repository::memory_book_repository::MemoryBookRepository;
    use crate::catalog::domain::CatalogService;
    use crate::catalog::domain::service::CatalogServiceImpl;
    use crate::core::domain::Configuration;
    use crate::core::library::LibraryError;
    use crate::gateway::memory::publisher::MemoryPublisher;

    fn build_service() -> CatalogServiceImpl {
        CatalogServiceImpl::new(&Configuration::new(),
                                Arc::new(MemoryBookRepository::new()),
                                Arc::new(MemoryPublisher::new()))
    }

    #[tokio::test]
    async fn test_should_add_book() {
        let catalog_svc = build_service();

        let book = BookDto::new("isbn1", "test book", "author", 2020);
        let _ = catalog_svc.add_book(&book).await.expect("should add book");

        let loaded = catalog_svc.find_book_by_id("isbn1").await.expect("should return book");
        assert_eq!(book.isbn, loaded.isbn);
        assert!(loaded.available);
    }

    #[tokio::test]
    async fn test_should_reject_blank_isbn() {
        let catalog_svc = build_service();

        let book = BookDto::new("   ", "test book", "author", 2020);
        let res = catalog_svc.add_book(&book).await;
        assert!(matches!(res, Err(LibraryError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_isbn() {
        let catalog_svc = build_service();

        let book = BookDto::new("isbn1", "test book", "author", 2020);
        let _ = catalog_svc.add_book(&book).await.expect("should add book");
        let res = catalog_svc.add_book(&book).await;
        assert!(matches!(res, Err(LibraryError::DuplicateKey { .. })));
    }

    #[tokio::test]
    async fn test_should_update_book() {
        let catalog_svc = build_service();

        let mut book = BookDto::new("isbn1", "test book", "author", 2020);
        let _ = catalog_svc.add_book(&book).await.expect("should add book");

        book.title = "new title".to_string();
        let _ = catalog_svc.update_book(&book).await.expect("should update book");

        let loaded = catalog_svc.find_book_by_id("isbn1").await.expect("should return book");
        assert_eq!(book.title, loaded.title);
    }

    #[tokio::test]
    async fn test_should_reject_update_for_unknown_book() {
        let catalog_svc = build_service();

        let book = BookDto::new("missing", "test book", "author", 2020);
        let res = catalog_svc.update_book(&book).await;
        assert!(matches!(res, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_remove_book() {
        let catalog_svc = build_service();

        let book = BookDto::new("isbn1", "test book", "author", 2020);
        let _ = catalog_svc.add_book(&book).await.expect("should add book");

        let removed = catalog_svc.remove_book("isbn1").await.expect("should remove book");
        assert_eq!("isbn1", removed.isbn.as_str());

        let loaded = catalog_svc.find_book_by_id("isbn1").await;
        assert!(loaded.is_err());
        let missing = catalog_svc.remove_book("isbn1").await;
        assert!(matches!(missing, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_list_books_as_snapshot() {
        let catalog_svc = build_service();

        let _ = catalog_svc.add_book(&BookDto::new("isbn1", "one", "author", 2020)).await.expect("should add book");
        let _ = catalog_svc.add_book(&BookDto::new("isbn2", "two", "author", 2021)).await.expect("should add book");

        let mut listed = catalog_svc.list_books().await.expect("should list books");
        assert_eq!(2, listed.len());

        // mutating the snapshot must not leak back into the catalog
        listed[0].title = "mutated".to_string();
        let reloaded = catalog_svc.find_book_by_id("isbn1").await.expect("should return book");
        assert_eq!("one", reloaded.title.as_str());
    }

    #[tokio::test]
    async fn test_should_split_inventory_by_availability() {
        let catalog_svc = build_service();

        let _ = catalog_svc.add_book(&BookDto::new("isbn1", "one", "author", 2020)).await.expect("should add book");
        let mut held = BookDto::new("isbn2", "two", "author", 2021);
        held.available = false;
        let _ = catalog_svc.add_book(&held).await.expect("should add book");

        let available = catalog_svc.available_books().await.expect("should list available");
        assert_eq!(1, available.len());
        assert_eq!("isbn1", available[0].isbn.as_str());

        let checked_out = catalog_svc.checked_out_books().await.expect("should list checked out");
        assert_eq!(1, checked_out.len());
        assert_eq!("isbn2", checked_out[0].isbn.as_str());
    }
}
