use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::catalog::domain::CatalogService;
use crate::core::domain::{CirculationLock, Configuration};
use crate::core::events::DomainEvent;
use crate::core::library::{HoldStatus, LibraryError, LibraryResult};
use crate::gateway::events::EventPublisher;
use crate::hold::domain::HoldService;
use crate::hold::domain::model::HoldEntity;
use crate::hold::dto::HoldDto;
use crate::hold::repository::HoldRepository;
use crate::patrons::domain::PatronService;

pub struct HoldServiceImpl {
    hold_repository: Arc<dyn HoldRepository>,
    patron_service: Arc<dyn PatronService>,
    catalog_service: Arc<dyn CatalogService>,
    events_publisher: Arc<dyn EventPublisher>,
    lock: CirculationLock,
}

impl HoldServiceImpl {
    pub fn new(_config: &Configuration, hold_repository: Arc<dyn HoldRepository>,
               patron_service: Arc<dyn PatronService>, catalog_service: Arc<dyn CatalogService>,
               events_publisher: Arc<dyn EventPublisher>, lock: CirculationLock) -> Self {
        Self {
            hold_repository,
            patron_service,
            catalog_service,
            events_publisher,
            lock,
        }
    }

    // Closes one queue entry and clears the reserved flag on the patron.
    // Runs without the lock; every caller is already inside a critical
    // section.
    async fn close_hold(&self, mut hold: HoldEntity, status: HoldStatus) -> LibraryResult<HoldDto> {
        let now = Utc::now().naive_utc();
        hold.hold_status = status;
        match status {
            HoldStatus::Notified => hold.notified_at = Some(now),
            HoldStatus::Canceled => hold.canceled_at = Some(now),
            HoldStatus::OnHold => {}
        }
        self.hold_repository.update(&hold).await?;
        match self.patron_service.find_patron_by_id(hold.patron_id.as_str()).await {
            Ok(mut patron) => {
                patron.cancel_reservation(hold.isbn.as_str());
                self.patron_service.update_patron(&patron).await?;
            }
            // a patron removed while queued leaves nothing to update
            Err(LibraryError::NotFound { .. }) => {
                warn!("patron {} no longer registered while closing hold {}", hold.patron_id, hold.hold_id);
            }
            Err(err) => return Err(err),
        }
        Ok(HoldDto::from(&hold))
    }
}

#[async_trait]
impl HoldService for HoldServiceImpl {
    async fn reserve(&self, patron_id: &str, isbn: &str) -> LibraryResult<HoldDto> {
        let _guard = self.lock.exclusive().await;
        let mut patron = self.patron_service.find_patron_by_id(patron_id).await?;
        let _ = self.catalog_service.find_book_by_id(isbn).await?;
        let open = self.hold_repository.find_open(isbn).await?;
        if let Some(existing) = open.iter().find(|hold| hold.patron_id == patron_id) {
            // soft no-op: a patron appears at most once per queue
            info!("patron {} already in reservation queue for {}", patron_id, isbn);
            return Ok(HoldDto::from(existing));
        }
        let hold = HoldEntity::new(isbn, patron_id);
        self.hold_repository.create(&hold).await?;
        patron.reserve(isbn);
        self.patron_service.update_patron(&patron).await?;
        let hold = HoldDto::from(&hold);
        let _ = self.events_publisher.publish(&DomainEvent::added(
            "book_hold", hold.hold_id.as_str(), &HashMap::new(), &hold.clone())?).await?;
        info!("book reserved {} by patron {}", isbn, patron_id);
        Ok(hold)
    }

    async fn cancel(&self, patron_id: &str, isbn: &str) -> LibraryResult<Option<HoldDto>> {
        let _guard = self.lock.exclusive().await;
        self.remove_waiter(isbn, patron_id).await
    }

    async fn queue_for(&self, isbn: &str) -> LibraryResult<Vec<HoldDto>> {
        let _guard = self.lock.shared().await;
        let open = self.hold_repository.find_open(isbn).await?;
        Ok(open.iter().map(HoldDto::from).collect())
    }

    async fn next_waiter(&self, isbn: &str) -> LibraryResult<Option<String>> {
        let open = self.hold_repository.find_open(isbn).await?;
        match open.into_iter().next() {
            Some(head) => {
                let hold = self.close_hold(head, HoldStatus::Notified).await?;
                let _ = self.events_publisher.publish(&DomainEvent::updated(
                    "book_hold_notified", hold.hold_id.as_str(), &HashMap::new(), &hold.clone())?).await?;
                info!("book {} available for patron {}", isbn, hold.patron_id);
                Ok(Some(hold.patron_id))
            }
            None => Ok(None),
        }
    }

    async fn remove_waiter(&self, isbn: &str, patron_id: &str) -> LibraryResult<Option<HoldDto>> {
        let open = self.hold_repository.find_open(isbn).await?;
        match open.into_iter().find(|hold| hold.patron_id == patron_id) {
            Some(hold) => {
                let hold = self.close_hold(hold, HoldStatus::Canceled).await?;
                let _ = self.events_publisher.publish(&DomainEvent::deleted(
                    "book_hold_cancel", hold.hold_id.as_str(), &HashMap::new(), &hold.clone())?).await?;
                info!("reservation canceled {} for patron {}", isbn, patron_id);
                Ok(Some(hold))
            }
            None => Ok(None),
        }
    }
}

impl From<&HoldEntity> for HoldDto {
    fn from(other: &HoldEntity) -> HoldDto {
        HoldDto {
            hold_id: other.hold_id.to_string(),
            version: other.version,
            isbn: other.isbn.to_string(),
            patron_id: other.patron_id.to_string(),
            hold_status: other.hold_status,
            hold_at: other.hold_at,
            notified_at: other.notified_at,
            canceled_at: other.canceled_at,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&HoldDto> for HoldEntity {
    fn from(other: &HoldDto) -> HoldEntity {
        HoldEntity {
            hold_id: other.hold_id.to_string(),
            version: other.version,
            isbn: other.isbn.to_string(),
            patron_id: other.patron_id.to_string(),
            hold_status: other.hold_status,
            hold_at: other.hold_at,
            notified_at: other.notified_at,
            canceled_at: other.canceled_at,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::books::dto::BookDto;
    use crate::catalog::domain::CatalogService;
    use crate::core::domain::Configuration;
    use crate::core::library::{HoldStatus, LibraryError};
    use crate::core::repository::RepositoryStore;
    use crate::factory::{LibrarySystem, create_library_system};
    use crate::hold::domain::HoldService;
    use crate::patrons::domain::{Patron, PatronService};
    use crate::patrons::dto::PatronDto;

    async fn build_system() -> LibrarySystem {
        let system = create_library_system(&Configuration::new(), RepositoryStore::Memory);
        let _ = system.catalog_service.add_book(&BookDto::new("isbn1", "title", "author", 2020)).await.expect("should add book");
        let _ = system.patron_service.add_patron(&PatronDto::new("p1", "one", "p1@x.cc")).await.expect("should add patron");
        let _ = system.patron_service.add_patron(&PatronDto::new("p2", "two", "p2@x.cc")).await.expect("should add patron");
        let _ = system.patron_service.add_patron(&PatronDto::new("p3", "three", "p3@x.cc")).await.expect("should add patron");
        system
    }

    #[tokio::test]
    async fn test_should_reserve_and_cancel() {
        let system = build_system().await;

        let res = system.hold_service.cancel("p1", "isbn1").await.expect("should cancel");
        assert!(res.is_none());

        let hold = system.hold_service.reserve("p1", "isbn1").await.expect("should reserve");
        assert_eq!("p1", hold.patron_id.as_str());
        assert_eq!(HoldStatus::OnHold, hold.hold_status);
        let patron = system.patron_service.find_patron_by_id("p1").await.expect("should return patron");
        assert!(patron.has_reserved("isbn1"));

        let canceled = system.hold_service.cancel("p1", "isbn1").await.expect("should cancel").expect("should return hold");
        assert_eq!(HoldStatus::Canceled, canceled.hold_status);
        assert!(canceled.canceled_at.is_some());
        let patron = system.patron_service.find_patron_by_id("p1").await.expect("should return patron");
        assert!(!patron.has_reserved("isbn1"));
    }

    #[tokio::test]
    async fn test_should_reject_reserve_for_unknown_patron_or_book() {
        let system = build_system().await;

        let res = system.hold_service.reserve("missing", "isbn1").await;
        assert!(matches!(res, Err(LibraryError::NotFound { .. })));
        let res = system.hold_service.reserve("p1", "missing").await;
        assert!(matches!(res, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_keep_reserve_idempotent() {
        let system = build_system().await;

        let first = system.hold_service.reserve("p1", "isbn1").await.expect("should reserve");
        let second = system.hold_service.reserve("p1", "isbn1").await.expect("should reserve");
        assert_eq!(first.hold_id, second.hold_id);

        let queue = system.hold_service.queue_for("isbn1").await.expect("should return queue");
        assert_eq!(1, queue.len());
        let patron = system.patron_service.find_patron_by_id("p1").await.expect("should return patron");
        assert_eq!(1, patron.reservation_isbns.len());
    }

    #[tokio::test]
    async fn test_should_cancel_from_middle_of_queue() {
        let system = build_system().await;

        let _ = system.hold_service.reserve("p1", "isbn1").await.expect("should reserve");
        let _ = system.hold_service.reserve("p2", "isbn1").await.expect("should reserve");
        let _ = system.hold_service.reserve("p3", "isbn1").await.expect("should reserve");

        let _ = system.hold_service.cancel("p2", "isbn1").await.expect("should cancel").expect("should return hold");

        let queue = system.hold_service.queue_for("isbn1").await.expect("should return queue");
        let patrons: Vec<String> = queue.iter().map(|h| h.patron_id.to_string()).collect();
        assert_eq!(vec!["p1", "p3"], patrons);
    }

    #[tokio::test]
    async fn test_should_notify_head_of_queue_only() {
        let system = build_system().await;

        let _ = system.hold_service.reserve("p1", "isbn1").await.expect("should reserve");
        let _ = system.hold_service.reserve("p2", "isbn1").await.expect("should reserve");

        let notified = system.hold_service.next_waiter("isbn1").await.expect("should notify");
        assert_eq!(Some("p1".to_string()), notified);

        let queue = system.hold_service.queue_for("isbn1").await.expect("should return queue");
        let patrons: Vec<String> = queue.iter().map(|h| h.patron_id.to_string()).collect();
        assert_eq!(vec!["p2"], patrons);
        let patron = system.patron_service.find_patron_by_id("p1").await.expect("should return patron");
        assert!(!patron.has_reserved("isbn1"));

        let notified = system.hold_service.next_waiter("isbn1").await.expect("should notify");
        assert_eq!(Some("p2".to_string()), notified);
        let notified = system.hold_service.next_waiter("isbn1").await.expect("should notify");
        assert_eq!(None, notified);
    }
}
