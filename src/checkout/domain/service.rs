use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::catalog::domain::CatalogService;
use crate::checkout::domain::LendingService;
use crate::checkout::domain::model::CheckoutEntity;
use crate::checkout::dto::CheckoutDto;
use crate::checkout::repository::CheckoutRepository;
use crate::core::domain::{CirculationLock, Configuration};
use crate::core::events::DomainEvent;
use crate::core::library::{CheckoutStatus, LibraryError, LibraryResult, PaginatedResult};
use crate::gateway::events::EventPublisher;
use crate::hold::domain::HoldService;
use crate::patrons::domain::{Patron, PatronService};

pub struct LendingServiceImpl {
    loan_days: i64,
    checkout_repository: Arc<dyn CheckoutRepository>,
    patron_service: Arc<dyn PatronService>,
    catalog_service: Arc<dyn CatalogService>,
    hold_service: Arc<dyn HoldService>,
    events_publisher: Arc<dyn EventPublisher>,
    lock: CirculationLock,
}

impl LendingServiceImpl {
    pub fn new(config: &Configuration, checkout_repository: Arc<dyn CheckoutRepository>,
               patron_service: Arc<dyn PatronService>, catalog_service: Arc<dyn CatalogService>,
               hold_service: Arc<dyn HoldService>, events_publisher: Arc<dyn EventPublisher>,
               lock: CirculationLock) -> Self {
        Self {
            loan_days: config.loan_days,
            checkout_repository,
            patron_service,
            catalog_service,
            hold_service,
            events_publisher,
            lock,
        }
    }
}

#[async_trait]
impl LendingService for LendingServiceImpl {
    async fn checkout(&self, patron_id: &str, isbn: &str) -> LibraryResult<CheckoutDto> {
        let _guard = self.lock.exclusive().await;
        let mut book = self.catalog_service.find_book_by_id(isbn).await?;
        let mut patron = self.patron_service.find_patron_by_id(patron_id).await?;
        if !book.available {
            return Err(LibraryError::unavailable(format!("book is not available {}",
                                                         book.isbn).as_str(), Some("checked_out".to_string()), true));
        }
        // a queued patron who takes the copy gives up the queue slot;
        // re-read afterwards since closing the hold bumps the patron row
        if patron.has_reserved(isbn) {
            let _ = self.hold_service.remove_waiter(isbn, patron_id).await?;
            patron = self.patron_service.find_patron_by_id(patron_id).await?;
        }
        book.mark_checked_out();
        let _ = self.catalog_service.update_book(&book).await?;
        patron.borrow(isbn);
        self.patron_service.update_patron(&patron).await?;
        let checkout = CheckoutDto::from_patron_book(&patron, &book, self.loan_days);
        self.checkout_repository.create(&CheckoutEntity::from(&checkout)).await?;
        let _ = self.events_publisher.publish(&DomainEvent::added(
            "book_checkout", checkout.record_id.as_str(), &HashMap::new(), &checkout.clone())?).await?;
        info!("book checked out {} by patron {}", isbn, patron_id);
        Ok(checkout)
    }

    async fn returned(&self, patron_id: &str, isbn: &str) -> LibraryResult<Option<CheckoutDto>> {
        let _guard = self.lock.exclusive().await;
        let mut book = self.catalog_service.find_book_by_id(isbn).await?;
        let mut patron = self.patron_service.find_patron_by_id(patron_id).await?;
        if !patron.has_borrowed(isbn) {
            return Err(LibraryError::not_borrowed(format!("patron {} did not borrow book {}",
                                                          patron_id, isbn).as_str()));
        }
        // locate the open record before touching any state: a duplicate
        // pair aborts, a missing record is tolerated as a ledger gap
        let open = self.checkout_repository.find_open(isbn, patron_id).await?;
        book.mark_available();
        let _ = self.catalog_service.update_book(&book).await?;
        patron.returned(isbn);
        self.patron_service.update_patron(&patron).await?;
        let returned = match open {
            Some(record) => {
                let closed = self.checkout_repository.mark_returned(
                    record.record_id.as_str(), Utc::now().naive_utc()).await?;
                Some(CheckoutDto::from(&closed))
            }
            None => {
                warn!("no open lending record for book {} and patron {}", isbn, patron_id);
                None
            }
        };
        // notification is advisory: the head waiter loses the queue slot
        // but the copy stays in the pool until they check it out themselves
        if let Some(waiter) = self.hold_service.next_waiter(isbn).await? {
            info!("waiting patron {} notified for {}", waiter, isbn);
        }
        let _ = self.events_publisher.publish(&DomainEvent::updated(
            "book_returned", isbn, &HashMap::new(), &returned.clone())?).await?;
        info!("book returned {} by patron {}", isbn, patron_id);
        Ok(returned)
    }

    async fn all_records(&self) -> LibraryResult<Vec<CheckoutDto>> {
        let _guard = self.lock.shared().await;
        let res = self.checkout_repository.find_all().await?;
        Ok(res.iter().map(CheckoutDto::from).collect())
    }

    async fn query_overdue(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<CheckoutDto>> {
        let _guard = self.lock.shared().await;
        let res = self.checkout_repository.query_overdue(page, page_size).await?;
        let records = res.records.iter().map(CheckoutDto::from).collect();
        Ok(PaginatedResult::new(page, page_size, res.next_page, records))
    }

    async fn check_integrity(&self) -> LibraryResult<Vec<String>> {
        let _guard = self.lock.shared().await;
        let mut findings = vec![];
        let records = self.checkout_repository.find_all().await?;
        let mut open_pairs: HashMap<(String, String), usize> = HashMap::new();
        for record in records.iter().filter(|r| r.checkout_status == CheckoutStatus::CheckedOut) {
            *open_pairs.entry((record.isbn.to_string(), record.patron_id.to_string())).or_insert(0) += 1;
        }
        for ((isbn, patron_id), count) in open_pairs.iter() {
            if *count > 1 {
                findings.push(format!("{} open lending records for book {} and patron {}", count, isbn, patron_id));
            }
        }
        let books = self.catalog_service.list_books().await?;
        let patrons = self.patron_service.list_patrons().await?;
        for book in books.iter() {
            let holders = patrons.iter().filter(|p| p.has_borrowed(book.isbn.as_str())).count();
            if book.available && holders != 0 {
                findings.push(format!("book {} is available but borrowed by {} patrons", book.isbn, holders));
            }
            if !book.available && holders != 1 {
                findings.push(format!("book {} is checked out but borrowed by {} patrons", book.isbn, holders));
            }
            let open = records.iter().filter(|r| r.isbn == book.isbn
                && r.checkout_status == CheckoutStatus::CheckedOut).count();
            if !book.available && open == 0 {
                findings.push(format!("book {} is checked out with no open lending record", book.isbn));
            }
            if book.available && open > 0 {
                findings.push(format!("book {} is available with {} open lending records", book.isbn, open));
            }
        }
        for finding in findings.iter() {
            warn!("ledger integrity: {}", finding);
        }
        Ok(findings)
    }
}

impl From<&CheckoutEntity> for CheckoutDto {
    fn from(other: &CheckoutEntity) -> CheckoutDto {
        CheckoutDto {
            record_id: other.record_id.to_string(),
            version: other.version,
            isbn: other.isbn.to_string(),
            patron_id: other.patron_id.to_string(),
            book_title: other.book_title.to_string(),
            checkout_status: other.checkout_status,
            checkout_at: other.checkout_at,
            due_at: other.due_at,
            returned_at: other.returned_at,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&CheckoutDto> for CheckoutEntity {
    fn from(other: &CheckoutDto) -> CheckoutEntity {
        CheckoutEntity {
            record_id: other.record_id.to_string(),
            version: other.version,
            isbn: other.isbn.to_string(),
            patron_id: other.patron_id.to_string(),
            book_title: other.book_title.to_string(),
            checkout_status: other.checkout_status,
            checkout_at: other.checkout_at,
            due_at: other.due_at,
            returned_at: other.returned_at,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}
