pub mod memory_checkout_repository;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use crate::checkout::domain::model::CheckoutEntity;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;

// The lending ledger. Append-only: records are created on checkout, closed
// once by mark_returned and never deleted.
#[async_trait]
pub trait CheckoutRepository: Repository<CheckoutEntity> {
    // The single open record for a (book, patron) pair; more than one open
    // record is a ledger fault and fails rather than picking arbitrarily.
    async fn find_open(&self, isbn: &str, patron_id: &str) -> LibraryResult<Option<CheckoutEntity>>;

    async fn mark_returned(&self, record_id: &str, returned_at: NaiveDateTime) -> LibraryResult<CheckoutEntity>;

    // snapshot in insertion order, which is chronological
    async fn find_all(&self) -> LibraryResult<Vec<CheckoutEntity>>;

    async fn query_overdue(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<CheckoutEntity>>;
}
