pub mod model;
pub mod service;

use async_trait::async_trait;
use crate::checkout::dto::CheckoutDto;
use crate::core::library::{LibraryResult, PaginatedResult};

// The lending coordinator: owns the checkout/return state machine across
// the catalog, the patron lists, the ledger and the reservation queue.
#[async_trait]
pub trait LendingService: Sync + Send {
    async fn checkout(&self, patron_id: &str, isbn: &str) -> LibraryResult<CheckoutDto>;

    // Returns the closed ledger record, or None when the return succeeded
    // structurally but the ledger had no open record for the pair.
    async fn returned(&self, patron_id: &str, isbn: &str) -> LibraryResult<Option<CheckoutDto>>;

    // chronological snapshot of every lending transaction
    async fn all_records(&self) -> LibraryResult<Vec<CheckoutDto>>;

    async fn query_overdue(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<CheckoutDto>>;

    // Non-fatal diagnostics: one finding per disagreement between the
    // availability flags, the patron borrow lists and the ledger.
    async fn check_integrity(&self) -> LibraryResult<Vec<String>>;
}
