pub mod model;
pub mod service;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::hold::dto::HoldDto;

// Reservation queue contract. reserve/cancel/queue_for are the external
// surface and serialize themselves on the circulation lock; next_waiter and
// remove_waiter are invoked by the lending coordinator from inside its own
// exclusive section and therefore must not lock.
#[async_trait]
pub trait HoldService: Sync + Send {
    async fn reserve(&self, patron_id: &str, isbn: &str) -> LibraryResult<HoldDto>;
    async fn cancel(&self, patron_id: &str, isbn: &str) -> LibraryResult<Option<HoldDto>>;
    async fn queue_for(&self, isbn: &str) -> LibraryResult<Vec<HoldDto>>;
    async fn next_waiter(&self, isbn: &str) -> LibraryResult<Option<String>>;
    async fn remove_waiter(&self, isbn: &str, patron_id: &str) -> LibraryResult<Option<HoldDto>>;
}
