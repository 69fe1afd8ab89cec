pub mod service;

use async_trait::async_trait;
use crate::books::dto::BookDto;
use crate::core::library::{LibraryResult, SearchKind};

// Read-only query layer over the catalog; never mutates circulation state.
#[async_trait]
pub trait SearchService: Sync + Send {
    async fn search(&self, kind: SearchKind, query: &str) -> LibraryResult<Vec<BookDto>>;
    async fn recommend(&self, patron_id: &str) -> LibraryResult<Vec<BookDto>>;
    async fn most_borrowed(&self, limit: usize) -> LibraryResult<Vec<BookDto>>;
}
