pub mod model;
pub mod service;

use async_trait::async_trait;
use crate::core::domain::Identifiable;
use crate::core::library::LibraryResult;
use crate::patrons::dto::PatronDto;

#[async_trait]
pub trait PatronService: Sync + Send {
    async fn add_patron(&self, patron: &PatronDto) -> LibraryResult<()>;
    async fn remove_patron(&self, id: &str) -> LibraryResult<()>;
    async fn update_patron(&self, patron: &PatronDto) -> LibraryResult<()>;
    async fn find_patron_by_id(&self, id: &str) -> LibraryResult<PatronDto>;
    async fn find_patron_by_email(&self, email: &str) -> LibraryResult<Vec<PatronDto>>;
    async fn list_patrons(&self) -> LibraryResult<Vec<PatronDto>>;
}

pub trait Patron: Identifiable {
    fn has_borrowed(&self, isbn: &str) -> bool;
    fn has_reserved(&self, isbn: &str) -> bool;
    fn ever_borrowed(&self, isbn: &str) -> bool;
}
