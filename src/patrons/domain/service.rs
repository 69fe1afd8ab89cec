use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult};
use crate::patrons::domain::PatronService;
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::dto::PatronDto;
use crate::patrons::repository::PatronRepository;

pub struct PatronServiceImpl {
    patron_repository: Arc<dyn PatronRepository>,
}

impl PatronServiceImpl {
    pub fn new(_config: &Configuration, patron_repository: Arc<dyn PatronRepository>) -> Self {
        PatronServiceImpl {
            patron_repository,
        }
    }
}

#[async_trait]
impl PatronService for PatronServiceImpl {
    async fn add_patron(&self, patron: &PatronDto) -> LibraryResult<()> {
        if patron.patron_id.trim().is_empty() {
            return Err(LibraryError::validation("patron id cannot be blank", Some("blank_id".to_string())));
        }
        self.patron_repository.create(&PatronEntity::from(patron)).await.map(|_| ())?;
        info!("patron added {}", patron.patron_id);
        Ok(())
    }

    async fn remove_patron(&self, id: &str) -> LibraryResult<()> {
        self.patron_repository.delete(id).await.map(|_| ())?;
        info!("patron removed {}", id);
        Ok(())
    }

    async fn update_patron(&self, patron: &PatronDto) -> LibraryResult<()> {
        self.patron_repository.update(&PatronEntity::from(patron)).await.map(|_| ())
    }

    async fn find_patron_by_id(&self, id: &str) -> LibraryResult<PatronDto> {
        self.patron_repository.get(id).await.map(|p| PatronDto::from(&p))
    }

    async fn find_patron_by_email(&self, email: &str) -> LibraryResult<Vec<PatronDto>> {
        let res = self.patron_repository.query(
            &HashMap::from([("email".to_string(), email.to_string())]), None, 100).await?;
        Ok(res.records.iter().map(PatronDto::from).collect())
    }

    async fn list_patrons(&self) -> LibraryResult<Vec<PatronDto>> {
        let res = self.patron_repository.find_all().await?;
        Ok(res.iter().map(PatronDto::from).collect())
    }
}

impl From<&PatronEntity> for PatronDto {
    fn from(other: &PatronEntity) -> Self {
        Self {
            patron_id: other.patron_id.to_string(),
            version: other.version,
            name: other.name.to_string(),
            email: other.email.to_string(),
            borrowed_isbns: other.borrowed_isbns.clone(),
            reservation_isbns: other.reservation_isbns.clone(),
            history_isbns: other.history_isbns.clone(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&PatronDto> for PatronEntity {
    fn from(other: &PatronDto) -> Self {
        Self {
            patron_id: other.patron_id.to_string(),
            version: other.version,
            name: other.name.to_string(),
            email: other.email.to_string(),
            borrowed_isbns: other.borrowed_isbns.clone(),
            reservation_isbns: other.reservation_isbns.clone(),
            history_isbns: other.history_isbns.clone(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}
