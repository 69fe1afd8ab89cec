use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::core::domain::Identifiable;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::repository::PatronRepository;

#[derive(Debug, Default)]
struct PatronTable {
    rows: HashMap<String, PatronEntity>,
    order: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MemoryPatronRepository {
    table: RwLock<PatronTable>,
}

impl MemoryPatronRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(PatronTable::default()),
        }
    }

    fn matches(entity: &PatronEntity, predicate: &HashMap<String, String>) -> bool {
        predicate.iter().all(|(k, v)| match k.as_str() {
            "patron_id" => entity.patron_id == *v,
            "name" => entity.name == *v,
            "email" => entity.email == *v,
            _ => false,
        })
    }
}

#[async_trait]
impl Repository<PatronEntity> for MemoryPatronRepository {
    async fn create(&self, entity: &PatronEntity) -> LibraryResult<usize> {
        if entity.id().trim().is_empty() {
            return Err(LibraryError::validation("patron id cannot be blank", Some("blank_id".to_string())));
        }
        let mut table = self.table.write().await;
        if table.rows.contains_key(&entity.id()) {
            return Err(LibraryError::duplicate_key(format!("patron already exists {}", entity.id()).as_str()));
        }
        table.order.push(entity.id());
        table.rows.insert(entity.id(), entity.clone());
        Ok(1)
    }

    async fn update(&self, entity: &PatronEntity) -> LibraryResult<usize> {
        let mut table = self.table.write().await;
        let existing = table.rows.get(&entity.id())
            .ok_or_else(|| LibraryError::not_found(format!("patron not found {}", entity.id()).as_str()))?;
        if existing.version != entity.version {
            return Err(LibraryError::unavailable(
                format!("patron version conflict {}", entity.id()).as_str(),
                Some("version_conflict".to_string()), true));
        }
        let mut updated = entity.clone();
        updated.version = entity.version + 1;
        updated.updated_at = Utc::now().naive_utc();
        table.rows.insert(entity.id(), updated);
        Ok(1)
    }

    async fn get(&self, id: &str) -> LibraryResult<PatronEntity> {
        let table = self.table.read().await;
        table.rows.get(id).cloned()
            .ok_or_else(|| LibraryError::not_found(format!("patron not found {}", id).as_str()))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let mut table = self.table.write().await;
        match table.rows.remove(id) {
            Some(_) => {
                table.order.retain(|patron_id| patron_id != id);
                Ok(1)
            }
            None => Err(LibraryError::not_found(format!("patron not found {}", id).as_str())),
        }
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<PatronEntity>> {
        let table = self.table.read().await;
        let matched: Vec<PatronEntity> = table.order.iter()
            .filter_map(|patron_id| table.rows.get(patron_id))
            .filter(|entity| Self::matches(entity, predicate))
            .cloned()
            .collect();
        let offset = page.and_then(|p| p.parse::<usize>().ok()).unwrap_or(0);
        let limit = cmp::min(page_size, 500);
        let records: Vec<PatronEntity> = matched.iter().skip(offset).take(limit).cloned().collect();
        let next_page = if offset + records.len() < matched.len() {
            Some((offset + records.len()).to_string())
        } else {
            None
        };
        Ok(PaginatedResult::new(page, page_size, next_page, records))
    }
}

#[async_trait]
impl PatronRepository for MemoryPatronRepository {
    async fn find_all(&self) -> LibraryResult<Vec<PatronEntity>> {
        let table = self.table.read().await;
        Ok(table.order.iter()
            .filter_map(|patron_id| table.rows.get(patron_id))
            .cloned()
            .collect())
    }
}
