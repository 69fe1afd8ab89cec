use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::core::domain::Identifiable;
use crate::core::library::{HoldStatus, LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::hold::domain::model::HoldEntity;
use crate::hold::repository::HoldRepository;

// Insertion order of the rows doubles as queue order, so the table never
// reorders entries; closed holds simply stop matching find_open.
#[derive(Debug, Default)]
struct HoldTable {
    rows: HashMap<String, HoldEntity>,
    order: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MemoryHoldRepository {
    table: RwLock<HoldTable>,
}

impl MemoryHoldRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(HoldTable::default()),
        }
    }

    fn matches(entity: &HoldEntity, predicate: &HashMap<String, String>) -> bool {
        predicate.iter().all(|(k, v)| match k.as_str() {
            "hold_id" => entity.hold_id == *v,
            "isbn" => entity.isbn == *v,
            "patron_id" => entity.patron_id == *v,
            "hold_status" => entity.hold_status.to_string() == *v,
            _ => false,
        })
    }
}

#[async_trait]
impl Repository<HoldEntity> for MemoryHoldRepository {
    async fn create(&self, entity: &HoldEntity) -> LibraryResult<usize> {
        let mut table = self.table.write().await;
        if table.rows.contains_key(&entity.id()) {
            return Err(LibraryError::duplicate_key(format!("hold already exists {}", entity.id()).as_str()));
        }
        table.order.push(entity.id());
        table.rows.insert(entity.id(), entity.clone());
        Ok(1)
    }

    async fn update(&self, entity: &HoldEntity) -> LibraryResult<usize> {
        let mut table = self.table.write().await;
        let existing = table.rows.get(&entity.id())
            .ok_or_else(|| LibraryError::not_found(format!("hold not found {}", entity.id()).as_str()))?;
        if existing.version != entity.version {
            return Err(LibraryError::unavailable(
                format!("hold version conflict {}", entity.id()).as_str(),
                Some("version_conflict".to_string()), true));
        }
        let mut updated = entity.clone();
        updated.version = entity.version + 1;
        updated.updated_at = Utc::now().naive_utc();
        table.rows.insert(entity.id(), updated);
        Ok(1)
    }

    async fn get(&self, id: &str) -> LibraryResult<HoldEntity> {
        let table = self.table.read().await;
        table.rows.get(id).cloned()
            .ok_or_else(|| LibraryError::not_found(format!("hold not found {}", id).as_str()))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let mut table = self.table.write().await;
        match table.rows.remove(id) {
            Some(_) => {
                table.order.retain(|hold_id| hold_id != id);
                Ok(1)
            }
            None => Err(LibraryError::not_found(format!("hold not found {}", id).as_str())),
        }
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<HoldEntity>> {
        let table = self.table.read().await;
        let matched: Vec<HoldEntity> = table.order.iter()
            .filter_map(|hold_id| table.rows.get(hold_id))
            .filter(|entity| Self::matches(entity, predicate))
            .cloned()
            .collect();
        let offset = page.and_then(|p| p.parse::<usize>().ok()).unwrap_or(0);
        let limit = cmp::min(page_size, 500);
        let records: Vec<HoldEntity> = matched.iter().skip(offset).take(limit).cloned().collect();
        let next_page = if offset + records.len() < matched.len() {
            Some((offset + records.len()).to_string())
        } else {
            None
        };
        Ok(PaginatedResult::new(page, page_size, next_page, records))
    }
}

#[async_trait]
impl HoldRepository for MemoryHoldRepository {
    async fn find_open(&self, isbn: &str) -> LibraryResult<Vec<HoldEntity>> {
        let table = self.table.read().await;
        Ok(table.order.iter()
            .filter_map(|hold_id| table.rows.get(hold_id))
            .filter(|hold| hold.isbn == isbn && hold.hold_status == HoldStatus::OnHold)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::core::library::HoldStatus;
    use crate::core::repository::Repository;
    use crate::hold::domain::model::HoldEntity;
    use crate::hold::repository::HoldRepository;
    use crate::hold::repository::memory_hold_repository::MemoryHoldRepository;

    #[tokio::test]
    async fn test_should_create_get_hold() {
        let hold_repo = MemoryHoldRepository::new();
        let hold = HoldEntity::new("isbn1", "p1");
        let size = hold_repo.create(&hold).await.expect("should create hold");
        assert_eq!(1, size);

        let loaded = hold_repo.get(hold.hold_id.as_str()).await.expect("should return hold");
        assert_eq!(hold.hold_id, loaded.hold_id);
    }

    #[tokio::test]
    async fn test_should_create_update_hold() {
        let hold_repo = MemoryHoldRepository::new();
        let mut hold = HoldEntity::new("isbn1", "p1");
        let _ = hold_repo.create(&hold).await.expect("should create hold");

        hold.hold_status = HoldStatus::Canceled;
        let size = hold_repo.update(&hold).await.expect("should update hold");
        assert_eq!(1, size);

        let loaded = hold_repo.get(hold.hold_id.as_str()).await.expect("should return hold");
        assert_eq!(HoldStatus::Canceled, loaded.hold_status);
        assert_eq!(1, loaded.version);
    }

    #[tokio::test]
    async fn test_should_keep_open_holds_in_queue_order() {
        let hold_repo = MemoryHoldRepository::new();
        let first = HoldEntity::new("isbn1", "p1");
        let second = HoldEntity::new("isbn1", "p2");
        let other = HoldEntity::new("isbn2", "p3");
        let _ = hold_repo.create(&first).await.expect("should create hold");
        let _ = hold_repo.create(&second).await.expect("should create hold");
        let _ = hold_repo.create(&other).await.expect("should create hold");

        let open = hold_repo.find_open("isbn1").await.expect("should find open holds");
        let patrons: Vec<String> = open.iter().map(|h| h.patron_id.to_string()).collect();
        assert_eq!(vec!["p1", "p2"], patrons);
    }

    #[tokio::test]
    async fn test_should_drop_closed_holds_from_queue() {
        let hold_repo = MemoryHoldRepository::new();
        let mut first = HoldEntity::new("isbn1", "p1");
        let second = HoldEntity::new("isbn1", "p2");
        let _ = hold_repo.create(&first).await.expect("should create hold");
        let _ = hold_repo.create(&second).await.expect("should create hold");

        first.hold_status = HoldStatus::Notified;
        let _ = hold_repo.update(&first).await.expect("should update hold");

        let open = hold_repo.find_open("isbn1").await.expect("should find open holds");
        assert_eq!(1, open.len());
        assert_eq!("p2", open[0].patron_id.as_str());
    }
}
