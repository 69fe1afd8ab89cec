use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use tokio::sync::RwLock;

use crate::checkout::domain::model::CheckoutEntity;
use crate::checkout::repository::CheckoutRepository;
use crate::core::domain::Identifiable;
use crate::core::library::{CheckoutStatus, LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;

#[derive(Debug, Default)]
struct CheckoutTable {
    rows: HashMap<String, CheckoutEntity>,
    order: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MemoryCheckoutRepository {
    table: RwLock<CheckoutTable>,
}

impl MemoryCheckoutRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(CheckoutTable::default()),
        }
    }

    fn matches(entity: &CheckoutEntity, predicate: &HashMap<String, String>) -> bool {
        predicate.iter().all(|(k, v)| match k.as_str() {
            "record_id" => entity.record_id == *v,
            "isbn" => entity.isbn == *v,
            "patron_id" => entity.patron_id == *v,
            "checkout_status" => entity.checkout_status.to_string() == *v,
            _ => false,
        })
    }

    fn paginate(matched: Vec<CheckoutEntity>, page: Option<&str>,
                page_size: usize) -> PaginatedResult<CheckoutEntity> {
        let offset = page.and_then(|p| p.parse::<usize>().ok()).unwrap_or(0);
        let limit = cmp::min(page_size, 500);
        let records: Vec<CheckoutEntity> = matched.iter().skip(offset).take(limit).cloned().collect();
        let next_page = if offset + records.len() < matched.len() {
            Some((offset + records.len()).to_string())
        } else {
            None
        };
        PaginatedResult::new(page, page_size, next_page, records)
    }
}

#[async_trait]
impl Repository<CheckoutEntity> for MemoryCheckoutRepository {
    async fn create(&self, entity: &CheckoutEntity) -> LibraryResult<usize> {
        let mut table = self.table.write().await;
        if table.rows.contains_key(&entity.id()) {
            return Err(LibraryError::duplicate_key(format!("lending record already exists {}", entity.id()).as_str()));
        }
        table.order.push(entity.id());
        table.rows.insert(entity.id(), entity.clone());
        Ok(1)
    }

    async fn update(&self, entity: &CheckoutEntity) -> LibraryResult<usize> {
        let mut table = self.table.write().await;
        let existing = table.rows.get(&entity.id())
            .ok_or_else(|| LibraryError::not_found(format!("lending record not found {}", entity.id()).as_str()))?;
        if existing.version != entity.version {
            return Err(LibraryError::unavailable(
                format!("lending record version conflict {}", entity.id()).as_str(),
                Some("version_conflict".to_string()), true));
        }
        let mut updated = entity.clone();
        updated.version = entity.version + 1;
        updated.updated_at = Utc::now().naive_utc();
        table.rows.insert(entity.id(), updated);
        Ok(1)
    }

    async fn get(&self, id: &str) -> LibraryResult<CheckoutEntity> {
        let table = self.table.read().await;
        table.rows.get(id).cloned()
            .ok_or_else(|| LibraryError::not_found(format!("lending record not found {}", id).as_str()))
    }

    // the ledger is append-only
    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        Err(LibraryError::validation(
            format!("lending records are never deleted {}", id).as_str(),
            Some("append_only".to_string())))
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<CheckoutEntity>> {
        let table = self.table.read().await;
        let matched: Vec<CheckoutEntity> = table.order.iter()
            .filter_map(|record_id| table.rows.get(record_id))
            .filter(|entity| Self::matches(entity, predicate))
            .cloned()
            .collect();
        Ok(Self::paginate(matched, page, page_size))
    }
}

#[async_trait]
impl CheckoutRepository for MemoryCheckoutRepository {
    async fn find_open(&self, isbn: &str, patron_id: &str) -> LibraryResult<Option<CheckoutEntity>> {
        let table = self.table.read().await;
        let mut open: Vec<CheckoutEntity> = table.order.iter()
            .filter_map(|record_id| table.rows.get(record_id))
            .filter(|record| record.isbn == isbn && record.patron_id == patron_id
                && record.checkout_status == CheckoutStatus::CheckedOut)
            .cloned()
            .collect();
        if open.len() > 1 {
            return Err(LibraryError::ledger_inconsistency(
                format!("{} open lending records for book {} and patron {}", open.len(), isbn, patron_id).as_str()));
        }
        Ok(open.pop())
    }

    async fn mark_returned(&self, record_id: &str, returned_at: NaiveDateTime) -> LibraryResult<CheckoutEntity> {
        let mut table = self.table.write().await;
        let existing = table.rows.get(record_id)
            .ok_or_else(|| LibraryError::not_found(format!("lending record not found {}", record_id).as_str()))?;
        if existing.checkout_status == CheckoutStatus::Returned {
            return Err(LibraryError::validation(
                format!("lending record already returned {}", record_id).as_str(),
                Some("already_returned".to_string())));
        }
        let mut updated = existing.clone();
        updated.checkout_status = CheckoutStatus::Returned;
        updated.returned_at = Some(returned_at);
        updated.version = existing.version + 1;
        updated.updated_at = Utc::now().naive_utc();
        table.rows.insert(record_id.to_string(), updated.clone());
        Ok(updated)
    }

    async fn find_all(&self) -> LibraryResult<Vec<CheckoutEntity>> {
        let table = self.table.read().await;
        Ok(table.order.iter()
            .filter_map(|record_id| table.rows.get(record_id))
            .cloned()
            .collect())
    }

    async fn query_overdue(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<CheckoutEntity>> {
        let now = Utc::now().naive_utc();
        let table = self.table.read().await;
        let matched: Vec<CheckoutEntity> = table.order.iter()
            .filter_map(|record_id| table.rows.get(record_id))
            .filter(|record| record.checkout_status == CheckoutStatus::CheckedOut && record.due_at <= now)
            .cloned()
            .collect();
        Ok(Self::paginate(matched, page, page_size))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use crate::checkout::domain::model::CheckoutEntity;
    use crate::checkout::repository::CheckoutRepository;
    use crate::checkout::repository::memory_checkout_repository::MemoryCheckoutRepository;
    use crate::core::library::{CheckoutStatus, LibraryError};
    use crate::core::repository::Repository;

    #[tokio::test]
    async fn test_should_create_get_checkout() {
        let checkout_repo = MemoryCheckoutRepository::new();
        let checkout = CheckoutEntity::new("isbn1", "p1", "title", 14);
        let size = checkout_repo.create(&checkout).await.expect("should create checkout");
        assert_eq!(1, size);

        let loaded = checkout_repo.get(checkout.record_id.as_str()).await.expect("should return checkout");
        assert_eq!(checkout.record_id, loaded.record_id);
    }

    #[tokio::test]
    async fn test_should_find_open_record() {
        let checkout_repo = MemoryCheckoutRepository::new();
        let checkout = CheckoutEntity::new("isbn1", "p1", "title", 14);
        let _ = checkout_repo.create(&checkout).await.expect("should create checkout");

        let open = checkout_repo.find_open("isbn1", "p1").await.expect("should find open");
        assert_eq!(Some(checkout.record_id.to_string()), open.map(|r| r.record_id));

        let none = checkout_repo.find_open("isbn1", "p2").await.expect("should find open");
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_should_fail_find_open_on_duplicate_pair() {
        let checkout_repo = MemoryCheckoutRepository::new();
        let _ = checkout_repo.create(&CheckoutEntity::new("isbn1", "p1", "title", 14)).await.expect("should create checkout");
        let _ = checkout_repo.create(&CheckoutEntity::new("isbn1", "p1", "title", 14)).await.expect("should create checkout");

        let res = checkout_repo.find_open("isbn1", "p1").await;
        assert!(matches!(res, Err(LibraryError::LedgerInconsistency { .. })));
    }

    #[tokio::test]
    async fn test_should_mark_returned_once() {
        let checkout_repo = MemoryCheckoutRepository::new();
        let checkout = CheckoutEntity::new("isbn1", "p1", "title", 14);
        let _ = checkout_repo.create(&checkout).await.expect("should create checkout");

        let now = Utc::now().naive_utc();
        let returned = checkout_repo.mark_returned(checkout.record_id.as_str(), now).await.expect("should mark returned");
        assert_eq!(CheckoutStatus::Returned, returned.checkout_status);
        assert_eq!(Some(now), returned.returned_at);

        let res = checkout_repo.mark_returned(checkout.record_id.as_str(), now).await;
        assert!(matches!(res, Err(LibraryError::Validation { .. })));
        let res = checkout_repo.mark_returned("missing", now).await;
        assert!(matches!(res, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_refuse_delete() {
        let checkout_repo = MemoryCheckoutRepository::new();
        let checkout = CheckoutEntity::new("isbn1", "p1", "title", 14);
        let _ = checkout_repo.create(&checkout).await.expect("should create checkout");

        let res = checkout_repo.delete(checkout.record_id.as_str()).await;
        assert!(matches!(res, Err(LibraryError::Validation { .. })));
        let loaded = checkout_repo.get(checkout.record_id.as_str()).await.expect("should return checkout");
        assert_eq!(checkout.record_id, loaded.record_id);
    }

    #[tokio::test]
    async fn test_should_find_all_in_chronological_order() {
        let checkout_repo = MemoryCheckoutRepository::new();
        let first = CheckoutEntity::new("isbn1", "p1", "title", 14);
        let second = CheckoutEntity::new("isbn2", "p1", "title", 14);
        let _ = checkout_repo.create(&first).await.expect("should create checkout");
        let _ = checkout_repo.create(&second).await.expect("should create checkout");

        let all = checkout_repo.find_all().await.expect("should list records");
        let ids: Vec<String> = all.iter().map(|r| r.record_id.to_string()).collect();
        assert_eq!(vec![first.record_id, second.record_id], ids);
    }

    #[tokio::test]
    async fn test_should_query_overdue() {
        let checkout_repo = MemoryCheckoutRepository::new();
        let mut overdue = CheckoutEntity::new("isbn1", "p1", "title", 14);
        overdue.due_at = Utc::now().naive_utc() - Duration::days(1);
        let _ = checkout_repo.create(&overdue).await.expect("should create checkout");
        let current = CheckoutEntity::new("isbn2", "p2", "title", 14);
        let _ = checkout_repo.create(&current).await.expect("should create checkout");

        let res = checkout_repo.query_overdue(None, 50).await.expect("should query overdue");
        assert_eq!(1, res.records.len());
        assert_eq!("isbn1", res.records[0].isbn.as_str());
    }

    #[tokio::test]
    async fn test_should_query_by_status() {
        let checkout_repo = MemoryCheckoutRepository::new();
        let checkout = CheckoutEntity::new("isbn1", "p1", "title", 14);
        let _ = checkout_repo.create(&checkout).await.expect("should create checkout");
        let _ = checkout_repo.mark_returned(checkout.record_id.as_str(), Utc::now().naive_utc()).await.expect("should mark returned");
        let _ = checkout_repo.create(&CheckoutEntity::new("isbn1", "p2", "title", 14)).await.expect("should create checkout");

        let predicate = std::collections::HashMap::from([
            ("checkout_status".to_string(), CheckoutStatus::Returned.to_string()),
        ]);
        let res = checkout_repo.query(&predicate, None, 50).await.expect("should query records");
        assert_eq!(1, res.records.len());
        assert_eq!("p1", res.records[0].patron_id.as_str());
    }
}
