use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;

// In-memory book table: rows keyed by isbn plus the catalog insertion
// order, which drives list snapshots and ranking tie-breaks.
#[derive(Debug, Default)]
struct BookTable {
    rows: HashMap<String, BookEntity>,
    order: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MemoryBookRepository {
    table: RwLock<BookTable>,
}

impl MemoryBookRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(BookTable::default()),
        }
    }

    fn matches(entity: &BookEntity, predicate: &HashMap<String, String>) -> bool {
        predicate.iter().all(|(k, v)| match k.as_str() {
            "isbn" => entity.isbn == *v,
            "title" => entity.title == *v,
            "author" => entity.author == *v,
            "available" => entity.available.to_string() == *v,
            _ => false,
        })
    }
}

#[async_trait]
impl Repository<BookEntity> for MemoryBookRepository {
    async fn create(&self, entity: &BookEntity) -> LibraryResult<usize> {
        if entity.id().trim().is_empty() {
            return Err(LibraryError::validation("book isbn cannot be blank", Some("blank_id".to_string())));
        }
        let mut table = self.table.write().await;
        if table.rows.contains_key(&entity.id()) {
            return Err(LibraryError::duplicate_key(format!("book already exists {}", entity.id()).as_str()));
        }
        table.order.push(entity.id());
        table.rows.insert(entity.id(), entity.clone());
        Ok(1)
    }

    async fn update(&self, entity: &BookEntity) -> LibraryResult<usize> {
        let mut table = self.table.write().await;
        let existing = table.rows.get(&entity.id())
            .ok_or_else(|| LibraryError::not_found(format!("book not found {}", entity.id()).as_str()))?;
        if existing.version != entity.version {
            return Err(LibraryError::unavailable(
                format!("book version conflict {}", entity.id()).as_str(),
                Some("version_conflict".to_string()), true));
        }
        let mut updated = entity.clone();
        updated.version = entity.version + 1;
        updated.updated_at = Utc::now().naive_utc();
        table.rows.insert(entity.id(), updated);
        Ok(1)
    }

    async fn get(&self, id: &str) -> LibraryResult<BookEntity> {
        let table = self.table.read().await;
        table.rows.get(id).cloned()
            .ok_or_else(|| LibraryError::not_found(format!("book not found {}", id).as_str()))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let mut table = self.table.write().await;
        match table.rows.remove(id) {
            Some(_) => {
                table.order.retain(|isbn| isbn != id);
                Ok(1)
            }
            None => Err(LibraryError::not_found(format!("book not found {}", id).as_str())),
        }
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        let table = self.table.read().await;
        let matched: Vec<BookEntity> = table.order.iter()
            .filter_map(|isbn| table.rows.get(isbn))
            .filter(|entity| Self::matches(entity, predicate))
            .cloned()
            .collect();
        let offset = page.and_then(|p| p.parse::<usize>().ok()).unwrap_or(0);
        let limit = cmp::min(page_size, 500);
        let records: Vec<BookEntity> = matched.iter().skip(offset).take(limit).cloned().collect();
        let next_page = if offset + records.len() < matched.len() {
            Some((offset + records.len()).to_string())
        } else {
            None
        };
        Ok(PaginatedResult::new(page, page_size, next_page, records))
    }
}

#[async_trait]
impl BookRepository for MemoryBookRepository {
    async fn find_all(&self) -> LibraryResult<Vec<BookEntity>> {
        let table = self.table.read().await;
        Ok(table.order.iter()
            .filter_map(|isbn| table.rows.get(isbn))
            .cloned()
            .collect())
    }

    async fn find_by_author(&self, author: &str,
                            page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        self.query(&HashMap::from([("author".to_string(), author.to_string())]), page, page_size).await
    }
}
