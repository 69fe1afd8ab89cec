use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;

// BookEntity abstracts a physical book in the circulation system; the isbn
// is the immutable catalog key, the rest of the metadata is editable.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct BookEntity {
    pub isbn: String,
    pub version: i64,
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    pub available: bool,
    pub times_borrowed: i64,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl BookEntity {
    pub fn new(isbn: &str, title: &str, author: &str, publication_year: i32) -> Self {
        Self {
            isbn: isbn.trim().to_string(),
            version: 0,
            title: title.trim().to_string(),
            author: author.trim().to_string(),
            publication_year,
            available: true,
            times_borrowed: 0,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for BookEntity {
    fn id(&self) -> String {
        self.isbn.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}
