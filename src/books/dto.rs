use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::books::domain::Book;
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;

// BookDto is a data transfer object for the catalog and search services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDto {
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

impl BookDto {
    pub fn new(isbn: &str, title: &str, author: &str, publication_year: i32) -> BookDto {
        BookDto {
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

    // Checkout transition: the copy leaves the pool and the popularity
    // counter advances exactly once per successful checkout.
    pub fn mark_checked_out(&mut self) {
        self.available = false;
        self.times_borrowed += 1;
    }

    // Return transition: the copy rejoins the pool.
    pub fn mark_available(&mut self) {
        self.available = true;
    }
}

impl Identifiable for BookDto {
    fn id(&self) -> String {
        self.isbn.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Book for BookDto {
    fn title(&self) -> String {
        self.title.to_string()
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn times_borrowed(&self) -> i64 {
        self.times_borrowed
    }
}

#[cfg(test)]
mod tests {
    use crate::books::domain::Book;
    use crate::books::dto::BookDto;

    #[tokio::test]
    async fn test_should_build_books() {
        let book = BookDto::new("isbn", "title", "author", 2021);
        assert_eq!("isbn", book.isbn.as_str());
        assert_eq!("title", book.title.as_str());
        assert!(book.is_available());
        assert_eq!(0, book.times_borrowed());
    }

    #[tokio::test]
    async fn test_should_track_checkout_transitions() {
        let mut book = BookDto::new("isbn", "title", "author", 2021);
        book.mark_checked_out();
        assert!(!book.is_available());
        assert_eq!(1, book.times_borrowed());
        book.mark_available();
        assert!(book.is_available());
        assert_eq!(1, book.times_borrowed());
    }
}
