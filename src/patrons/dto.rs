use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::patrons::domain::Patron;
use crate::utils::date::serializer;

// PatronDto is a data transfer object for the patron and lending services
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PatronDto {
    pub patron_id: String,
    pub version: i64,
    pub name: String,
    pub email: String,
    pub borrowed_isbns: Vec<String>,
    pub reservation_isbns: Vec<String>,
    pub history_isbns: Vec<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl PatronDto {
    pub fn new(patron_id: &str, name: &str, email: &str) -> Self {
        Self {
            patron_id: patron_id.trim().to_string(),
            version: 0,
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            borrowed_isbns: vec![],
            reservation_isbns: vec![],
            history_isbns: vec![],
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    // The borrowed list stays duplicate-free; history is an append log and
    // records every successful checkout, repeats included.
    pub fn borrow(&mut self, isbn: &str) {
        if !self.has_borrowed(isbn) {
            self.borrowed_isbns.push(isbn.to_string());
        }
        self.history_isbns.push(isbn.to_string());
    }

    pub fn returned(&mut self, isbn: &str) {
        self.borrowed_isbns.retain(|held| held != isbn);
    }

    pub fn reserve(&mut self, isbn: &str) {
        if !self.has_reserved(isbn) {
            self.reservation_isbns.push(isbn.to_string());
        }
    }

    pub fn cancel_reservation(&mut self, isbn: &str) {
        self.reservation_isbns.retain(|reserved| reserved != isbn);
    }
}

impl Identifiable for PatronDto {
    fn id(&self) -> String {
        self.patron_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Patron for PatronDto {
    fn has_borrowed(&self, isbn: &str) -> bool {
        self.borrowed_isbns.iter().any(|held| held == isbn)
    }

    fn has_reserved(&self, isbn: &str) -> bool {
        self.reservation_isbns.iter().any(|reserved| reserved == isbn)
    }

    fn ever_borrowed(&self, isbn: &str) -> bool {
        self.history_isbns.iter().any(|past| past == isbn)
    }
}
