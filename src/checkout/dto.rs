use chrono::{Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::books::domain::Book;
use crate::core::library::CheckoutStatus;
use crate::patrons::domain::Patron;
use crate::utils::date::{opt_serializer, serializer};

// CheckoutDto is a data transfer object for the lending service
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CheckoutDto {
    pub record_id: String,
    pub version: i64,
    pub isbn: String,
    pub patron_id: String,
    pub book_title: String,
    pub checkout_status: CheckoutStatus,
    #[serde(with = "serializer")]
    pub checkout_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub due_at: NaiveDateTime,
    #[serde(with = "opt_serializer")]
    pub returned_at: Option<NaiveDateTime>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl CheckoutDto {
    pub fn from_patron_book(patron: &dyn Patron, book: &dyn Book, loan_days: i64) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            record_id: Uuid::new_v4().to_string(),
            version: 0,
            isbn: book.id(),
            patron_id: patron.id(),
            book_title: book.title(),
            checkout_status: CheckoutStatus::CheckedOut,
            checkout_at: now,
            due_at: now + Duration::days(loan_days),
            returned_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use crate::books::dto::BookDto;
    use crate::checkout::dto::CheckoutDto;
    use crate::core::library::CheckoutStatus;
    use crate::patrons::dto::PatronDto;

    #[tokio::test]
    async fn test_should_build_checkout_from_patron_book() {
        let patron = PatronDto::new("p1", "name", "email");
        let book = BookDto::new("isbn1", "title", "author", 2020);
        let checkout = CheckoutDto::from_patron_book(&patron, &book, 14);
        assert_eq!("p1", checkout.patron_id.as_str());
        assert_eq!("isbn1", checkout.isbn.as_str());
        assert_eq!("title", checkout.book_title.as_str());
        assert_eq!(CheckoutStatus::CheckedOut, checkout.checkout_status);
        assert_eq!(checkout.checkout_at + Duration::days(14), checkout.due_at);
    }
}
