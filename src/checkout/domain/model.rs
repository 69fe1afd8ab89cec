use chrono::{Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::core::library::CheckoutStatus;
use crate::utils::date::{opt_serializer, serializer};

// CheckoutEntity is one ledger row: a single lending transaction from
// checkout to return. The title is snapshotted at checkout time and stays
// unchanged across later catalog edits.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CheckoutEntity {
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

impl CheckoutEntity {
    pub fn new(isbn: &str, patron_id: &str, book_title: &str, loan_days: i64) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            record_id: Uuid::new_v4().to_string(),
            version: 0,
            isbn: isbn.to_string(),
            patron_id: patron_id.to_string(),
            book_title: book_title.to_string(),
            checkout_status: CheckoutStatus::CheckedOut,
            checkout_at: now,
            due_at: now + Duration::days(loan_days),
            returned_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Identifiable for CheckoutEntity {
    fn id(&self) -> String {
        self.record_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}
