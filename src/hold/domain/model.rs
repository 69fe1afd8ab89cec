use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::core::library::HoldStatus;
use crate::utils::date::{opt_serializer, serializer};

// HoldEntity is one reservation queue entry. The FIFO queue for a book is
// the set of OnHold rows for its isbn in insertion order; closed rows keep
// the notified/canceled timestamps as audit history.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct HoldEntity {
    pub hold_id: String,
    pub version: i64,
    pub isbn: String,
    pub patron_id: String,
    pub hold_status: HoldStatus,
    #[serde(with = "serializer")]
    pub hold_at: NaiveDateTime,
    #[serde(with = "opt_serializer")]
    pub notified_at: Option<NaiveDateTime>,
    #[serde(with = "opt_serializer")]
    pub canceled_at: Option<NaiveDateTime>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl HoldEntity {
    pub fn new(isbn: &str, patron_id: &str) -> Self {
        Self {
            hold_id: Uuid::new_v4().to_string(),
            version: 0,
            isbn: isbn.to_string(),
            patron_id: patron_id.to_string(),
            hold_status: HoldStatus::OnHold,
            hold_at: Utc::now().naive_utc(),
            notified_at: None,
            canceled_at: None,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for HoldEntity {
    fn id(&self) -> String {
        self.hold_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use crate::core::library::HoldStatus;
    use crate::hold::domain::model::HoldEntity;

    #[tokio::test]
    async fn test_should_build_hold() {
        let hold = HoldEntity::new("isbn1", "p1");
        assert_eq!("isbn1", hold.isbn.as_str());
        assert_eq!("p1", hold.patron_id.as_str());
        assert_eq!(HoldStatus::OnHold, hold.hold_status);
        assert_eq!(None, hold.notified_at);
        assert_eq!(None, hold.canceled_at);
    }
}
