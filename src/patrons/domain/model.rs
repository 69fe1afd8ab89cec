use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;

// PatronEntity abstracts a library member together with the circulation
// lists the coordinator maintains: currently borrowed isbns, reservation
// isbns (both ordered and duplicate-free) and the append-only borrow
// history, which may repeat.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PatronEntity {
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

impl PatronEntity {
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
}

impl Identifiable for PatronEntity {
    fn id(&self) -> String {
        self.patron_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use crate::core::domain::Identifiable;
    use crate::patrons::domain::model::PatronEntity;

    #[tokio::test]
    async fn test_should_build_patron() {
        let patron = PatronEntity::new(" p1 ", "name", "email@org.cc");
        assert_eq!("p1", patron.patron_id.as_str());
        assert_eq!("p1", patron.id());
        assert_eq!("email@org.cc", patron.email.as_str());
        assert!(patron.borrowed_isbns.is_empty());
        assert!(patron.reservation_isbns.is_empty());
        assert!(patron.history_isbns.is_empty());
    }
}
