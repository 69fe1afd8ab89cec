use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::library::HoldStatus;
use crate::utils::date::{opt_serializer, serializer};

// HoldDto is a data transfer object for the reservation service
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct HoldDto {
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
