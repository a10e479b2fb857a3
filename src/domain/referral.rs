use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::domain::MobileNumber;

/// A validated submission, not yet persisted.
#[derive(Debug)]
pub struct NewReferral {
    pub name: String,
    pub city: String,
    pub email: String,
    pub number: MobileNumber,
}

/// A stored referral as returned by the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub email: String,
    #[serde(serialize_with = "serialize_as_string")]
    pub number: i64,
    pub created_at: DateTime<Utc>,
}

// JSON clients read numbers as doubles; ten digit values are sent as strings.
fn serialize_as_string<S>(number: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(number)
}
