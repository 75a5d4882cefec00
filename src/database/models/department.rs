use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A health department; the tenant every case and staff account belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub rki_code: Option<String>,
}
