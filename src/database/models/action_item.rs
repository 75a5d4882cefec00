use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    MedicalIncident,
    ProcessIncident,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::MedicalIncident => "MEDICAL_INCIDENT",
            ItemType::ProcessIncident => "PROCESS_INCIDENT",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "MEDICAL_INCIDENT" => Some(ItemType::MedicalIncident),
            "PROCESS_INCIDENT" => Some(ItemType::ProcessIncident),
            _ => None,
        }
    }

    /// Weight used when ranking cases by outstanding work
    pub fn weight(&self) -> u32 {
        match self {
            ItemType::MedicalIncident => 2,
            ItemType::ProcessIncident => 1,
        }
    }
}

/// Message code plus positional arguments, rendered through the message catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub code: String,
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl Description {
    pub fn of(code: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            code: code.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: Uuid,
    pub tracked_person_id: Uuid,
    pub case_id: Uuid,
    pub item_type: ItemType,
    pub description: Description,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
}

impl ActionItem {
    pub fn is_medical_incident(&self) -> bool {
        self.item_type == ItemType::MedicalIncident
    }
}
