use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseType {
    Index,
    Contact,
}

impl CaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseType::Index => "index",
            CaseType::Contact => "contact",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "index" => Some(CaseType::Index),
            "contact" => Some(CaseType::Contact),
            _ => None,
        }
    }
}

/// Case lifecycle. Everything before `Concluded` counts as open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    Open,
    InRegistration,
    Registered,
    Tracking,
    Concluded,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Open => "OPEN",
            CaseStatus::InRegistration => "IN_REGISTRATION",
            CaseStatus::Registered => "REGISTERED",
            CaseStatus::Tracking => "TRACKING",
            CaseStatus::Concluded => "CONCLUDED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "OPEN" => Some(CaseStatus::Open),
            "IN_REGISTRATION" => Some(CaseStatus::InRegistration),
            "REGISTERED" => Some(CaseStatus::Registered),
            "TRACKING" => Some(CaseStatus::Tracking),
            "CONCLUDED" => Some(CaseStatus::Concluded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quarantine {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub date: DateTime<Utc>,
    pub text: String,
    pub author: String,
}

impl Comment {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            date: Utc::now(),
            text: text.into(),
            author: author.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedCase {
    pub id: Uuid,
    pub tracked_person_id: Uuid,
    pub department_id: Uuid,
    pub case_type: CaseType,
    pub status: CaseStatus,
    pub quarantine: Option<Quarantine>,
    /// Cases this one was traced back to (contact cases of an index case)
    pub origin_case_ids: Vec<Uuid>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
}

impl TrackedCase {
    pub fn belongs_to(&self, department_id: Uuid) -> bool {
        self.department_id == department_id
    }

    pub fn is_open(&self) -> bool {
        self.status != CaseStatus::Concluded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case_with_status(status: CaseStatus) -> TrackedCase {
        TrackedCase {
            id: Uuid::new_v4(),
            tracked_person_id: Uuid::new_v4(),
            department_id: Uuid::new_v4(),
            case_type: CaseType::Index,
            status,
            quarantine: None,
            origin_case_ids: vec![],
            comments: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn only_concluded_cases_are_closed() {
        assert!(case_with_status(CaseStatus::Open).is_open());
        assert!(case_with_status(CaseStatus::Tracking).is_open());
        assert!(!case_with_status(CaseStatus::Concluded).is_open());
    }

    #[test]
    fn belongs_to_owning_department_only() {
        let case = case_with_status(CaseStatus::Open);
        assert!(case.belongs_to(case.department_id));
        assert!(!case.belongs_to(Uuid::new_v4()));
    }

    #[test]
    fn status_strings_match_serde_names() {
        let json = serde_json::to_value(CaseStatus::InRegistration).unwrap();
        assert_eq!(json, CaseStatus::InRegistration.as_str());
        assert_eq!(CaseStatus::parse("CONCLUDED"), Some(CaseStatus::Concluded));
    }
}
