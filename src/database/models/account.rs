use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roles an account can hold. Staff roles work cases of their department,
/// `User` is a tracked person logging into the self-service client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleType {
    #[serde(rename = "ROLE_HD_ADMIN")]
    HdAdmin,
    #[serde(rename = "ROLE_HD_CASE_AGENT")]
    HdCaseAgent,
    #[serde(rename = "ROLE_USER")]
    User,
}

impl RoleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::HdAdmin => "ROLE_HD_ADMIN",
            RoleType::HdCaseAgent => "ROLE_HD_CASE_AGENT",
            RoleType::User => "ROLE_USER",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ROLE_HD_ADMIN" => Some(RoleType::HdAdmin),
            "ROLE_HD_CASE_AGENT" => Some(RoleType::HdCaseAgent),
            "ROLE_USER" => Some(RoleType::User),
            _ => None,
        }
    }

    pub fn is_department_role(&self) -> bool {
        matches!(self, RoleType::HdAdmin | RoleType::HdCaseAgent)
    }
}

/// Stored password: an argon2 PHC string plus an optional expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPassword {
    pub hash: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl EncryptedPassword {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            expires_at: None,
        }
    }

    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub password: EncryptedPassword,
    pub first_name: String,
    pub last_name: String,
    pub department_id: Uuid,
    pub roles: Vec<RoleType>,
}

impl Account {
    pub fn has_role(&self, role: RoleType) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_tracked_person(&self) -> bool {
        self.has_role(RoleType::User)
    }

    pub fn is_department_staff(&self) -> bool {
        self.roles.iter().any(RoleType::is_department_role)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
