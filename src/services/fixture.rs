//! YAML fixtures for seeding a store: demo runs, the `ctdesk fixture load`
//! command and the integration tests all share this format.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::auth::{hash_password, AuthError};
use crate::database::models::{
    Account, ActionItem, CaseStatus, CaseType, Comment, Department, Description, EncryptedPassword, ItemType,
    Quarantine, RoleType, TrackedCase, TrackedPerson,
};
use crate::database::{DatabaseError, Repositories};

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Invalid fixture YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Fixture references unknown {kind} '{id}'")]
    UnknownReference { kind: &'static str, id: Uuid },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub departments: Vec<DepartmentDto>,
    #[serde(default)]
    pub accounts: Vec<AccountDto>,
    #[serde(default)]
    pub people: Vec<PersonDto>,
    #[serde(default)]
    pub cases: Vec<CaseDto>,
    #[serde(default)]
    pub items: Vec<ItemDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentDto {
    pub id: Uuid,
    pub name: String,
    pub rki_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountDto {
    pub id: Uuid,
    pub username: String,
    /// Plain text; hashed while loading
    pub password: String,
    #[serde(default)]
    pub password_expired: bool,
    pub first_name: String,
    pub last_name: String,
    pub department: Uuid,
    pub roles: Vec<RoleType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub account: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseDto {
    pub id: Uuid,
    pub person: Uuid,
    pub department: Uuid,
    #[serde(rename = "type")]
    pub case_type: CaseType,
    pub status: CaseStatus,
    pub quarantine: Option<Quarantine>,
    #[serde(default)]
    pub origins: Vec<Uuid>,
    #[serde(default)]
    pub comments: Vec<CommentDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDto {
    pub text: String,
    pub author: String,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDto {
    pub id: Option<Uuid>,
    pub case: Uuid,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub code: String,
    #[serde(default)]
    pub arguments: Vec<String>,
    #[serde(default)]
    pub resolved: bool,
}

/// Domain records produced from a fixture, ready to be saved
#[derive(Debug, Clone, Default)]
pub struct FixtureRecords {
    pub departments: Vec<Department>,
    pub accounts: Vec<Account>,
    pub people: Vec<TrackedPerson>,
    pub cases: Vec<TrackedCase>,
    pub items: Vec<ActionItem>,
}

impl Fixture {
    pub fn from_yaml(yaml: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Map DTOs to domain records, checking cross references.
    /// Cases and items keep fixture order through their `created_at`.
    pub fn into_records(self) -> Result<FixtureRecords, FixtureError> {
        let now = Utc::now();
        let base = now - Duration::days(1);

        let departments: Vec<Department> = self
            .departments
            .into_iter()
            .map(|d| Department {
                id: d.id,
                name: d.name,
                rki_code: d.rki_code,
            })
            .collect();
        let known_department = |id: Uuid| -> Result<Uuid, FixtureError> {
            if departments.iter().any(|d| d.id == id) {
                Ok(id)
            } else {
                Err(FixtureError::UnknownReference { kind: "department", id })
            }
        };

        let mut accounts = Vec::with_capacity(self.accounts.len());
        for dto in self.accounts {
            let mut password = EncryptedPassword::new(hash_password(&dto.password)?);
            if dto.password_expired {
                password = password.expiring_at(now - Duration::days(1));
            }
            accounts.push(Account {
                id: dto.id,
                username: dto.username,
                password,
                first_name: dto.first_name,
                last_name: dto.last_name,
                department_id: known_department(dto.department)?,
                roles: dto.roles,
            });
        }

        let mut people = Vec::with_capacity(self.people.len());
        for dto in self.people {
            if let Some(account) = dto.account {
                if !accounts.iter().any(|a| a.id == account) {
                    return Err(FixtureError::UnknownReference { kind: "account", id: account });
                }
            }
            people.push(TrackedPerson {
                id: dto.id,
                first_name: dto.first_name,
                last_name: dto.last_name,
                email: dto.email,
                phone: dto.phone,
                date_of_birth: dto.date_of_birth,
                account_id: dto.account,
            });
        }

        let mut cases = Vec::with_capacity(self.cases.len());
        let mut case_people: HashMap<Uuid, Uuid> = HashMap::new();
        for (i, dto) in self.cases.into_iter().enumerate() {
            if !people.iter().any(|p| p.id == dto.person) {
                return Err(FixtureError::UnknownReference { kind: "person", id: dto.person });
            }
            let created_at = base + Duration::seconds(i as i64);
            case_people.insert(dto.id, dto.person);
            cases.push(TrackedCase {
                id: dto.id,
                tracked_person_id: dto.person,
                department_id: known_department(dto.department)?,
                case_type: dto.case_type,
                status: dto.status,
                quarantine: dto.quarantine,
                origin_case_ids: dto.origins,
                comments: dto
                    .comments
                    .into_iter()
                    .map(|c| Comment {
                        date: c.date.unwrap_or(created_at),
                        text: c.text,
                        author: c.author,
                    })
                    .collect(),
                created_at,
            });
        }
        for case in &cases {
            if let Some(missing) = case.origin_case_ids.iter().find(|id| !case_people.contains_key(id)) {
                return Err(FixtureError::UnknownReference { kind: "case", id: *missing });
            }
        }

        let mut items = Vec::with_capacity(self.items.len());
        for (i, dto) in self.items.into_iter().enumerate() {
            let person = *case_people
                .get(&dto.case)
                .ok_or(FixtureError::UnknownReference { kind: "case", id: dto.case })?;
            items.push(ActionItem {
                id: dto.id.unwrap_or_else(Uuid::new_v4),
                tracked_person_id: person,
                case_id: dto.case,
                item_type: dto.item_type,
                description: Description::of(dto.code, dto.arguments),
                resolved: dto.resolved,
                created_at: base + Duration::seconds(i as i64),
            });
        }

        Ok(FixtureRecords {
            departments,
            accounts,
            people,
            cases,
            items,
        })
    }
}

impl FixtureRecords {
    /// Save everything in dependency order
    pub async fn save(&self, repos: &Repositories) -> Result<(), FixtureError> {
        for department in &self.departments {
            repos.departments.save(department).await?;
        }
        for account in &self.accounts {
            repos.accounts.save(account).await?;
        }
        for person in &self.people {
            repos.people.save(person).await?;
        }
        // Origins reference other cases; insert the rows first, links second
        for case in &self.cases {
            let unlinked = TrackedCase {
                origin_case_ids: Vec::new(),
                ..case.clone()
            };
            repos.cases.save(&unlinked).await?;
        }
        for case in self.cases.iter().filter(|c| !c.origin_case_ids.is_empty()) {
            repos.cases.save(case).await?;
        }
        for item in &self.items {
            repos.items.save(item).await?;
        }

        info!(
            "Loaded fixture: {} departments, {} accounts, {} people, {} cases, {} action items",
            self.departments.len(),
            self.accounts.len(),
            self.people.len(),
            self.cases.len(),
            self.items.len()
        );
        Ok(())
    }
}

/// Parse a fixture and save it into the given repositories
pub async fn load_fixture(yaml: &str, repos: &Repositories) -> Result<FixtureRecords, FixtureError> {
    let records = Fixture::from_yaml(yaml)?.into_records()?;
    records.save(repos).await?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPARTMENT: &str = "6b3d7e3a-0000-4000-8000-000000000001";

    fn minimal(extra: &str) -> String {
        format!(
            "departments:\n  - id: {DEPARTMENT}\n    name: GA Test\n{extra}"
        )
    }

    #[test]
    fn unknown_department_reference_is_rejected() {
        let yaml = minimal(
            "accounts:\n  - id: 6b3d7e3a-0000-4000-8000-0000000000a1\n    username: x\n    password: y\n    first_name: A\n    last_name: B\n    department: 6b3d7e3a-0000-4000-8000-0000000000ff\n    roles: [ROLE_HD_ADMIN]\n",
        );
        let err = Fixture::from_yaml(&yaml).unwrap().into_records().unwrap_err();
        assert!(matches!(err, FixtureError::UnknownReference { kind: "department", .. }));
    }

    #[test]
    fn expired_flag_sets_past_expiry() {
        let yaml = minimal(
            "accounts:\n  - id: 6b3d7e3a-0000-4000-8000-0000000000a1\n    username: x\n    password: y\n    password_expired: true\n    first_name: A\n    last_name: B\n    department: 6b3d7e3a-0000-4000-8000-000000000001\n    roles: [ROLE_HD_ADMIN]\n",
        );
        let records = Fixture::from_yaml(&yaml).unwrap().into_records().unwrap();
        assert!(records.accounts[0].password.is_expired());
        assert_ne!(records.accounts[0].password.hash, "y");
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(matches!(Fixture::from_yaml("departments: ["), Err(FixtureError::Yaml(_))));
    }
}
