use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Account, ActionItem, Comment, Department, EncryptedPassword, TrackedCase, TrackedPerson,
};
use crate::database::repository::{
    AccountRepository, ActionItemRepository, DepartmentRepository, StoreHealth, TrackedCaseRepository,
    TrackedPersonRepository,
};

/// In-memory implementation of every repository.
///
/// Used by the test suite and by `CT_STORE=memory` demo runs. Ordering
/// matches the PostgreSQL store: `created_at` then `id`.
#[derive(Default)]
pub struct MemoryStore {
    departments: RwLock<HashMap<Uuid, Department>>,
    accounts: RwLock<HashMap<Uuid, Account>>,
    people: RwLock<HashMap<Uuid, TrackedPerson>>,
    cases: RwLock<HashMap<Uuid, TrackedCase>>,
    items: RwLock<HashMap<Uuid, ActionItem>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DepartmentRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Department>, DatabaseError> {
        Ok(self.departments.read().await.get(&id).cloned())
    }

    async fn save(&self, department: &Department) -> Result<(), DatabaseError> {
        self.departments.write().await.insert(department.id, department.clone());
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DatabaseError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, DatabaseError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.username == username).cloned())
    }

    async fn update_password(&self, id: Uuid, password: &EncryptedPassword) -> Result<(), DatabaseError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("account {}", id)))?;
        account.password = password.clone();
        Ok(())
    }

    async fn save(&self, account: &Account) -> Result<(), DatabaseError> {
        self.accounts.write().await.insert(account.id, account.clone());
        Ok(())
    }
}

#[async_trait]
impl TrackedPersonRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TrackedPerson>, DatabaseError> {
        Ok(self.people.read().await.get(&id).cloned())
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<TrackedPerson>, DatabaseError> {
        let people = self.people.read().await;
        Ok(people.values().find(|p| p.account_id == Some(account_id)).cloned())
    }

    async fn save(&self, person: &TrackedPerson) -> Result<(), DatabaseError> {
        self.people.write().await.insert(person.id, person.clone());
        Ok(())
    }
}

#[async_trait]
impl TrackedCaseRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TrackedCase>, DatabaseError> {
        Ok(self.cases.read().await.get(&id).cloned())
    }

    async fn find_by_department_id(&self, department_id: Uuid) -> Result<Vec<TrackedCase>, DatabaseError> {
        let cases = self.cases.read().await;
        let mut found: Vec<TrackedCase> = cases.values().filter(|c| c.belongs_to(department_id)).cloned().collect();
        found.sort_by_key(|c| (c.created_at, c.id));
        Ok(found)
    }

    async fn find_by_tracked_person(&self, person_id: Uuid) -> Result<Option<TrackedCase>, DatabaseError> {
        let cases = self.cases.read().await;
        Ok(cases
            .values()
            .filter(|c| c.tracked_person_id == person_id)
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn add_comment(&self, case_id: Uuid, comment: &Comment) -> Result<(), DatabaseError> {
        let mut cases = self.cases.write().await;
        let case = cases
            .get_mut(&case_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("case {}", case_id)))?;
        case.comments.push(comment.clone());
        Ok(())
    }

    async fn resolve_with_comment(
        &self,
        case_id: Uuid,
        item_ids: &[Uuid],
        comment: &Comment,
    ) -> Result<(u64, TrackedCase), DatabaseError> {
        // Lock order: cases, then items
        let mut cases = self.cases.write().await;
        let case = cases
            .get_mut(&case_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("case {}", case_id)))?;

        let mut items = self.items.write().await;
        let resolved = resolve_in(&mut items, item_ids);
        case.comments.push(comment.clone());

        Ok((resolved, case.clone()))
    }

    async fn save(&self, case: &TrackedCase) -> Result<(), DatabaseError> {
        self.cases.write().await.insert(case.id, case.clone());
        Ok(())
    }
}

#[async_trait]
impl ActionItemRepository for MemoryStore {
    async fn find_by_tracked_person(&self, person_id: Uuid) -> Result<Vec<ActionItem>, DatabaseError> {
        let items = self.items.read().await;
        let mut found: Vec<ActionItem> = items.values().filter(|i| i.tracked_person_id == person_id).cloned().collect();
        found.sort_by_key(|i| (i.created_at, i.id));
        Ok(found)
    }

    async fn find_unresolved_by_tracked_person(&self, person_id: Uuid) -> Result<Vec<ActionItem>, DatabaseError> {
        let mut found = ActionItemRepository::find_by_tracked_person(self, person_id).await?;
        found.retain(|i| !i.resolved);
        Ok(found)
    }

    async fn resolve(&self, ids: &[Uuid]) -> Result<u64, DatabaseError> {
        let mut items = self.items.write().await;
        Ok(resolve_in(&mut items, ids))
    }

    async fn save(&self, item: &ActionItem) -> Result<(), DatabaseError> {
        self.items.write().await.insert(item.id, item.clone());
        Ok(())
    }
}

fn resolve_in(items: &mut HashMap<Uuid, ActionItem>, ids: &[Uuid]) -> u64 {
    let mut changed = 0;
    for id in ids {
        if let Some(item) = items.get_mut(id) {
            if !item.resolved {
                item.resolved = true;
                changed += 1;
            }
        }
    }
    changed
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{CaseStatus, CaseType, Description, ItemType};
    use chrono::{Duration, Utc};

    fn case(department_id: Uuid, person_id: Uuid, age_minutes: i64) -> TrackedCase {
        TrackedCase {
            id: Uuid::new_v4(),
            tracked_person_id: person_id,
            department_id,
            case_type: CaseType::Contact,
            status: CaseStatus::Tracking,
            quarantine: None,
            origin_case_ids: vec![],
            comments: vec![],
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[tokio::test]
    async fn department_cases_are_filtered_and_ordered() {
        let store = MemoryStore::new();
        let department = Uuid::new_v4();
        let newer = case(department, Uuid::new_v4(), 1);
        let older = case(department, Uuid::new_v4(), 10);
        let foreign = case(Uuid::new_v4(), Uuid::new_v4(), 5);
        for c in [&newer, &older, &foreign] {
            TrackedCaseRepository::save(&store, c).await.unwrap();
        }

        let found = store.find_by_department_id(department).await.unwrap();
        let ids: Vec<Uuid> = found.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![older.id, newer.id]);
    }

    #[tokio::test]
    async fn resolve_only_counts_changed_items() {
        let store = MemoryStore::new();
        let person = Uuid::new_v4();
        let item = ActionItem {
            id: Uuid::new_v4(),
            tracked_person_id: person,
            case_id: Uuid::new_v4(),
            item_type: ItemType::ProcessIncident,
            description: Description::of("DIARY_ENTRY_MISSING", vec![]),
            resolved: false,
            created_at: Utc::now(),
        };
        ActionItemRepository::save(&store, &item).await.unwrap();

        assert_eq!(store.resolve(&[item.id]).await.unwrap(), 1);
        assert_eq!(store.resolve(&[item.id]).await.unwrap(), 0);
        assert!(store.find_unresolved_by_tracked_person(person).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn resolve_with_comment_on_missing_case_changes_nothing() {
        let store = MemoryStore::new();
        let item = ActionItem {
            id: Uuid::new_v4(),
            tracked_person_id: Uuid::new_v4(),
            case_id: Uuid::new_v4(),
            item_type: ItemType::MedicalIncident,
            description: Description::of("INCREASED_TEMPERATURE", vec![]),
            resolved: false,
            created_at: Utc::now(),
        };
        ActionItemRepository::save(&store, &item).await.unwrap();

        let err = store
            .resolve_with_comment(item.case_id, &[item.id], &Comment::new("done", "agent"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
        assert_eq!(store.find_unresolved_by_tracked_person(item.tracked_person_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn resolve_with_comment_returns_updated_case() {
        let store = MemoryStore::new();
        let stored = case(Uuid::new_v4(), Uuid::new_v4(), 1);
        TrackedCaseRepository::save(&store, &stored).await.unwrap();

        let (resolved, updated) = store
            .resolve_with_comment(stored.id, &[Uuid::new_v4()], &Comment::new("checked", "agent"))
            .await
            .unwrap();
        assert_eq!(resolved, 0);
        assert_eq!(updated.comments.len(), 1);
        assert_eq!(updated.comments[0].text, "checked");
    }

    #[tokio::test]
    async fn add_comment_to_missing_case_is_not_found() {
        let store = MemoryStore::new();
        let err = store.add_comment(Uuid::new_v4(), &Comment::new("x", "y")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }
}
