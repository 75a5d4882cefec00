use tracing::info;

use crate::database::models::{ActionItem, Comment, TrackedCase, TrackedPerson};
use crate::database::{DatabaseError, Repositories};

/// A case together with the person it tracks and its outstanding items
#[derive(Debug, Clone)]
pub struct CaseActionSummary {
    pub case: TrackedCase,
    pub person: TrackedPerson,
    pub unresolved: Vec<ActionItem>,
}

impl CaseActionSummary {
    pub fn has_unresolved_items(&self) -> bool {
        !self.unresolved.is_empty()
    }

    /// Sum of the item weights; medical incidents count double
    pub fn priority(&self) -> u32 {
        self.unresolved.iter().map(|i| i.item_type.weight()).sum()
    }
}

/// Outcome of resolving a case's action items
#[derive(Debug, Clone)]
pub struct Resolution {
    pub resolved: u64,
    /// The case as stored after the comment was appended
    pub case: TrackedCase,
}

/// Action item workflows on top of the repositories
#[derive(Clone)]
pub struct ActionItemsManagement {
    repos: Repositories,
}

impl ActionItemsManagement {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Unresolved items of the case's person, or nothing once the case is closed
    pub async fn find_unresolved_by_active_case(&self, case: &TrackedCase) -> Result<Vec<ActionItem>, DatabaseError> {
        if !case.is_open() {
            return Ok(Vec::new());
        }
        self.repos.items.find_unresolved_by_tracked_person(case.tracked_person_id).await
    }

    /// Resolve every outstanding item of the case and record the reviewer's comment
    pub async fn resolve_items_for(
        &self,
        case: &TrackedCase,
        comment: &str,
        author: &str,
    ) -> Result<Resolution, DatabaseError> {
        let ids: Vec<_> = self
            .find_unresolved_by_active_case(case)
            .await?
            .iter()
            .map(|item| item.id)
            .collect();

        let (resolved, case) = self
            .repos
            .cases
            .resolve_with_comment(case.id, &ids, &Comment::new(comment.trim(), author))
            .await?;

        info!("Resolved {} action items for case {} by {}", resolved, case.id, author);
        Ok(Resolution { resolved, case })
    }

    pub async fn tracked_person_of(&self, case: &TrackedCase) -> Result<TrackedPerson, DatabaseError> {
        self.repos
            .people
            .find_by_id(case.tracked_person_id)
            .await?
            .ok_or_else(|| DatabaseError::Corrupt(format!("case {} references missing person", case.id)))
    }

    pub async fn summarize(&self, case: TrackedCase) -> Result<CaseActionSummary, DatabaseError> {
        let person = self.tracked_person_of(&case).await?;
        let unresolved = self.find_unresolved_by_active_case(&case).await?;
        Ok(CaseActionSummary { case, person, unresolved })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{CaseStatus, CaseType, Description, ItemType};
    use crate::database::{MemoryStore, TrackedCaseRepository};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Arc;
    use uuid::Uuid;

    /// Case repository whose writes always fail, reads go to the wrapped store
    struct FailingWrites(Arc<MemoryStore>);

    #[async_trait]
    impl TrackedCaseRepository for FailingWrites {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<TrackedCase>, DatabaseError> {
            TrackedCaseRepository::find_by_id(self.0.as_ref(), id).await
        }

        async fn find_by_department_id(&self, department_id: Uuid) -> Result<Vec<TrackedCase>, DatabaseError> {
            self.0.find_by_department_id(department_id).await
        }

        async fn find_by_tracked_person(&self, person_id: Uuid) -> Result<Option<TrackedCase>, DatabaseError> {
            TrackedCaseRepository::find_by_tracked_person(self.0.as_ref(), person_id).await
        }

        async fn add_comment(&self, _case_id: Uuid, _comment: &Comment) -> Result<(), DatabaseError> {
            Err(DatabaseError::Corrupt("comment store offline".into()))
        }

        async fn resolve_with_comment(
            &self,
            _case_id: Uuid,
            _item_ids: &[Uuid],
            _comment: &Comment,
        ) -> Result<(u64, TrackedCase), DatabaseError> {
            Err(DatabaseError::Corrupt("comment store offline".into()))
        }

        async fn save(&self, case: &TrackedCase) -> Result<(), DatabaseError> {
            TrackedCaseRepository::save(self.0.as_ref(), case).await
        }
    }

    async fn seeded(status: CaseStatus) -> (ActionItemsManagement, Repositories, TrackedCase) {
        seeded_in(Repositories::from_store(Arc::new(MemoryStore::new())), status).await
    }

    async fn seeded_in(repos: Repositories, status: CaseStatus) -> (ActionItemsManagement, Repositories, TrackedCase) {
        let person = TrackedPerson {
            id: Uuid::new_v4(),
            first_name: "Paula".into(),
            last_name: "Patient".into(),
            email: None,
            phone: None,
            date_of_birth: None,
            account_id: None,
        };
        let case = TrackedCase {
            id: Uuid::new_v4(),
            tracked_person_id: person.id,
            department_id: Uuid::new_v4(),
            case_type: CaseType::Index,
            status,
            quarantine: None,
            origin_case_ids: vec![],
            comments: vec![],
            created_at: Utc::now(),
        };
        repos.people.save(&person).await.unwrap();
        repos.cases.save(&case).await.unwrap();

        for (item_type, code) in [
            (ItemType::MedicalIncident, "INCREASED_TEMPERATURE"),
            (ItemType::ProcessIncident, "DIARY_ENTRY_MISSING"),
        ] {
            repos
                .items
                .save(&ActionItem {
                    id: Uuid::new_v4(),
                    tracked_person_id: person.id,
                    case_id: case.id,
                    item_type,
                    description: Description::of(code, vec![]),
                    resolved: false,
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        (ActionItemsManagement::new(repos.clone()), repos, case)
    }

    #[tokio::test]
    async fn summary_priority_weighs_medical_items() {
        let (management, _, case) = seeded(CaseStatus::Tracking).await;
        let summary = management.summarize(case).await.unwrap();
        assert!(summary.has_unresolved_items());
        assert_eq!(summary.priority(), 3);
    }

    #[tokio::test]
    async fn closed_case_has_no_active_items() {
        let (management, _, case) = seeded(CaseStatus::Concluded).await;
        assert!(management.find_unresolved_by_active_case(&case).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn resolving_marks_items_and_appends_comment() {
        let (management, repos, case) = seeded(CaseStatus::Tracking).await;

        let resolution = management.resolve_items_for(&case, "  called back  ", "agent").await.unwrap();
        assert_eq!(resolution.resolved, 2);
        assert_eq!(resolution.case.comments.len(), 1);

        assert!(repos.items.find_unresolved_by_tracked_person(case.tracked_person_id).await.unwrap().is_empty());
        let stored = repos.cases.find_by_id(case.id).await.unwrap().unwrap();
        assert_eq!(stored.comments.len(), 1);
        assert_eq!(stored.comments[0].text, "called back");
        assert_eq!(stored.comments[0].author, "agent");
    }

    #[tokio::test]
    async fn failed_comment_leaves_items_unresolved() {
        let store = Arc::new(MemoryStore::new());
        let mut repos = Repositories::from_store(store.clone());
        repos.cases = Arc::new(FailingWrites(store));
        let (management, repos, case) = seeded_in(repos, CaseStatus::Tracking).await;

        let result = management.resolve_items_for(&case, "called back", "agent").await;
        assert!(result.is_err());

        let unresolved = repos.items.find_unresolved_by_tracked_person(case.tracked_person_id).await.unwrap();
        assert_eq!(unresolved.len(), 2);
        assert!(repos.cases.find_by_id(case.id).await.unwrap().unwrap().comments.is_empty());
    }
}
