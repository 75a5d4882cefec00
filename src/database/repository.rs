use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Account, ActionItem, Comment, Department, EncryptedPassword, TrackedCase, TrackedPerson,
};

#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Department>, DatabaseError>;
    async fn save(&self, department: &Department) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DatabaseError>;
    /// Exact match; callers trim user input first
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, DatabaseError>;
    async fn update_password(&self, id: Uuid, password: &EncryptedPassword) -> Result<(), DatabaseError>;
    async fn save(&self, account: &Account) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait TrackedPersonRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TrackedPerson>, DatabaseError>;
    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<TrackedPerson>, DatabaseError>;
    async fn save(&self, person: &TrackedPerson) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait TrackedCaseRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TrackedCase>, DatabaseError>;
    /// All cases of a department, oldest first
    async fn find_by_department_id(&self, department_id: Uuid) -> Result<Vec<TrackedCase>, DatabaseError>;
    /// The most recent case tracking the given person
    async fn find_by_tracked_person(&self, person_id: Uuid) -> Result<Option<TrackedCase>, DatabaseError>;
    async fn add_comment(&self, case_id: Uuid, comment: &Comment) -> Result<(), DatabaseError>;
    /// Resolve the given items and append the comment in one unit of work.
    /// Nothing changes when the case is missing. Returns the number of items
    /// resolved and the case as stored afterwards.
    async fn resolve_with_comment(
        &self,
        case_id: Uuid,
        item_ids: &[Uuid],
        comment: &Comment,
    ) -> Result<(u64, TrackedCase), DatabaseError>;
    async fn save(&self, case: &TrackedCase) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait ActionItemRepository: Send + Sync {
    async fn find_by_tracked_person(&self, person_id: Uuid) -> Result<Vec<ActionItem>, DatabaseError>;
    async fn find_unresolved_by_tracked_person(&self, person_id: Uuid) -> Result<Vec<ActionItem>, DatabaseError>;
    /// Marks the given items resolved, returning how many changed
    async fn resolve(&self, ids: &[Uuid]) -> Result<u64, DatabaseError>;
    async fn save(&self, item: &ActionItem) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Every repository a handler may need, behind trait objects so the same
/// router runs against PostgreSQL or the in-memory store.
#[derive(Clone)]
pub struct Repositories {
    pub departments: Arc<dyn DepartmentRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    pub people: Arc<dyn TrackedPersonRepository>,
    pub cases: Arc<dyn TrackedCaseRepository>,
    pub items: Arc<dyn ActionItemRepository>,
    pub health: Arc<dyn StoreHealth>,
}

impl Repositories {
    /// Wire all repositories to a single store implementing every trait
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: DepartmentRepository
            + AccountRepository
            + TrackedPersonRepository
            + TrackedCaseRepository
            + ActionItemRepository
            + StoreHealth
            + 'static,
    {
        Self {
            departments: store.clone(),
            accounts: store.clone(),
            people: store.clone(),
            cases: store.clone(),
            items: store.clone(),
            health: store,
        }
    }
}
