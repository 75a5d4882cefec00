use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Account, ActionItem, CaseStatus, CaseType, Comment, Department, Description, EncryptedPassword, ItemType,
    Quarantine, RoleType, TrackedCase, TrackedPerson,
};
use crate::database::repository::{
    AccountRepository, ActionItemRepository, DepartmentRepository, StoreHealth, TrackedCaseRepository,
    TrackedPersonRepository,
};

/// PostgreSQL implementation of every repository
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AccountRow {
    id: Uuid,
    username: String,
    password_hash: String,
    password_expires_at: Option<DateTime<Utc>>,
    first_name: String,
    last_name: String,
    department_id: Uuid,
    roles: Vec<String>,
}

impl TryFrom<AccountRow> for Account {
    type Error = DatabaseError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let roles = row
            .roles
            .iter()
            .map(|r| RoleType::parse(r).ok_or_else(|| DatabaseError::Corrupt(format!("unknown role '{}'", r))))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Account {
            id: row.id,
            username: row.username,
            password: EncryptedPassword {
                hash: row.password_hash,
                expires_at: row.password_expires_at,
            },
            first_name: row.first_name,
            last_name: row.last_name,
            department_id: row.department_id,
            roles,
        })
    }
}

#[derive(FromRow)]
struct CaseRow {
    id: Uuid,
    tracked_person_id: Uuid,
    department_id: Uuid,
    case_type: String,
    status: String,
    quarantine_from: Option<NaiveDate>,
    quarantine_to: Option<NaiveDate>,
    origin_case_ids: Vec<Uuid>,
    comments: Json<Vec<Comment>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CaseRow> for TrackedCase {
    type Error = DatabaseError;

    fn try_from(row: CaseRow) -> Result<Self, Self::Error> {
        let case_type = CaseType::parse(&row.case_type)
            .ok_or_else(|| DatabaseError::Corrupt(format!("unknown case type '{}'", row.case_type)))?;
        let status = CaseStatus::parse(&row.status)
            .ok_or_else(|| DatabaseError::Corrupt(format!("unknown case status '{}'", row.status)))?;
        let quarantine = match (row.quarantine_from, row.quarantine_to) {
            (Some(from), Some(to)) => Some(Quarantine { from, to }),
            _ => None,
        };

        Ok(TrackedCase {
            id: row.id,
            tracked_person_id: row.tracked_person_id,
            department_id: row.department_id,
            case_type,
            status,
            quarantine,
            origin_case_ids: row.origin_case_ids,
            comments: row.comments.0,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct ItemRow {
    id: Uuid,
    tracked_person_id: Uuid,
    case_id: Uuid,
    item_type: String,
    description_code: String,
    description_arguments: Vec<String>,
    resolved: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for ActionItem {
    type Error = DatabaseError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let item_type = ItemType::parse(&row.item_type)
            .ok_or_else(|| DatabaseError::Corrupt(format!("unknown item type '{}'", row.item_type)))?;

        Ok(ActionItem {
            id: row.id,
            tracked_person_id: row.tracked_person_id,
            case_id: row.case_id,
            item_type,
            description: Description::of(row.description_code, row.description_arguments),
            resolved: row.resolved,
            created_at: row.created_at,
        })
    }
}

const ACCOUNT_COLUMNS: &str = "id, username, password_hash, password_expires_at, first_name, last_name, department_id, roles";

const CASE_SELECT: &str = r#"
    SELECT
        c.id, c.tracked_person_id, c.department_id, c.case_type, c.status,
        c.quarantine_from, c.quarantine_to, c.created_at,
        COALESCE(
            (SELECT array_agg(o.origin_case_id ORDER BY o.position) FROM tracked_case_origins o WHERE o.case_id = c.id),
            '{}'::uuid[]
        ) AS origin_case_ids,
        COALESCE(
            (SELECT json_agg(json_build_object('date', cc.date, 'text', cc.text, 'author', cc.author) ORDER BY cc.date)
             FROM case_comments cc WHERE cc.case_id = c.id),
            '[]'::json
        ) AS comments
    FROM tracked_cases c
"#;

const ITEM_COLUMNS: &str =
    "id, tracked_person_id, case_id, item_type, description_code, description_arguments, resolved, created_at";

#[async_trait]
impl DepartmentRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Department>, DatabaseError> {
        let department = sqlx::query_as::<_, Department>("SELECT id, name, rki_code FROM departments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(department)
    }

    async fn save(&self, department: &Department) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO departments (id, name, rki_code) VALUES ($1, $2, $3)
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, rki_code = EXCLUDED.rki_code",
        )
        .bind(department.id)
        .bind(&department.name)
        .bind(&department.rki_code)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DatabaseError> {
        let sql = format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS);
        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Account::try_from)
            .transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, DatabaseError> {
        let sql = format!("SELECT {} FROM accounts WHERE username = $1", ACCOUNT_COLUMNS);
        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .map(Account::try_from)
            .transpose()
    }

    async fn update_password(&self, id: Uuid, password: &EncryptedPassword) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE accounts SET password_hash = $2, password_expires_at = $3 WHERE id = $1")
            .bind(id)
            .bind(&password.hash)
            .bind(password.expires_at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("account {}", id)));
        }
        Ok(())
    }

    async fn save(&self, account: &Account) -> Result<(), DatabaseError> {
        let roles: Vec<&str> = account.roles.iter().map(RoleType::as_str).collect();
        sqlx::query(
            "INSERT INTO accounts (id, username, password_hash, password_expires_at, first_name, last_name, department_id, roles)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                password_hash = EXCLUDED.password_hash,
                password_expires_at = EXCLUDED.password_expires_at,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                department_id = EXCLUDED.department_id,
                roles = EXCLUDED.roles",
        )
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.password.hash)
        .bind(account.password.expires_at)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.department_id)
        .bind(&roles)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TrackedPersonRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TrackedPerson>, DatabaseError> {
        let person = sqlx::query_as::<_, TrackedPerson>(
            "SELECT id, first_name, last_name, email, phone, date_of_birth, account_id FROM tracked_people WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(person)
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<TrackedPerson>, DatabaseError> {
        let person = sqlx::query_as::<_, TrackedPerson>(
            "SELECT id, first_name, last_name, email, phone, date_of_birth, account_id FROM tracked_people WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(person)
    }

    async fn save(&self, person: &TrackedPerson) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO tracked_people (id, first_name, last_name, email, phone, date_of_birth, account_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                date_of_birth = EXCLUDED.date_of_birth,
                account_id = EXCLUDED.account_id",
        )
        .bind(person.id)
        .bind(&person.first_name)
        .bind(&person.last_name)
        .bind(&person.email)
        .bind(&person.phone)
        .bind(person.date_of_birth)
        .bind(person.account_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TrackedCaseRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TrackedCase>, DatabaseError> {
        let sql = format!("{} WHERE c.id = $1", CASE_SELECT);
        sqlx::query_as::<_, CaseRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(TrackedCase::try_from)
            .transpose()
    }

    async fn find_by_department_id(&self, department_id: Uuid) -> Result<Vec<TrackedCase>, DatabaseError> {
        let sql = format!("{} WHERE c.department_id = $1 ORDER BY c.created_at, c.id", CASE_SELECT);
        sqlx::query_as::<_, CaseRow>(&sql)
            .bind(department_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(TrackedCase::try_from)
            .collect()
    }

    async fn find_by_tracked_person(&self, person_id: Uuid) -> Result<Option<TrackedCase>, DatabaseError> {
        let sql = format!(
            "{} WHERE c.tracked_person_id = $1 ORDER BY c.created_at DESC LIMIT 1",
            CASE_SELECT
        );
        sqlx::query_as::<_, CaseRow>(&sql)
            .bind(person_id)
            .fetch_optional(&self.pool)
            .await?
            .map(TrackedCase::try_from)
            .transpose()
    }

    async fn add_comment(&self, case_id: Uuid, comment: &Comment) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO case_comments (case_id, date, text, author) VALUES ($1, $2, $3, $4)")
            .bind(case_id)
            .bind(comment.date)
            .bind(&comment.text)
            .bind(&comment.author)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn resolve_with_comment(
        &self,
        case_id: Uuid,
        item_ids: &[Uuid],
        comment: &Comment,
    ) -> Result<(u64, TrackedCase), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query("SELECT id FROM tracked_cases WHERE id = $1 FOR UPDATE")
            .bind(case_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(DatabaseError::NotFound(format!("case {}", case_id)));
        }

        let resolved = if item_ids.is_empty() {
            0
        } else {
            sqlx::query("UPDATE action_items SET resolved = true WHERE id = ANY($1) AND NOT resolved")
                .bind(item_ids)
                .execute(&mut *tx)
                .await?
                .rows_affected()
        };

        sqlx::query("INSERT INTO case_comments (case_id, date, text, author) VALUES ($1, $2, $3, $4)")
            .bind(case_id)
            .bind(comment.date)
            .bind(&comment.text)
            .bind(&comment.author)
            .execute(&mut *tx)
            .await?;

        let sql = format!("{} WHERE c.id = $1", CASE_SELECT);
        let row = sqlx::query_as::<_, CaseRow>(&sql)
            .bind(case_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((resolved, TrackedCase::try_from(row)?))
    }

    async fn save(&self, case: &TrackedCase) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO tracked_cases (id, tracked_person_id, department_id, case_type, status, quarantine_from, quarantine_to, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (id) DO UPDATE SET
                tracked_person_id = EXCLUDED.tracked_person_id,
                department_id = EXCLUDED.department_id,
                case_type = EXCLUDED.case_type,
                status = EXCLUDED.status,
                quarantine_from = EXCLUDED.quarantine_from,
                quarantine_to = EXCLUDED.quarantine_to",
        )
        .bind(case.id)
        .bind(case.tracked_person_id)
        .bind(case.department_id)
        .bind(case.case_type.as_str())
        .bind(case.status.as_str())
        .bind(case.quarantine.map(|q| q.from))
        .bind(case.quarantine.map(|q| q.to))
        .bind(case.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM tracked_case_origins WHERE case_id = $1")
            .bind(case.id)
            .execute(&mut *tx)
            .await?;
        for (position, origin) in case.origin_case_ids.iter().enumerate() {
            sqlx::query("INSERT INTO tracked_case_origins (case_id, origin_case_id, position) VALUES ($1, $2, $3)")
                .bind(case.id)
                .bind(origin)
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM case_comments WHERE case_id = $1")
            .bind(case.id)
            .execute(&mut *tx)
            .await?;
        for comment in &case.comments {
            sqlx::query("INSERT INTO case_comments (case_id, date, text, author) VALUES ($1, $2, $3, $4)")
                .bind(case.id)
                .bind(comment.date)
                .bind(&comment.text)
                .bind(&comment.author)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ActionItemRepository for PgStore {
    async fn find_by_tracked_person(&self, person_id: Uuid) -> Result<Vec<ActionItem>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM action_items WHERE tracked_person_id = $1 ORDER BY created_at, id",
            ITEM_COLUMNS
        );
        sqlx::query_as::<_, ItemRow>(&sql)
            .bind(person_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(ActionItem::try_from)
            .collect()
    }

    async fn find_unresolved_by_tracked_person(&self, person_id: Uuid) -> Result<Vec<ActionItem>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM action_items WHERE tracked_person_id = $1 AND NOT resolved ORDER BY created_at, id",
            ITEM_COLUMNS
        );
        sqlx::query_as::<_, ItemRow>(&sql)
            .bind(person_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(ActionItem::try_from)
            .collect()
    }

    async fn resolve(&self, ids: &[Uuid]) -> Result<u64, DatabaseError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("UPDATE action_items SET resolved = true WHERE id = ANY($1) AND NOT resolved")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn save(&self, item: &ActionItem) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO action_items (id, tracked_person_id, case_id, item_type, description_code, description_arguments, resolved, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (id) DO UPDATE SET
                item_type = EXCLUDED.item_type,
                description_code = EXCLUDED.description_code,
                description_arguments = EXCLUDED.description_arguments,
                resolved = EXCLUDED.resolved",
        )
        .bind(item.id)
        .bind(item.tracked_person_id)
        .bind(item.case_id)
        .bind(item.item_type.as_str())
        .bind(&item.description.code)
        .bind(&item.description.arguments)
        .bind(item.resolved)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
