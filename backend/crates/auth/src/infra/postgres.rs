//! PostgreSQL Repository Implementation

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use kernel::pagination::{PageRequest, Paginated};
use platform::password::HashedPassword;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    account_role::AccountRole, ban_state::BanState, email::Email, handle::Handle,
};
use crate::error::{AuthError, AuthResult};

const ACCOUNT_COLUMNS: &str = r#"
    account_id,
    handle,
    email,
    password_hash,
    role,
    is_banned,
    ban_reason,
    ban_expires_at,
    bio,
    avatar,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed account repository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a unique violation on insert or update to the matching domain error
fn map_unique_violation(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return match db_err.constraint() {
                Some(c) if c.contains("email") => AuthError::EmailTaken,
                _ => AuthError::HandleTaken,
            };
        }
    }
    AuthError::Database(err)
}

impl AccountRepository for PgAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id,
                handle,
                handle_canonical,
                email,
                password_hash,
                role,
                is_banned,
                ban_reason,
                ban_expires_at,
                bio,
                avatar,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.handle.original())
        .bind(account.handle.canonical())
        .bind(account.email.as_str())
        .bind(account.password_hash.as_phc_string())
        .bind(account.role.id())
        .bind(account.ban.is_banned())
        .bind(account.ban.reason())
        .bind(account.ban.expires_at())
        .bind(account.bio.as_deref())
        .bind(account.avatar.as_deref())
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = $1"
        ))
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_ids(&self, account_ids: &[AccountId]) -> AuthResult<Vec<Account>> {
        if account_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = account_ids.iter().map(|id| id.into_uuid()).collect();
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = ANY($1)"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_id = rows
            .into_iter()
            .map(|row| row.into_account().map(|a| (a.account_id, a)))
            .collect::<AuthResult<HashMap<_, _>>>()?;

        Ok(account_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect())
    }

    async fn find_by_handle(&self, handle: &Handle) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE handle_canonical = $1"
        ))
        .bind(handle.canonical())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn update_profile(&self, account: &Account) -> AuthResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                handle = $2,
                handle_canonical = $3,
                email = $4,
                bio = $5,
                avatar = $6,
                updated_at = $7
            WHERE account_id = $1
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.handle.original())
        .bind(account.handle.canonical())
        .bind(account.email.as_str())
        .bind(account.bio.as_deref())
        .bind(account.avatar.as_deref())
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_ban(&self, account_id: &AccountId, ban: &BanState) -> AuthResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                is_banned = $2,
                ban_reason = $3,
                ban_expires_at = $4,
                updated_at = NOW()
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(ban.is_banned())
        .bind(ban.reason())
        .bind(ban.expires_at())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn lift_expired_ban(
        &self,
        account_id: &AccountId,
        now: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                is_banned = FALSE,
                ban_reason = NULL,
                ban_expires_at = NULL,
                updated_at = $2
            WHERE account_id = $1
              AND is_banned
              AND ban_expires_at IS NOT NULL
              AND ban_expires_at <= $2
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> AuthResult<Paginated<Account>> {
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        const FILTER: &str = r#"
            ($1::text IS NULL
             OR strpos(handle_canonical, $1) > 0
             OR strpos(email, $1) > 0)
        "#;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM accounts WHERE {FILTER}"
        ))
        .bind(needle.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            SELECT {ACCOUNT_COLUMNS} FROM accounts
            WHERE {FILTER}
            ORDER BY created_at DESC, account_id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(needle.as_deref())
        .bind(i64::from(page.limit))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(AccountRow::into_account)
            .collect::<AuthResult<Vec<_>>>()?;

        Ok(Paginated::new(
            items,
            u64::try_from(total).unwrap_or_default(),
            page,
        ))
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    handle: String,
    email: String,
    password_hash: String,
    role: i16,
    is_banned: bool,
    ban_reason: Option<String>,
    ban_expires_at: Option<DateTime<Utc>>,
    bio: Option<String>,
    avatar: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let role = AccountRole::from_id(self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid role id: {}", self.role)))?;
        let password_hash = HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(Account {
            account_id: AccountId::from_uuid(self.account_id),
            handle: Handle::from_db(self.handle),
            email: Email::from_db(self.email),
            password_hash,
            role,
            ban: BanState::from_db(self.is_banned, self.ban_reason, self.ban_expires_at),
            bio: self.bio,
            avatar: self.avatar,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
