use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;
use crate::database::models::{Contact, ContactPatch, NewContact, NewUser, User};
use crate::database::store::{ContactStore, Store, UserStore};
use crate::types::{ContactId, UserId};

/// Tables this service needs. Applied with IF NOT EXISTS on startup;
/// there is no versioned migration history.
const BOOTSTRAP_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS contacts (
        id         UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        user_id    UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        name       TEXT NOT NULL,
        phone      TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS contacts_user_id_idx ON contacts (user_id)",
];

const CONTACT_COLUMNS: &str = "id, user_id, name, phone, created_at, updated_at";

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the tables and index if they are missing
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        for statement in BOOTSTRAP_STATEMENTS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema ready");
        Ok(())
    }
}

fn map_unique_violation(err: sqlx::Error, what: &str) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DatabaseError::UniqueViolation(what.to_string());
        }
    }
    DatabaseError::Sqlx(err)
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2)
             RETURNING id, email, password_hash, created_at",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "users.email"))
    }
}

#[async_trait]
impl ContactStore for PgStore {
    async fn insert_contact(&self, owner: UserId, contact: NewContact) -> Result<Contact, DatabaseError> {
        let sql = format!(
            "INSERT INTO contacts (user_id, name, phone) VALUES ($1, $2, $3) RETURNING {}",
            CONTACT_COLUMNS
        );
        let row = sqlx::query_as::<_, Contact>(&sql)
            .bind(owner)
            .bind(&contact.name)
            .bind(&contact.phone)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_contacts(&self, owner: UserId, search: Option<&str>) -> Result<Vec<Contact>, DatabaseError> {
        // strpos keeps the term literal; LIKE would treat % and _ as wildcards
        let sql = format!(
            "SELECT {} FROM contacts
             WHERE user_id = $1
             AND ($2::text IS NULL
                  OR strpos(lower(name), lower($2)) > 0
                  OR strpos(lower(phone), lower($2)) > 0)",
            CONTACT_COLUMNS
        );
        let rows = sqlx::query_as::<_, Contact>(&sql)
            .bind(owner)
            .bind(search)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn find_contact(&self, owner: UserId, id: ContactId) -> Result<Option<Contact>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM contacts WHERE id = $1 AND user_id = $2",
            CONTACT_COLUMNS
        );
        let row = sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn update_contact(
        &self,
        owner: UserId,
        id: ContactId,
        patch: &ContactPatch,
    ) -> Result<Option<Contact>, DatabaseError> {
        let sql = format!(
            "UPDATE contacts
             SET name = COALESCE($3, name),
                 phone = COALESCE($4, phone),
                 updated_at = now()
             WHERE id = $1 AND user_id = $2
             RETURNING {}",
            CONTACT_COLUMNS
        );
        let row = sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .bind(owner)
            .bind(patch.name.as_deref())
            .bind(patch.phone.as_deref())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn delete_contact(&self, owner: UserId, id: ContactId) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}
