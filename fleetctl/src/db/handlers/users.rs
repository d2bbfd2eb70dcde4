//! Database repository for users.

use chrono::{DateTime, Utc};
use sqlx::{Connection, FromRow, PgConnection};
use tracing::instrument;

use crate::db::{
    engine::{FilterComposer, Page, PageRequest, PartialUpdate, StatusEnum, StoredEnum, lifecycle},
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::users::{AuthMethod, UserCreateDBRequest, UserDBResponse, UserField, UserFilter, UserStatus, UserUpdateDBRequest},
};
use crate::types::{UserId, abbrev_uuid};

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct User {
    pub external_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub sso_id: Option<String>,
    pub status: String,
    pub terms_accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<User> for UserDBResponse {
    type Error = DbError;

    fn try_from(u: User) -> Result<Self> {
        let auth = match (u.password_hash, u.sso_id) {
            (Some(hash), None) => AuthMethod::Password(hash),
            (None, Some(id)) => AuthMethod::Sso(id),
            _ => {
                return Err(DbError::corrupt(format!(
                    "user {} does not have exactly one authentication method",
                    u.external_id
                )));
            }
        };
        Ok(Self {
            id: u.external_id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            auth,
            status: UserStatus::from_stored(&u.status)?,
            terms_accepted_at: u.terms_accepted_at,
            created_at: u.created_at,
            updated_at: u.updated_at,
        })
    }
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Lookup used by password authentication. Emails are matched exactly.
    #[instrument(skip(self, email), err)]
    pub async fn get_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;
        user.map(TryInto::try_into).transpose()
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_sso_id(&mut self, sso_id: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE sso_id = $1")
            .bind(sso_id)
            .fetch_optional(&mut *self.db)
            .await?;
        user.map(TryInto::try_into).transpose()
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn update_status(&mut self, id: UserId, expected: UserStatus, to: UserStatus) -> Result<UserDBResponse> {
        lifecycle::compare_and_set_status(&mut *self.db, id, expected, to).await?;
        fetch(&mut *self.db, id).await?.ok_or(DbError::NotFound)
    }
}

async fn fetch(conn: &mut PgConnection, id: UserId) -> Result<Option<UserDBResponse>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE external_id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    user.map(TryInto::try_into).transpose()
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(auth = request.auth.kind()), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let (password_hash, sso_id) = request.auth.columns();
        let mut tx = self.db.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                internal_id, external_id, first_name, last_name, email, password_hash, sso_id,
                status, terms_accepted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(request.internal_id)
        .bind(request.external_id)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.email)
        .bind(password_hash)
        .bind(sso_id)
        .bind(UserStatus::INITIAL.as_str())
        .bind(request.terms_accepted_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        user.try_into()
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: UserId) -> Result<Option<Self::Response>> {
        fetch(&mut *self.db, id).await
    }

    #[instrument(skip(self, filter, page), fields(page_size = page.limit()), err)]
    async fn list(&mut self, filter: &Self::Filter, page: &PageRequest) -> Result<Page<Self::Response>> {
        let limit = page.limit();
        let mut query = FilterComposer::new("SELECT * FROM users", "internal_id")
            .eq("status", "TEXT", filter.status.map(|s| s.as_str()))
            .contains("(first_name || ' ' || last_name)", filter.name.as_deref())
            .before_cursor(page.cursor()?)
            .paginate(limit);

        let rows = query.build_query_as::<User>().fetch_all(&mut *self.db).await?;
        Page::from_overfetch(rows, limit, |u| u.created_at).try_map(TryInto::try_into)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: UserId, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut update = PartialUpdate::new("users", &request.mask);
        update
            .text(UserField::FirstName, &request.first_name)
            .text(UserField::LastName, &request.last_name)
            .text(UserField::Email, &request.email);

        let mut tx = self.db.begin().await?;
        update.execute(&mut *tx, id).await?;
        let user = fetch(&mut *tx, id).await?.ok_or(DbError::NotFound)?;
        tx.commit().await?;

        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: UserId) -> Result<()> {
        lifecycle::soft_delete::<UserStatus>(&mut *self.db, id).await
    }
}
