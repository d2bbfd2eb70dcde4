//! API request/response models for users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::pagination::PageQuery;
use crate::db::engine::FieldMask;
use crate::db::errors::Result;
use crate::db::models::users::{UserDBResponse, UserFilter, UserStatus, UserUpdateDBRequest};
use crate::types::UserId;

/// New user. Exactly one of `password` and `sso_id` must be given.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserCreate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Plaintext; hashed before it is stored
    pub password: Option<String>,
    pub sso_id: Option<String>,
    #[serde(default)]
    pub terms_accepted: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub update_mask: Option<Vec<String>>,
}

impl UserUpdate {
    pub fn into_db_request(self) -> Result<UserUpdateDBRequest> {
        Ok(UserUpdateDBRequest {
            mask: FieldMask::parse(self.update_mask.as_deref())?,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserStatusUpdate {
    pub status: UserStatus,
    #[serde(default)]
    pub reason: String,
}

/// User as returned by the API. The password hash is never included.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// `password` or `sso`
    pub auth_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso_id: Option<String>,
    pub status: UserStatus,
    pub terms_accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(u: UserDBResponse) -> Self {
        Self {
            auth_method: u.auth.kind().to_string(),
            sso_id: u.auth.sso_id().map(str::to_string),
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            status: u.status,
            terms_accepted_at: u.terms_accepted_at,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Email and password for password sign-in
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Query parameters for listing users
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListUsersQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PageQuery,
    pub status: Option<UserStatus>,
    /// Case-insensitive substring of "first_name last_name"
    pub name: Option<String>,
}

impl ListUsersQuery {
    pub fn filter(&self) -> UserFilter {
        UserFilter {
            status: self.status,
            name: self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::users::AuthMethod;

    #[test]
    fn test_response_never_carries_password_hash() {
        let user = UserDBResponse {
            id: UserId::new_v4(),
            first_name: "Wanjiru".to_string(),
            last_name: "Kamau".to_string(),
            email: "wanjiru@example.com".to_string(),
            auth: AuthMethod::Password("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string()),
            status: UserStatus::Active,
            terms_accepted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains(r#""auth_method":"password""#));
        assert!(!json.contains("sso_id"));
    }
}
