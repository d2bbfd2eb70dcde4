//! Database models for users.

use chrono::{DateTime, Utc};

use crate::db::engine::{FieldMask, MaskField, StatusEnum};
use crate::stored_enum;
use crate::types::UserId;

stored_enum! {
    pub enum UserStatus {
        Active => "ACTIVE",
        Suspended => "SUSPENDED",
        Inactive => "INACTIVE",
    }
}

impl StatusEnum for UserStatus {
    const INITIAL: Self = UserStatus::Active;
    const SOFT_DELETED: Self = UserStatus::Inactive;
    const TABLE: &'static str = "users";

    fn successors(self) -> &'static [Self] {
        use UserStatus::*;
        match self {
            Active => &[Suspended, Inactive],
            Suspended => &[Active, Inactive],
            Inactive => &[Active],
        }
    }
}

/// How a user authenticates. Exactly one method per user, enforced by a check constraint.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Argon2 PHC string, never the plaintext
    Password(String),
    /// Subject identifier from the external identity provider
    Sso(String),
}

impl AuthMethod {
    pub fn kind(&self) -> &'static str {
        match self {
            AuthMethod::Password(_) => "password",
            AuthMethod::Sso(_) => "sso",
        }
    }

    pub fn sso_id(&self) -> Option<&str> {
        match self {
            AuthMethod::Sso(id) => Some(id),
            AuthMethod::Password(_) => None,
        }
    }

    /// Split into `(password_hash, sso_id)` columns.
    pub fn columns(&self) -> (Option<&str>, Option<&str>) {
        match self {
            AuthMethod::Password(hash) => (Some(hash), None),
            AuthMethod::Sso(id) => (None, Some(id)),
        }
    }
}

// Keep password hashes out of logs
impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMethod::Password(_) => f.write_str("Password(<redacted>)"),
            AuthMethod::Sso(id) => f.debug_tuple("Sso").field(id).finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    FirstName,
    LastName,
    Email,
}

impl MaskField for UserField {
    const ALL: &'static [Self] = &[UserField::FirstName, UserField::LastName, UserField::Email];

    fn name(self) -> &'static str {
        match self {
            UserField::FirstName => "first_name",
            UserField::LastName => "last_name",
            UserField::Email => "email",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub internal_id: i64,
    pub external_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub auth: AuthMethod,
    pub terms_accepted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub mask: FieldMask<UserField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserDBResponse {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub auth: AuthMethod,
    pub status: UserStatus,
    pub terms_accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub status: Option<UserStatus>,
    /// Substring of "first_name last_name"
    pub name: Option<String>,
}
