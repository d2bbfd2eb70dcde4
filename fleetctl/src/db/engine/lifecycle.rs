//! Status writes: guarded transitions and soft deletion.

use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

use super::transitions::StatusEnum;
use crate::db::errors::{DbError, Result};
use crate::types::abbrev_uuid;

/// Move a row to its soft-deleted status. A row that is missing and a row that is already
/// soft-deleted both report `NotFound`.
#[instrument(skip(conn), fields(table = S::TABLE, id = %abbrev_uuid(&id)), err)]
pub async fn soft_delete<S: StatusEnum>(conn: &mut PgConnection, id: Uuid) -> Result<()> {
    let sql = format!(
        "UPDATE {} SET status = $1, updated_at = clock_timestamp() WHERE external_id = $2 AND status <> $1",
        S::TABLE
    );
    let result = sqlx::query(&sql)
        .bind(S::SOFT_DELETED.as_str())
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Soft-delete a row only while it still holds `expected`. Callers that refuse deletion from
/// some statuses check `expected` first; a concurrent status change turns into
/// `FailedPrecondition` instead of deleting past the check.
#[instrument(skip(conn), fields(table = S::TABLE, id = %abbrev_uuid(&id), from = %expected), err)]
pub async fn soft_delete_from<S: StatusEnum>(conn: &mut PgConnection, id: Uuid, expected: S) -> Result<()> {
    let sql = format!(
        "UPDATE {} SET status = $1, updated_at = clock_timestamp() WHERE external_id = $2 AND status = $3 AND status <> $1",
        S::TABLE
    );
    let result = sqlx::query(&sql)
        .bind(S::SOFT_DELETED.as_str())
        .bind(id)
        .bind(expected.as_str())
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 1 {
        return Ok(());
    }

    match current_status::<S>(conn, id).await? {
        None => Err(DbError::NotFound),
        Some(actual) if actual == S::SOFT_DELETED => Err(DbError::NotFound),
        Some(actual) => Err(DbError::failed_precondition(format!(
            "status changed concurrently: expected {expected}, found {actual}"
        ))),
    }
}

/// Current status of a row, `None` if the row does not exist.
pub async fn current_status<S: StatusEnum>(conn: &mut PgConnection, id: Uuid) -> Result<Option<S>> {
    let sql = format!("SELECT status FROM {} WHERE external_id = $1", S::TABLE);
    let status: Option<String> = sqlx::query_scalar(&sql).bind(id).fetch_optional(&mut *conn).await?;
    status.as_deref().map(S::from_stored).transpose()
}

/// Write `to` only if the row still holds `expected`. The edge check and any business guards
/// ran against `expected`; if another writer changed the status since, nothing is written and
/// the caller gets `FailedPrecondition`.
#[instrument(skip(conn), fields(table = S::TABLE, id = %abbrev_uuid(&id), from = %expected, to = %to), err)]
pub async fn compare_and_set_status<S: StatusEnum>(conn: &mut PgConnection, id: Uuid, expected: S, to: S) -> Result<()> {
    let sql = format!(
        "UPDATE {} SET status = $1, updated_at = clock_timestamp() WHERE external_id = $2 AND status = $3",
        S::TABLE
    );
    let result = sqlx::query(&sql)
        .bind(to.as_str())
        .bind(id)
        .bind(expected.as_str())
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 1 {
        return Ok(());
    }

    match current_status::<S>(conn, id).await? {
        None => Err(DbError::NotFound),
        Some(actual) => Err(DbError::failed_precondition(format!(
            "status changed concurrently: expected {expected}, found {actual}"
        ))),
    }
}
