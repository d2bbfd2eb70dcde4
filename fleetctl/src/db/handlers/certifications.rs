//! Database repository for driver certifications.
//!
//! Certifications are dependent records: they reference their driver by external id and are
//! listed per driver. Removing a driver row cascades to its certifications, but drivers are only
//! ever soft-deleted so certifications outlive a deactivated driver.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Connection, FromRow, PgConnection};
use tracing::instrument;

use crate::db::{
    engine::{FilterComposer, Page, PageRequest, PartialUpdate, StatusEnum, StoredEnum, lifecycle},
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::drivers::{
        CertificationCreateDBRequest, CertificationDBResponse, CertificationField, CertificationFilter, CertificationStatus,
        CertificationUpdateDBRequest,
    },
};
use crate::types::{CertificationId, DriverId, abbrev_uuid};

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Certification {
    pub external_id: CertificationId,
    pub driver_id: DriverId,
    pub certification_name: String,
    pub issued_by: String,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Certification> for CertificationDBResponse {
    type Error = DbError;

    fn try_from(c: Certification) -> Result<Self> {
        Ok(Self {
            id: c.external_id,
            driver_id: c.driver_id,
            certification_name: c.certification_name,
            issued_by: c.issued_by,
            issue_date: c.issue_date,
            expiry_date: c.expiry_date,
            status: CertificationStatus::from_stored(&c.status)?,
            created_at: c.created_at,
            updated_at: c.updated_at,
        })
    }
}

/// List filter for one driver's certifications.
#[derive(Debug, Clone)]
pub struct DriverCertificationFilter {
    pub driver_id: DriverId,
    pub filter: CertificationFilter,
}

pub struct Certifications<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Certifications<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Certifications still marked active or expired whose expiry date has passed, optionally
    /// only those that expired within the last `expired_since_days` days.
    #[instrument(skip(self, page), err)]
    pub async fn list_expired(&mut self, expired_since_days: Option<i32>, page: &PageRequest) -> Result<Page<CertificationDBResponse>> {
        let limit = page.limit();
        let mut query = FilterComposer::new("SELECT * FROM driver_certifications", "internal_id")
            .any_of(
                "status",
                vec![
                    CertificationStatus::Active.as_str().to_string(),
                    CertificationStatus::Expired.as_str().to_string(),
                ],
            )
            .expired_within_days("expiry_date", expired_since_days)
            .before_cursor(page.cursor()?)
            .paginate(limit);

        let rows = query.build_query_as::<Certification>().fetch_all(&mut *self.db).await?;
        Page::from_overfetch(rows, limit, |c| c.created_at).try_map(TryInto::try_into)
    }
}

async fn fetch(conn: &mut PgConnection, id: CertificationId) -> Result<Option<CertificationDBResponse>> {
    let certification = sqlx::query_as::<_, Certification>("SELECT * FROM driver_certifications WHERE external_id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    certification.map(TryInto::try_into).transpose()
}

#[async_trait::async_trait]
impl<'c> Repository for Certifications<'c> {
    type CreateRequest = CertificationCreateDBRequest;
    type UpdateRequest = CertificationUpdateDBRequest;
    type Response = CertificationDBResponse;
    type Filter = DriverCertificationFilter;

    #[instrument(skip(self, request), fields(driver_id = %abbrev_uuid(&request.driver_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;

        let certification = sqlx::query_as::<_, Certification>(
            r#"
            INSERT INTO driver_certifications (
                internal_id, external_id, driver_id, certification_name, issued_by, issue_date,
                expiry_date, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(request.internal_id)
        .bind(request.external_id)
        .bind(request.driver_id)
        .bind(&request.certification_name)
        .bind(&request.issued_by)
        .bind(request.issue_date)
        .bind(request.expiry_date)
        .bind(CertificationStatus::INITIAL.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        certification.try_into()
    }

    #[instrument(skip(self), fields(certification_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: CertificationId) -> Result<Option<Self::Response>> {
        fetch(&mut *self.db, id).await
    }

    #[instrument(skip(self, filter, page), fields(driver_id = %abbrev_uuid(&filter.driver_id)), err)]
    async fn list(&mut self, filter: &Self::Filter, page: &PageRequest) -> Result<Page<Self::Response>> {
        let limit = page.limit();
        let mut query = FilterComposer::new("SELECT * FROM driver_certifications", "internal_id")
            .eq("driver_id", "UUID", Some(filter.driver_id))
            .eq("status", "TEXT", filter.filter.status.map(|s| s.as_str()))
            .within_days("expiry_date", filter.filter.expiring_within_days)
            .before_cursor(page.cursor()?)
            .paginate(limit);

        let rows = query.build_query_as::<Certification>().fetch_all(&mut *self.db).await?;
        Page::from_overfetch(rows, limit, |c| c.created_at).try_map(TryInto::try_into)
    }

    #[instrument(skip(self, request), fields(certification_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: CertificationId, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut update = PartialUpdate::new("driver_certifications", &request.mask);
        update
            .text(CertificationField::CertificationName, &request.certification_name)
            .text(CertificationField::IssuedBy, &request.issued_by)
            .required(CertificationField::IssueDate, request.issue_date)?
            .nullable(CertificationField::ExpiryDate, request.expiry_date);

        let mut tx = self.db.begin().await?;
        update.execute(&mut *tx, id).await?;
        let certification = fetch(&mut *tx, id).await?.ok_or(DbError::NotFound)?;

        // Checked against the merged row so a change to either date is covered
        if certification.expiry_date.is_some_and(|expiry| expiry < certification.issue_date) {
            // dropping the transaction rolls the write back
            return Err(DbError::invalid_argument("expiry_date cannot be before issue_date"));
        }
        tx.commit().await?;

        Ok(certification)
    }

    #[instrument(skip(self), fields(certification_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: CertificationId) -> Result<()> {
        lifecycle::soft_delete::<CertificationStatus>(&mut *self.db, id).await
    }
}
