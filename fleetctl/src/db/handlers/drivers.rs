//! Database repository for drivers.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Connection, FromRow, PgConnection};
use tracing::instrument;

use crate::db::{
    engine::{FilterComposer, Page, PageRequest, PartialUpdate, StatusEnum, StoredEnum, lifecycle},
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::drivers::{
        DriverCreateDBRequest, DriverDBResponse, DriverField, DriverFilter, DriverStatus, DriverUpdateDBRequest, LicenseClass,
    },
};
use crate::types::{DriverId, UserId, abbrev_uuid};

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Driver {
    pub external_id: DriverId,
    pub user_id: UserId,
    pub license_number: String,
    pub license_class: String,
    pub license_expiry: NaiveDate,
    pub experience_years: i32,
    pub phone_number: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub status: String,
    pub hire_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Driver> for DriverDBResponse {
    type Error = DbError;

    fn try_from(d: Driver) -> Result<Self> {
        Ok(Self {
            id: d.external_id,
            user_id: d.user_id,
            license_number: d.license_number,
            license_class: LicenseClass::from_stored(&d.license_class)?,
            license_expiry: d.license_expiry,
            experience_years: d.experience_years,
            phone_number: d.phone_number,
            emergency_contact_name: d.emergency_contact_name,
            emergency_contact_phone: d.emergency_contact_phone,
            status: DriverStatus::from_stored(&d.status)?,
            hire_date: d.hire_date,
            created_at: d.created_at,
            updated_at: d.updated_at,
        })
    }
}

pub struct Drivers<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Drivers<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn get_by_user_id(&mut self, user_id: UserId) -> Result<Option<DriverDBResponse>> {
        let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *self.db)
            .await?;
        driver.map(TryInto::try_into).transpose()
    }

    #[instrument(skip(self, license_number), err)]
    pub async fn get_by_license_number(&mut self, license_number: &str) -> Result<Option<DriverDBResponse>> {
        let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE license_number = $1")
            .bind(license_number)
            .fetch_optional(&mut *self.db)
            .await?;
        driver.map(TryInto::try_into).transpose()
    }

    /// Active drivers whose licence expires between today and `days_ahead` days from now.
    #[instrument(skip(self, page), err)]
    pub async fn list_expiring_licenses(&mut self, days_ahead: i32, page: &PageRequest) -> Result<Page<DriverDBResponse>> {
        self.list(
            &DriverFilter {
                status: Some(DriverStatus::Active),
                license_expiring_within_days: Some(days_ahead),
                ..Default::default()
            },
            page,
        )
        .await
    }

    #[instrument(skip(self), fields(driver_id = %abbrev_uuid(&id)), err)]
    pub async fn update_status(&mut self, id: DriverId, expected: DriverStatus, to: DriverStatus) -> Result<DriverDBResponse> {
        lifecycle::compare_and_set_status(&mut *self.db, id, expected, to).await?;
        fetch(&mut *self.db, id).await?.ok_or(DbError::NotFound)
    }

    /// Move the driver from `expected` to ACTIVE. The licence is checked in the same statement,
    /// so a licence shortened after the caller read the row still blocks activation.
    #[instrument(skip(self), fields(driver_id = %abbrev_uuid(&id), from = %expected), err)]
    pub async fn activate(&mut self, id: DriverId, expected: DriverStatus, today: NaiveDate) -> Result<DriverDBResponse> {
        let result = sqlx::query(
            "UPDATE drivers SET status = $1, updated_at = clock_timestamp() \
             WHERE external_id = $2 AND status = $3 AND license_expiry >= $4",
        )
        .bind(DriverStatus::Active.as_str())
        .bind(id)
        .bind(expected.as_str())
        .bind(today)
        .execute(&mut *self.db)
        .await?;

        let driver = fetch(&mut *self.db, id).await?.ok_or(DbError::NotFound)?;
        if result.rows_affected() == 1 {
            return Ok(driver);
        }
        if driver.status != expected {
            return Err(DbError::failed_precondition(format!(
                "status changed concurrently: expected {expected}, found {}",
                driver.status
            )));
        }
        Err(DbError::failed_precondition("cannot activate driver with expired license"))
    }
}

async fn fetch(conn: &mut PgConnection, id: DriverId) -> Result<Option<DriverDBResponse>> {
    let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE external_id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    driver.map(TryInto::try_into).transpose()
}

#[async_trait::async_trait]
impl<'c> Repository for Drivers<'c> {
    type CreateRequest = DriverCreateDBRequest;
    type UpdateRequest = DriverUpdateDBRequest;
    type Response = DriverDBResponse;
    type Filter = DriverFilter;

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;

        let driver = sqlx::query_as::<_, Driver>(
            r#"
            INSERT INTO drivers (
                internal_id, external_id, user_id, license_number, license_class, license_expiry,
                experience_years, phone_number, emergency_contact_name, emergency_contact_phone,
                status, hire_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, COALESCE($12, CURRENT_DATE))
            RETURNING *
            "#,
        )
        .bind(request.internal_id)
        .bind(request.external_id)
        .bind(request.user_id)
        .bind(&request.license_number)
        .bind(request.license_class.as_str())
        .bind(request.license_expiry)
        .bind(request.experience_years)
        .bind(&request.phone_number)
        .bind(&request.emergency_contact_name)
        .bind(&request.emergency_contact_phone)
        .bind(DriverStatus::INITIAL.as_str())
        .bind(request.hire_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        driver.try_into()
    }

    #[instrument(skip(self), fields(driver_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: DriverId) -> Result<Option<Self::Response>> {
        fetch(&mut *self.db, id).await
    }

    #[instrument(skip(self, filter, page), fields(page_size = page.limit()), err)]
    async fn list(&mut self, filter: &Self::Filter, page: &PageRequest) -> Result<Page<Self::Response>> {
        let limit = page.limit();
        let mut query = FilterComposer::new("SELECT * FROM drivers", "internal_id")
            .eq("status", "TEXT", filter.status.map(|s| s.as_str()))
            .eq("license_class", "TEXT", filter.license_class.map(|c| c.as_str()))
            .within_days("license_expiry", filter.license_expiring_within_days)
            .before_cursor(page.cursor()?)
            .paginate(limit);

        let rows = query.build_query_as::<Driver>().fetch_all(&mut *self.db).await?;
        Page::from_overfetch(rows, limit, |d| d.created_at).try_map(TryInto::try_into)
    }

    #[instrument(skip(self, request), fields(driver_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: DriverId, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut update = PartialUpdate::new("drivers", &request.mask);
        update
            .text(DriverField::LicenseNumber, &request.license_number)
            .stored(DriverField::LicenseClass, request.license_class)?
            .required(DriverField::LicenseExpiry, request.license_expiry)?
            .int(DriverField::ExperienceYears, request.experience_years)
            .text(DriverField::PhoneNumber, &request.phone_number)
            .text(DriverField::EmergencyContactName, &request.emergency_contact_name)
            .text(DriverField::EmergencyContactPhone, &request.emergency_contact_phone)
            .required(DriverField::HireDate, request.hire_date)?;

        let mut tx = self.db.begin().await?;
        update.execute(&mut *tx, id).await?;
        let driver = fetch(&mut *tx, id).await?.ok_or(DbError::NotFound)?;
        tx.commit().await?;

        Ok(driver)
    }

    #[instrument(skip(self), fields(driver_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: DriverId) -> Result<()> {
        lifecycle::soft_delete::<DriverStatus>(&mut *self.db, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::engine::FieldMask;
    use crate::db::errors::ErrorKind;
    use crate::test_utils::{create_test_driver, driver_request, test_ids};
    use chrono::Duration;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_driver(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let mut request = driver_request(&ids, "DL1234567");
        request.hire_date = None;

        let mut repo = Drivers::new(&mut conn);
        let driver = repo.create(&request).await.unwrap();

        assert_eq!(driver.id, request.external_id);
        assert_eq!(driver.status, DriverStatus::PendingVerification);
        assert_eq!(driver.hire_date, Utc::now().date_naive());

        assert_eq!(repo.get_by_user_id(request.user_id).await.unwrap(), Some(driver.clone()));
        assert_eq!(repo.get_by_license_number("DL1234567").await.unwrap(), Some(driver));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_license_number(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let first = create_test_driver(&mut conn, &ids, "DL1234567").await;

        let mut repo = Drivers::new(&mut conn);
        let err = repo.create(&driver_request(&ids, "DL1234567")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert!(matches!(
            err,
            DbError::UniqueViolation { ref constraint, .. } if constraint.as_deref() == Some("drivers_license_number_unique")
        ));
        assert_eq!(repo.get_by_id(first.id).await.unwrap(), Some(first));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let today = Utc::now().date_naive();

        let mut soon = driver_request(&ids, "DL0000001");
        soon.license_expiry = today + Duration::days(10);
        soon.license_class = LicenseClass::ClassC;
        let mut later = driver_request(&ids, "DL0000002");
        later.license_expiry = today + Duration::days(400);

        let mut repo = Drivers::new(&mut conn);
        let soon = repo.create(&soon).await.unwrap();
        let later = repo.create(&later).await.unwrap();
        repo.update_status(soon.id, DriverStatus::PendingVerification, DriverStatus::Active)
            .await
            .unwrap();

        let page = PageRequest::default();
        let expiring = repo
            .list(
                &DriverFilter {
                    license_expiring_within_days: Some(30),
                    ..Default::default()
                },
                &page,
            )
            .await
            .unwrap();
        assert_eq!(expiring.items.iter().map(|d| d.id).collect::<Vec<_>>(), vec![soon.id]);

        let class_c = repo
            .list(
                &DriverFilter {
                    license_class: Some(LicenseClass::ClassC),
                    ..Default::default()
                },
                &page,
            )
            .await
            .unwrap();
        assert_eq!(class_c.items.len(), 1);

        let pending = repo
            .list(
                &DriverFilter {
                    status: Some(DriverStatus::PendingVerification),
                    ..Default::default()
                },
                &page,
            )
            .await
            .unwrap();
        assert_eq!(pending.items.iter().map(|d| d.id).collect::<Vec<_>>(), vec![later.id]);

        let active_expiring = repo.list_expiring_licenses(30, &page).await.unwrap();
        assert_eq!(active_expiring.items.len(), 1);
        assert_eq!(active_expiring.items[0].id, soon.id);
        assert!(repo.list_expiring_licenses(5, &page).await.unwrap().items.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_driver(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let driver = create_test_driver(&mut conn, &ids, "DL7654321").await;

        let mut repo = Drivers::new(&mut conn);
        let updated = repo
            .update(
                driver.id,
                &DriverUpdateDBRequest {
                    phone_number: Some("+254700000001".to_string()),
                    experience_years: Some(9),
                    license_number: Some("DL-SHOULD-NOT-APPLY".to_string()),
                    mask: FieldMask::fields(&[DriverField::PhoneNumber, DriverField::ExperienceYears]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.phone_number, "+254700000001");
        assert_eq!(updated.experience_years, 9);
        assert_eq!(updated.license_number, "DL7654321");
        assert_eq!(updated.status, driver.status);

        let err = repo
            .update(
                driver.id,
                &DriverUpdateDBRequest {
                    mask: FieldMask::fields(&[DriverField::LicenseExpiry]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_soft_delete_driver(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let driver = create_test_driver(&mut conn, &ids, "DL5550000").await;

        let mut repo = Drivers::new(&mut conn);
        repo.delete(driver.id).await.unwrap();
        assert_eq!(
            repo.get_by_id(driver.id).await.unwrap().unwrap().status,
            DriverStatus::Inactive
        );
        assert!(matches!(repo.delete(driver.id).await, Err(DbError::NotFound)));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_activate_rechecks_license_expiry(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let driver = create_test_driver(&mut conn, &ids, "DL6660000").await;
        let today = Utc::now().date_naive();

        // licence shortened after the caller read a valid one
        sqlx::query("UPDATE drivers SET license_expiry = $1 WHERE external_id = $2")
            .bind(today - Duration::days(1))
            .bind(driver.id)
            .execute(&mut *conn)
            .await
            .unwrap();

        let mut repo = Drivers::new(&mut conn);
        let err = repo
            .activate(driver.id, DriverStatus::PendingVerification, today)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FailedPrecondition);
        assert!(err.to_string().contains("expired license"), "{err}");
        assert_eq!(
            repo.get_by_id(driver.id).await.unwrap().unwrap().status,
            DriverStatus::PendingVerification
        );

        sqlx::query("UPDATE drivers SET license_expiry = $1 WHERE external_id = $2")
            .bind(today)
            .bind(driver.id)
            .execute(&mut *repo.db)
            .await
            .unwrap();
        let active = repo
            .activate(driver.id, DriverStatus::PendingVerification, today)
            .await
            .unwrap();
        assert_eq!(active.status, DriverStatus::Active);

        let err = repo
            .activate(driver.id, DriverStatus::PendingVerification, today)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("status changed concurrently"), "{err}");
        assert!(matches!(
            repo.activate(DriverId::new_v4(), DriverStatus::PendingVerification, today).await,
            Err(DbError::NotFound)
        ));
    }
}
