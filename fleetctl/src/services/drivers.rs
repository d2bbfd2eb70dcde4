//! Driver and driver certification operations.

use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, instrument};

use super::{acquire, not_found};
use crate::AppState;
use crate::api::models::drivers::{
    CertificationCreate, CertificationUpdate, DriverCreate, DriverUpdate, LicenseVerification, VerifyLicenseRequest,
};
use crate::db::engine::{IdAllocator, Page, PageRequest, Presence, check_transition};
use crate::db::errors::DbError;
use crate::db::handlers::{Certifications, DriverCertificationFilter, Drivers, Repository};
use crate::db::models::drivers::{
    CertificationCreateDBRequest, CertificationDBResponse, CertificationFilter, DriverCreateDBRequest, DriverDBResponse,
    DriverField, DriverFilter, DriverStatus, LicenseClass,
};
use crate::errors::Result;
use crate::types::{CertificationId, DriverId, UserId, abbrev_uuid};

/// Window used by the expiring licences listing when the caller gives none.
pub const DEFAULT_EXPIRY_WINDOW_DAYS: i32 = 30;

const VERIFICATION_SOURCE: &str = "internal_check";

pub struct DriverService<'a> {
    db: &'a PgPool,
    ids: &'a IdAllocator,
    license_expiry_window_days: i32,
}

impl<'a> DriverService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            db: &state.db,
            ids: &state.ids,
            license_expiry_window_days: state.config.license_expiry_window_days,
        }
    }

    #[instrument(skip_all, fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    pub async fn create(&self, request: DriverCreate) -> Result<DriverDBResponse> {
        if request.license_expiry < Utc::now().date_naive() {
            return Err(DbError::invalid_argument("license has already expired").into());
        }

        let mut conn = acquire(self.db).await?;
        let mut drivers = Drivers::new(&mut conn);

        if drivers.get_by_license_number(&request.license_number).await?.is_some() {
            return Err(DbError::already_exists(
                "drivers",
                "drivers_license_number_unique",
                format!("driver with license number {} already exists", request.license_number),
            )
            .into());
        }
        if drivers.get_by_user_id(request.user_id).await?.is_some() {
            return Err(DbError::already_exists(
                "drivers",
                "drivers_user_id_unique",
                format!("user {} already has a driver record", request.user_id),
            )
            .into());
        }

        let (internal_id, external_id) = self.ids.allocate()?;
        let driver = drivers
            .create(&DriverCreateDBRequest {
                internal_id,
                external_id,
                user_id: request.user_id,
                license_number: request.license_number,
                license_class: request.license_class,
                license_expiry: request.license_expiry,
                experience_years: request.experience_years,
                phone_number: request.phone_number,
                emergency_contact_name: request.emergency_contact_name,
                emergency_contact_phone: request.emergency_contact_phone,
                hire_date: request.hire_date,
            })
            .await?;

        info!(driver_id = %abbrev_uuid(&driver.id), "Driver created");
        Ok(driver)
    }

    pub async fn get(&self, id: DriverId) -> Result<DriverDBResponse> {
        let mut conn = acquire(self.db).await?;
        Drivers::new(&mut conn)
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found("Driver", id))
    }

    pub async fn get_by_user(&self, user_id: UserId) -> Result<DriverDBResponse> {
        let mut conn = acquire(self.db).await?;
        Drivers::new(&mut conn)
            .get_by_user_id(user_id)
            .await?
            .ok_or_else(|| not_found("Driver for user", user_id))
    }

    /// `license_expiring_soon` narrows to licences expiring within the configured window.
    pub async fn list(
        &self,
        status: Option<DriverStatus>,
        license_class: Option<LicenseClass>,
        license_expiring_soon: bool,
        page: &PageRequest,
    ) -> Result<Page<DriverDBResponse>> {
        let filter = DriverFilter {
            status,
            license_class,
            license_expiring_within_days: license_expiring_soon.then_some(self.license_expiry_window_days),
        };
        let mut conn = acquire(self.db).await?;
        Ok(Drivers::new(&mut conn).list(&filter, page).await?)
    }

    pub async fn list_active(
        &self,
        license_class: Option<LicenseClass>,
        page: &PageRequest,
    ) -> Result<Page<DriverDBResponse>> {
        self.list(Some(DriverStatus::Active), license_class, false, page).await
    }

    pub async fn list_expiring_licenses(&self, days_ahead: Option<i32>, page: &PageRequest) -> Result<Page<DriverDBResponse>> {
        let days_ahead = days_ahead.unwrap_or(DEFAULT_EXPIRY_WINDOW_DAYS);
        if days_ahead <= 0 {
            return Err(DbError::invalid_argument("days_ahead must be positive").into());
        }
        let mut conn = acquire(self.db).await?;
        Ok(Drivers::new(&mut conn).list_expiring_licenses(days_ahead, page).await?)
    }

    #[instrument(skip(self, update), fields(driver_id = %abbrev_uuid(&id)), err)]
    pub async fn update(&self, id: DriverId, update: DriverUpdate) -> Result<DriverDBResponse> {
        let request = update.into_db_request()?;
        let mut conn = acquire(self.db).await?;
        let mut drivers = Drivers::new(&mut conn);

        let existing = drivers.get_by_id(id).await?.ok_or_else(|| not_found("Driver", id))?;

        let license_change = request.license_number.as_deref().filter(|license| {
            *license != existing.license_number
                && request.mask.includes(DriverField::LicenseNumber, request.license_number.is_present())
        });
        if let Some(license) = license_change {
            if drivers.get_by_license_number(license).await?.is_some_and(|other| other.id != id) {
                return Err(DbError::already_exists(
                    "drivers",
                    "drivers_license_number_unique",
                    format!("driver with license number {license} already exists"),
                )
                .into());
            }
        }

        Ok(drivers.update(id, &request).await?)
    }

    /// Drivers cannot be activated while their licence is expired.
    #[instrument(skip(self, reason), fields(driver_id = %abbrev_uuid(&id), to = %to), err)]
    pub async fn update_status(&self, id: DriverId, to: DriverStatus, reason: &str) -> Result<DriverDBResponse> {
        let mut conn = acquire(self.db).await?;
        let mut drivers = Drivers::new(&mut conn);

        let current = drivers.get_by_id(id).await?.ok_or_else(|| not_found("Driver", id))?;
        check_transition(current.status, to)?;

        let today = Utc::now().date_naive();
        let driver = if to == DriverStatus::Active {
            if current.license_expired(today) {
                return Err(DbError::failed_precondition("cannot activate driver with expired license").into());
            }
            drivers.activate(id, current.status, today).await?
        } else {
            drivers.update_status(id, current.status, to).await?
        };
        info!(from = %current.status, to = %to, reason, "Driver status updated");
        Ok(driver)
    }

    #[instrument(skip(self), fields(driver_id = %abbrev_uuid(&id)), err)]
    pub async fn delete(&self, id: DriverId) -> Result<()> {
        let mut conn = acquire(self.db).await?;
        Drivers::new(&mut conn).delete(id).await?;
        Ok(())
    }

    /// Check the licence on record. A licence number that does not match is reported as invalid
    /// rather than as an error.
    pub async fn verify_license(&self, id: DriverId, request: VerifyLicenseRequest) -> Result<LicenseVerification> {
        let driver = self.get(id).await?;
        let now = Utc::now();

        if let Some(claimed) = request.license_number.as_deref().filter(|n| !n.is_empty()) {
            if claimed != driver.license_number {
                return Ok(LicenseVerification {
                    is_valid: false,
                    is_expired: false,
                    verification_source: VERIFICATION_SOURCE.to_string(),
                    verified_at: now,
                    notes: "License number mismatch".to_string(),
                });
            }
        }

        let today = now.date_naive();
        let is_expired = driver.license_expired(today);
        Ok(LicenseVerification {
            is_valid: !is_expired,
            is_expired,
            verification_source: VERIFICATION_SOURCE.to_string(),
            verified_at: now,
            notes: format!(
                "License status verified. Days until expiry: {}",
                driver.days_until_license_expiry(today)
            ),
        })
    }

    #[instrument(skip(self, request), fields(driver_id = %abbrev_uuid(&driver_id)), err)]
    pub async fn add_certification(
        &self,
        driver_id: DriverId,
        request: CertificationCreate,
    ) -> Result<CertificationDBResponse> {
        if request.expiry_date.is_some_and(|expiry| expiry < request.issue_date) {
            return Err(DbError::invalid_argument("expiry_date cannot be before issue_date").into());
        }

        let mut conn = acquire(self.db).await?;
        Drivers::new(&mut conn)
            .get_by_id(driver_id)
            .await?
            .ok_or_else(|| not_found("Driver", driver_id))?;

        let (internal_id, external_id) = self.ids.allocate()?;
        let certification = Certifications::new(&mut conn)
            .create(&CertificationCreateDBRequest {
                internal_id,
                external_id,
                driver_id,
                certification_name: request.certification_name,
                issued_by: request.issued_by,
                issue_date: request.issue_date,
                expiry_date: request.expiry_date,
            })
            .await?;

        info!(
            certification_id = %abbrev_uuid(&certification.id),
            name = %certification.certification_name,
            "Certification added"
        );
        Ok(certification)
    }

    pub async fn list_certifications(
        &self,
        driver_id: DriverId,
        filter: CertificationFilter,
        page: &PageRequest,
    ) -> Result<Page<CertificationDBResponse>> {
        let mut conn = acquire(self.db).await?;
        Drivers::new(&mut conn)
            .get_by_id(driver_id)
            .await?
            .ok_or_else(|| not_found("Driver", driver_id))?;

        Ok(Certifications::new(&mut conn)
            .list(&DriverCertificationFilter { driver_id, filter }, page)
            .await?)
    }

    #[instrument(skip(self, update), fields(certification_id = %abbrev_uuid(&id)), err)]
    pub async fn update_certification(
        &self,
        id: CertificationId,
        update: CertificationUpdate,
    ) -> Result<CertificationDBResponse> {
        let request = update.into_db_request()?;
        let mut conn = acquire(self.db).await?;
        Ok(Certifications::new(&mut conn).update(id, &request).await?)
    }

    #[instrument(skip(self), fields(certification_id = %abbrev_uuid(&id)), err)]
    pub async fn delete_certification(&self, id: CertificationId) -> Result<()> {
        let mut conn = acquire(self.db).await?;
        Certifications::new(&mut conn).delete(id).await?;
        Ok(())
    }

    pub async fn list_expired_certifications(
        &self,
        expired_since_days: Option<i32>,
        page: &PageRequest,
    ) -> Result<Page<CertificationDBResponse>> {
        let mut conn = acquire(self.db).await?;
        Ok(Certifications::new(&mut conn)
            .list_expired(expired_since_days, page)
            .await?)
    }
}
