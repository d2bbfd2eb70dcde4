//! API request/response models for drivers and driver certifications.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

use super::pagination::PageQuery;
use crate::db::engine::FieldMask;
use crate::db::errors::Result;
use crate::db::models::drivers::{
    CertificationDBResponse, CertificationFilter, CertificationStatus, CertificationUpdateDBRequest, DriverDBResponse,
    DriverStatus, DriverUpdateDBRequest, LicenseClass,
};
use crate::types::{CertificationId, DriverId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DriverCreate {
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub license_number: String,
    pub license_class: LicenseClass,
    pub license_expiry: NaiveDate,
    #[serde(default)]
    pub experience_years: i32,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub emergency_contact_name: String,
    #[serde(default)]
    pub emergency_contact_phone: String,
    /// Defaults to today
    pub hire_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DriverUpdate {
    pub license_number: Option<String>,
    pub license_class: Option<LicenseClass>,
    pub license_expiry: Option<NaiveDate>,
    pub experience_years: Option<i32>,
    pub phone_number: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub update_mask: Option<Vec<String>>,
}

impl DriverUpdate {
    pub fn into_db_request(self) -> Result<DriverUpdateDBRequest> {
        Ok(DriverUpdateDBRequest {
            mask: FieldMask::parse(self.update_mask.as_deref())?,
            license_number: self.license_number,
            license_class: self.license_class,
            license_expiry: self.license_expiry,
            experience_years: self.experience_years,
            phone_number: self.phone_number,
            emergency_contact_name: self.emergency_contact_name,
            emergency_contact_phone: self.emergency_contact_phone,
            hire_date: self.hire_date,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DriverStatusUpdate {
    pub status: DriverStatus,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DriverResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: DriverId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub license_number: String,
    pub license_class: LicenseClass,
    pub license_expiry: NaiveDate,
    pub experience_years: i32,
    pub phone_number: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub status: DriverStatus,
    pub hire_date: NaiveDate,
    pub license_expired: bool,
    /// Negative once the licence has expired
    pub days_until_license_expiry: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DriverDBResponse> for DriverResponse {
    fn from(d: DriverDBResponse) -> Self {
        let today = Utc::now().date_naive();
        Self {
            license_expired: d.license_expired(today),
            days_until_license_expiry: d.days_until_license_expiry(today),
            id: d.id,
            user_id: d.user_id,
            license_number: d.license_number,
            license_class: d.license_class,
            license_expiry: d.license_expiry,
            experience_years: d.experience_years,
            phone_number: d.phone_number,
            emergency_contact_name: d.emergency_contact_name,
            emergency_contact_phone: d.emergency_contact_phone,
            status: d.status,
            hire_date: d.hire_date,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

/// Query parameters for listing drivers
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListDriversQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PageQuery,
    pub status: Option<DriverStatus>,
    pub license_class: Option<LicenseClass>,
    /// Only drivers whose licence expires within the configured window
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[param(value_type = Option<bool>)]
    pub license_expiring_soon: Option<bool>,
}

/// Query parameters for listing drivers whose licence expires soon
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ExpiringLicensesQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PageQuery,
    /// Window in days, defaults to 30
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[param(value_type = Option<i32>, default = 30, minimum = 1)]
    pub days_ahead: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct VerifyLicenseRequest {
    /// When set, must match the licence number on record
    pub license_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LicenseVerification {
    pub is_valid: bool,
    pub is_expired: bool,
    pub verification_source: String,
    pub verified_at: DateTime<Utc>,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CertificationCreate {
    pub certification_name: String,
    #[serde(default)]
    pub issued_by: String,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CertificationUpdate {
    pub certification_name: Option<String>,
    pub issued_by: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub update_mask: Option<Vec<String>>,
}

impl CertificationUpdate {
    pub fn into_db_request(self) -> Result<CertificationUpdateDBRequest> {
        Ok(CertificationUpdateDBRequest {
            mask: FieldMask::parse(self.update_mask.as_deref())?,
            certification_name: self.certification_name,
            issued_by: self.issued_by,
            issue_date: self.issue_date,
            expiry_date: self.expiry_date,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CertificationResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: CertificationId,
    #[schema(value_type = String, format = "uuid")]
    pub driver_id: DriverId,
    pub certification_name: String,
    pub issued_by: String,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub status: CertificationStatus,
    pub is_expired: bool,
    /// Absent for certifications that never expire
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_expiry: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CertificationDBResponse> for CertificationResponse {
    fn from(c: CertificationDBResponse) -> Self {
        let today = Utc::now().date_naive();
        Self {
            is_expired: c.is_expired(today),
            days_until_expiry: c.days_until_expiry(today),
            id: c.id,
            driver_id: c.driver_id,
            certification_name: c.certification_name,
            issued_by: c.issued_by,
            issue_date: c.issue_date,
            expiry_date: c.expiry_date,
            status: c.status,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Query parameters for listing one driver's certifications
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListCertificationsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PageQuery,
    pub status: Option<CertificationStatus>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[param(value_type = Option<i32>)]
    pub expiring_within_days: Option<i32>,
}

impl ListCertificationsQuery {
    pub fn filter(&self) -> CertificationFilter {
        CertificationFilter {
            status: self.status,
            expiring_within_days: self.expiring_within_days,
        }
    }
}

/// Query parameters for listing expired certifications
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ExpiredCertificationsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PageQuery,
    /// Only certifications that expired within this many days
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[param(value_type = Option<i32>)]
    pub expired_since_days: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::drivers::DriverField;

    #[test]
    fn test_driver_response_computes_expiry() {
        let today = Utc::now().date_naive();
        let driver = DriverDBResponse {
            id: DriverId::new_v4(),
            user_id: UserId::new_v4(),
            license_number: "DL0000001".to_string(),
            license_class: LicenseClass::ClassC,
            license_expiry: today - chrono::Duration::days(3),
            experience_years: 1,
            phone_number: String::new(),
            emergency_contact_name: String::new(),
            emergency_contact_phone: String::new(),
            status: DriverStatus::Suspended,
            hire_date: today,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let response = DriverResponse::from(driver);
        assert!(response.license_expired);
        assert_eq!(response.days_until_license_expiry, -3);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "SUSPENDED");
        assert_eq!(json["license_class"], "CLASS_C");
    }

    #[test]
    fn test_certification_without_expiry() {
        let today = Utc::now().date_naive();
        let cert = CertificationDBResponse {
            id: CertificationId::new_v4(),
            driver_id: DriverId::new_v4(),
            certification_name: "First Aid".to_string(),
            issued_by: "Red Cross".to_string(),
            issue_date: today,
            expiry_date: None,
            status: CertificationStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(CertificationResponse::from(cert)).unwrap();
        assert_eq!(json["is_expired"], false);
        assert!(json.get("days_until_expiry").is_none());
        assert_eq!(json["status"], "CERT_ACTIVE");
    }

    #[test]
    fn test_driver_update_mask() {
        let update = DriverUpdate {
            phone_number: Some("+254700000001".to_string()),
            update_mask: Some(vec!["phone_number".to_string(), " hire_date ".to_string()]),
            ..Default::default()
        };
        let request = update.into_db_request().unwrap();
        assert_eq!(
            request.mask,
            FieldMask::fields(&[DriverField::PhoneNumber, DriverField::HireDate])
        );
    }
}
