//! Database models for drivers and their certifications.

use chrono::{DateTime, NaiveDate, Utc};

use crate::db::engine::{FieldMask, MaskField, StatusEnum};
use crate::stored_enum;
use crate::types::{CertificationId, DriverId, UserId};

stored_enum! {
    pub enum DriverStatus {
        PendingVerification => "PENDING_VERIFICATION",
        Active => "ACTIVE",
        Suspended => "SUSPENDED",
        Inactive => "INACTIVE",
    }
}

impl StatusEnum for DriverStatus {
    const INITIAL: Self = DriverStatus::PendingVerification;
    const SOFT_DELETED: Self = DriverStatus::Inactive;
    const TABLE: &'static str = "drivers";

    fn successors(self) -> &'static [Self] {
        use DriverStatus::*;
        match self {
            PendingVerification => &[Active, Inactive],
            Active => &[Suspended, Inactive],
            Suspended => &[Active, Inactive],
            // a deactivated driver can be reinstated or sent back through verification
            Inactive => &[Active, PendingVerification],
        }
    }
}

stored_enum! {
    pub enum LicenseClass {
        ClassA => "CLASS_A",
        ClassB => "CLASS_B",
        ClassC => "CLASS_C",
        ClassD => "CLASS_D",
        ClassE => "CLASS_E",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverField {
    LicenseNumber,
    LicenseClass,
    LicenseExpiry,
    ExperienceYears,
    PhoneNumber,
    EmergencyContactName,
    EmergencyContactPhone,
    HireDate,
}

impl MaskField for DriverField {
    const ALL: &'static [Self] = &[
        DriverField::LicenseNumber,
        DriverField::LicenseClass,
        DriverField::LicenseExpiry,
        DriverField::ExperienceYears,
        DriverField::PhoneNumber,
        DriverField::EmergencyContactName,
        DriverField::EmergencyContactPhone,
        DriverField::HireDate,
    ];

    fn name(self) -> &'static str {
        match self {
            DriverField::LicenseNumber => "license_number",
            DriverField::LicenseClass => "license_class",
            DriverField::LicenseExpiry => "license_expiry",
            DriverField::ExperienceYears => "experience_years",
            DriverField::PhoneNumber => "phone_number",
            DriverField::EmergencyContactName => "emergency_contact_name",
            DriverField::EmergencyContactPhone => "emergency_contact_phone",
            DriverField::HireDate => "hire_date",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DriverCreateDBRequest {
    pub internal_id: i64,
    pub external_id: DriverId,
    pub user_id: UserId,
    pub license_number: String,
    pub license_class: LicenseClass,
    pub license_expiry: NaiveDate,
    pub experience_years: i32,
    pub phone_number: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    /// Defaults to today when unset
    pub hire_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct DriverUpdateDBRequest {
    pub license_number: Option<String>,
    pub license_class: Option<LicenseClass>,
    pub license_expiry: Option<NaiveDate>,
    pub experience_years: Option<i32>,
    pub phone_number: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub mask: FieldMask<DriverField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverDBResponse {
    pub id: DriverId,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DriverDBResponse {
    /// Expired means the expiry date is strictly before `today`.
    pub fn license_expired(&self, today: NaiveDate) -> bool {
        self.license_expiry < today
    }

    /// Negative once expired.
    pub fn days_until_license_expiry(&self, today: NaiveDate) -> i64 {
        (self.license_expiry - today).num_days()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DriverFilter {
    pub status: Option<DriverStatus>,
    pub license_class: Option<LicenseClass>,
    /// Only licences expiring between today and this many days from now
    pub license_expiring_within_days: Option<i32>,
}

stored_enum! {
    pub enum CertificationStatus {
        Active => "CERT_ACTIVE",
        Expired => "CERT_EXPIRED",
        Revoked => "CERT_REVOKED",
    }
}

impl StatusEnum for CertificationStatus {
    const INITIAL: Self = CertificationStatus::Active;
    const SOFT_DELETED: Self = CertificationStatus::Revoked;
    const TABLE: &'static str = "driver_certifications";

    fn successors(self) -> &'static [Self] {
        use CertificationStatus::*;
        match self {
            Active => &[Expired, Revoked],
            Expired => &[Revoked],
            Revoked => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificationField {
    CertificationName,
    IssuedBy,
    IssueDate,
    ExpiryDate,
}

impl MaskField for CertificationField {
    const ALL: &'static [Self] = &[
        CertificationField::CertificationName,
        CertificationField::IssuedBy,
        CertificationField::IssueDate,
        CertificationField::ExpiryDate,
    ];

    fn name(self) -> &'static str {
        match self {
            CertificationField::CertificationName => "certification_name",
            CertificationField::IssuedBy => "issued_by",
            CertificationField::IssueDate => "issue_date",
            CertificationField::ExpiryDate => "expiry_date",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CertificationCreateDBRequest {
    pub internal_id: i64,
    pub external_id: CertificationId,
    pub driver_id: DriverId,
    pub certification_name: String,
    pub issued_by: String,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct CertificationUpdateDBRequest {
    pub certification_name: Option<String>,
    pub issued_by: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub mask: FieldMask<CertificationField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CertificationDBResponse {
    pub id: CertificationId,
    pub driver_id: DriverId,
    pub certification_name: String,
    pub issued_by: String,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub status: CertificationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CertificationDBResponse {
    /// Certifications without an expiry date never expire.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry < today)
    }

    pub fn days_until_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.expiry_date.map(|expiry| (expiry - today).num_days())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CertificationFilter {
    pub status: Option<CertificationStatus>,
    pub expiring_within_days: Option<i32>,
}
