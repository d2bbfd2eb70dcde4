//! Database repository for vehicles.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Connection, FromRow, PgConnection};
use tracing::instrument;

use crate::db::{
    engine::{FilterComposer, Page, PageRequest, PartialUpdate, StatusEnum, StoredEnum, lifecycle},
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::vehicles::{
        FuelType, VehicleCreateDBRequest, VehicleDBResponse, VehicleField, VehicleFilter, VehicleStatus, VehicleUpdateDBRequest,
    },
};
use crate::types::{VehicleId, VehicleTypeId, abbrev_uuid};

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Vehicle {
    pub external_id: VehicleId,
    pub vehicle_type_id: VehicleTypeId,
    pub license_plate: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub seating_capacity: i32,
    pub fuel_type: String,
    pub engine_number: String,
    pub chassis_number: String,
    pub registration_date: Option<NaiveDate>,
    pub insurance_expiry: Option<NaiveDate>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Vehicle> for VehicleDBResponse {
    type Error = DbError;

    fn try_from(v: Vehicle) -> Result<Self> {
        Ok(Self {
            id: v.external_id,
            vehicle_type_id: v.vehicle_type_id,
            license_plate: v.license_plate,
            make: v.make,
            model: v.model,
            year: v.year,
            color: v.color,
            seating_capacity: v.seating_capacity,
            fuel_type: FuelType::from_stored(&v.fuel_type)?,
            engine_number: v.engine_number,
            chassis_number: v.chassis_number,
            registration_date: v.registration_date,
            insurance_expiry: v.insurance_expiry,
            status: VehicleStatus::from_stored(&v.status)?,
            created_at: v.created_at,
            updated_at: v.updated_at,
        })
    }
}

pub struct Vehicles<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Vehicles<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(license_plate = %license_plate), err)]
    pub async fn get_by_license_plate(&mut self, license_plate: &str) -> Result<Option<VehicleDBResponse>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE license_plate = $1")
            .bind(license_plate)
            .fetch_optional(&mut *self.db)
            .await?;
        vehicle.map(TryInto::try_into).transpose()
    }

    /// Write `to` if the vehicle is still in `expected`, then return the stored row.
    #[instrument(skip(self), fields(vehicle_id = %abbrev_uuid(&id)), err)]
    pub async fn update_status(&mut self, id: VehicleId, expected: VehicleStatus, to: VehicleStatus) -> Result<VehicleDBResponse> {
        lifecycle::compare_and_set_status(&mut *self.db, id, expected, to).await?;
        fetch(&mut *self.db, id).await?.ok_or(DbError::NotFound)
    }

    /// Retire the vehicle only while it is still in `expected`.
    #[instrument(skip(self), fields(vehicle_id = %abbrev_uuid(&id)), err)]
    pub async fn retire_from(&mut self, id: VehicleId, expected: VehicleStatus) -> Result<()> {
        lifecycle::soft_delete_from(&mut *self.db, id, expected).await
    }
}

async fn fetch(conn: &mut PgConnection, id: VehicleId) -> Result<Option<VehicleDBResponse>> {
    let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE external_id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    vehicle.map(TryInto::try_into).transpose()
}

#[async_trait::async_trait]
impl<'c> Repository for Vehicles<'c> {
    type CreateRequest = VehicleCreateDBRequest;
    type UpdateRequest = VehicleUpdateDBRequest;
    type Response = VehicleDBResponse;
    type Filter = VehicleFilter;

    #[instrument(skip(self, request), fields(license_plate = %request.license_plate), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (
                internal_id, external_id, vehicle_type_id, license_plate, make, model, year, color,
                seating_capacity, fuel_type, engine_number, chassis_number, registration_date,
                insurance_expiry, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(request.internal_id)
        .bind(request.external_id)
        .bind(request.vehicle_type_id)
        .bind(&request.license_plate)
        .bind(&request.make)
        .bind(&request.model)
        .bind(request.year)
        .bind(&request.color)
        .bind(request.seating_capacity)
        .bind(request.fuel_type.as_str())
        .bind(&request.engine_number)
        .bind(&request.chassis_number)
        .bind(request.registration_date)
        .bind(request.insurance_expiry)
        .bind(VehicleStatus::INITIAL.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        vehicle.try_into()
    }

    #[instrument(skip(self), fields(vehicle_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: VehicleId) -> Result<Option<Self::Response>> {
        fetch(&mut *self.db, id).await
    }

    #[instrument(skip(self, filter, page), fields(page_size = page.limit()), err)]
    async fn list(&mut self, filter: &Self::Filter, page: &PageRequest) -> Result<Page<Self::Response>> {
        let limit = page.limit();
        let mut query = FilterComposer::new("SELECT * FROM vehicles", "internal_id")
            .eq("status", "TEXT", filter.status.map(|s| s.as_str()))
            .eq("vehicle_type_id", "UUID", filter.vehicle_type_id)
            .contains("make", filter.make.as_deref())
            .before_cursor(page.cursor()?)
            .paginate(limit);

        let rows = query.build_query_as::<Vehicle>().fetch_all(&mut *self.db).await?;
        Page::from_overfetch(rows, limit, |v| v.created_at).try_map(TryInto::try_into)
    }

    #[instrument(skip(self, request), fields(vehicle_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: VehicleId, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut update = PartialUpdate::new("vehicles", &request.mask);
        update
            .required(VehicleField::VehicleTypeId, request.vehicle_type_id)?
            .text(VehicleField::LicensePlate, &request.license_plate)
            .text(VehicleField::Make, &request.make)
            .text(VehicleField::Model, &request.model)
            .int(VehicleField::Year, request.year)
            .text(VehicleField::Color, &request.color)
            .int(VehicleField::SeatingCapacity, request.seating_capacity)
            .stored(VehicleField::FuelType, request.fuel_type)?
            .text(VehicleField::EngineNumber, &request.engine_number)
            .text(VehicleField::ChassisNumber, &request.chassis_number)
            .nullable(VehicleField::RegistrationDate, request.registration_date)
            .nullable(VehicleField::InsuranceExpiry, request.insurance_expiry);

        let mut tx = self.db.begin().await?;
        update.execute(&mut *tx, id).await?;
        let vehicle = fetch(&mut *tx, id).await?.ok_or(DbError::NotFound)?;
        tx.commit().await?;

        Ok(vehicle)
    }

    #[instrument(skip(self), fields(vehicle_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: VehicleId) -> Result<()> {
        lifecycle::soft_delete::<VehicleStatus>(&mut *self.db, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::engine::{FieldMask, PageToken};
    use crate::db::errors::ErrorKind;
    use crate::test_utils::{create_test_vehicle, standard_vehicle_type, test_ids, vehicle_request};
    use sqlx::PgPool;
    use std::collections::HashSet;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_vehicle(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let type_id = standard_vehicle_type(&mut conn, "matatu").await;
        let request = vehicle_request(&test_ids(), type_id, "KDA 123A");

        let mut repo = Vehicles::new(&mut conn);
        let vehicle = repo.create(&request).await.unwrap();

        assert_eq!(vehicle.id, request.external_id);
        assert_eq!(vehicle.license_plate, "KDA 123A");
        assert_eq!(vehicle.status, VehicleStatus::Active);
        assert_eq!(vehicle.created_at, vehicle.updated_at);

        let fetched = repo.get_by_id(vehicle.id).await.unwrap().unwrap();
        assert_eq!(fetched, vehicle);
        let by_plate = repo.get_by_license_plate("KDA 123A").await.unwrap().unwrap();
        assert_eq!(by_plate.id, vehicle.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_plate_is_already_exists(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let type_id = standard_vehicle_type(&mut conn, "bus").await;
        let first = create_test_vehicle(&mut conn, &ids, type_id, "KBZ 001B").await;

        let mut repo = Vehicles::new(&mut conn);
        let mut second = vehicle_request(&ids, type_id, "KBZ 001B");
        second.make = "Isuzu".to_string();
        let err = repo.create(&second).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        let unchanged = repo.get_by_id(first.id).await.unwrap().unwrap();
        assert_eq!(unchanged, first);
        assert!(repo.get_by_id(second.external_id).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_pagination_walks_every_row_once(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let type_id = standard_vehicle_type(&mut conn, "cab").await;
        let mut created = Vec::new();
        for i in 0..7 {
            created.push(create_test_vehicle(&mut conn, &ids, type_id, &format!("KCA {i:03}C")).await);
        }

        let mut repo = Vehicles::new(&mut conn);
        let mut seen = Vec::new();
        let mut token = None;
        loop {
            let page = repo
                .list(&VehicleFilter::default(), &PageRequest::new(Some(3), token.clone()))
                .await
                .unwrap();
            assert!(page.items.len() <= 3);
            seen.extend(page.items);
            match page.next_page_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        assert_eq!(seen.len(), 7);
        let unique: HashSet<_> = seen.iter().map(|v| v.id).collect();
        assert_eq!(unique.len(), 7);
        assert!(seen.windows(2).all(|w| w[0].created_at > w[1].created_at));
        assert_eq!(seen.first().unwrap().id, created.last().unwrap().id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_three_vehicles_two_pages(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let type_id = standard_vehicle_type(&mut conn, "van").await;
        for plate in ["KDB 100A", "KDB 200A", "KDB 300A"] {
            create_test_vehicle(&mut conn, &ids, type_id, plate).await;
        }

        let mut repo = Vehicles::new(&mut conn);
        let first = repo
            .list(&VehicleFilter::default(), &PageRequest::new(Some(2), None))
            .await
            .unwrap();
        assert_eq!(first.items.len(), 2);
        let token = first.next_page_token.expect("second page");
        assert_eq!(PageToken::decode(&token).unwrap(), first.items[1].created_at);

        let second = repo
            .list(&VehicleFilter::default(), &PageRequest::new(Some(2), Some(token)))
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(second.next_page_token.is_none());
        assert_eq!(second.items[0].license_plate, "KDB 100A");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let bus = standard_vehicle_type(&mut conn, "bus").await;
        let van = standard_vehicle_type(&mut conn, "van").await;

        let mut toyota = vehicle_request(&ids, bus, "KAA 001A");
        toyota.make = "Toyota".to_string();
        let mut nissan = vehicle_request(&ids, van, "KAA 002A");
        nissan.make = "Nissan".to_string();

        let mut repo = Vehicles::new(&mut conn);
        let toyota = repo.create(&toyota).await.unwrap();
        let nissan = repo.create(&nissan).await.unwrap();
        repo.update_status(nissan.id, VehicleStatus::Active, VehicleStatus::Maintenance)
            .await
            .unwrap();

        let page = PageRequest::default();
        let by_make = repo
            .list(
                &VehicleFilter {
                    make: Some("toy".to_string()),
                    ..Default::default()
                },
                &page,
            )
            .await
            .unwrap();
        assert_eq!(by_make.items.iter().map(|v| v.id).collect::<Vec<_>>(), vec![toyota.id]);

        let by_type = repo
            .list(
                &VehicleFilter {
                    vehicle_type_id: Some(van),
                    ..Default::default()
                },
                &page,
            )
            .await
            .unwrap();
        assert_eq!(by_type.items.len(), 1);
        assert_eq!(by_type.items[0].id, nissan.id);

        let active = repo
            .list(
                &VehicleFilter {
                    status: Some(VehicleStatus::Active),
                    ..Default::default()
                },
                &page,
            )
            .await
            .unwrap();
        assert_eq!(active.items.len(), 1);
        assert_eq!(active.items[0].id, toyota.id);

        // LIKE wildcards in the needle are literal
        let wildcard = repo
            .list(
                &VehicleFilter {
                    make: Some("%".to_string()),
                    ..Default::default()
                },
                &page,
            )
            .await
            .unwrap();
        assert!(wildcard.items.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_invalid_page_token(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Vehicles::new(&mut conn);
        let err = repo
            .list(&VehicleFilter::default(), &PageRequest::new(None, Some("not-a-token!".to_string())))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_masked_update_touches_only_masked_columns(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let type_id = standard_vehicle_type(&mut conn, "pickup").await;
        let before = create_test_vehicle(&mut conn, &ids, type_id, "KCC 777C").await;

        let mut repo = Vehicles::new(&mut conn);
        let after = repo
            .update(
                before.id,
                &VehicleUpdateDBRequest {
                    color: Some("White".to_string()),
                    make: Some("Mazda".to_string()),
                    mask: FieldMask::fields(&[VehicleField::Color]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(after.color, "White");
        assert_eq!(after.make, before.make);
        assert!(after.updated_at > before.updated_at);
        assert_eq!(
            VehicleDBResponse {
                color: before.color.clone(),
                updated_at: before.updated_at,
                ..after.clone()
            },
            before
        );
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_explicit_mask_clears_fields(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let type_id = standard_vehicle_type(&mut conn, "truck").await;
        let before = create_test_vehicle(&mut conn, &ids, type_id, "KTT 100T").await;
        assert!(before.insurance_expiry.is_some());

        let mut repo = Vehicles::new(&mut conn);
        let after = repo
            .update(
                before.id,
                &VehicleUpdateDBRequest {
                    mask: FieldMask::fields(&[VehicleField::Color, VehicleField::InsuranceExpiry, VehicleField::SeatingCapacity]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(after.color, "");
        assert_eq!(after.insurance_expiry, None);
        assert_eq!(after.seating_capacity, 0);
        assert_eq!(after.model, before.model);

        let err = repo
            .update(
                before.id,
                &VehicleUpdateDBRequest {
                    mask: FieldMask::fields(&[VehicleField::FuelType]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_empty_mask_writes_nothing(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let type_id = standard_vehicle_type(&mut conn, "lorry").await;
        let before = create_test_vehicle(&mut conn, &ids, type_id, "KLL 220L").await;

        let mut repo = Vehicles::new(&mut conn);
        let after = repo
            .update(
                before.id,
                &VehicleUpdateDBRequest {
                    make: Some("Mazda".to_string()),
                    color: Some("White".to_string()),
                    mask: FieldMask::parse(Some(&[])).unwrap(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(after, before);

        let err = repo
            .update(
                VehicleId::new_v4(),
                &VehicleUpdateDBRequest {
                    mask: FieldMask::parse(Some(&[])).unwrap(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_fallback_update_uses_non_empty_values(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let type_id = standard_vehicle_type(&mut conn, "cab").await;
        let before = create_test_vehicle(&mut conn, &ids, type_id, "KCB 555B").await;

        let mut repo = Vehicles::new(&mut conn);
        let after = repo
            .update(
                before.id,
                &VehicleUpdateDBRequest {
                    make: Some("Subaru".to_string()),
                    color: Some(String::new()),
                    year: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(after.make, "Subaru");
        assert_eq!(after.color, before.color);
        assert_eq!(after.year, before.year);

        // nothing selected: no write, row returned as is
        let same = repo.update(before.id, &VehicleUpdateDBRequest::default()).await.unwrap();
        assert_eq!(same, after);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_errors(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let type_id = standard_vehicle_type(&mut conn, "bus").await;
        create_test_vehicle(&mut conn, &ids, type_id, "KBA 111A").await;
        let other = create_test_vehicle(&mut conn, &ids, type_id, "KBA 222A").await;

        let mut repo = Vehicles::new(&mut conn);
        let duplicate = repo
            .update(
                other.id,
                &VehicleUpdateDBRequest {
                    license_plate: Some("KBA 111A".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(duplicate.kind(), ErrorKind::AlreadyExists);
        assert_eq!(repo.get_by_id(other.id).await.unwrap().unwrap().license_plate, "KBA 222A");

        let missing = repo
            .update(
                VehicleId::new_v4(),
                &VehicleUpdateDBRequest {
                    make: Some("Ford".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(missing, DbError::NotFound));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_soft_delete_is_not_repeatable(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let type_id = standard_vehicle_type(&mut conn, "bodaboda").await;
        let vehicle = create_test_vehicle(&mut conn, &ids, type_id, "KMD 321X").await;

        let mut repo = Vehicles::new(&mut conn);
        repo.delete(vehicle.id).await.unwrap();

        let retired = repo.get_by_id(vehicle.id).await.unwrap().unwrap();
        assert_eq!(retired.status, VehicleStatus::Retired);
        assert!(retired.updated_at > vehicle.updated_at);

        assert!(matches!(repo.delete(vehicle.id).await, Err(DbError::NotFound)));
        assert!(matches!(repo.delete(VehicleId::new_v4()).await, Err(DbError::NotFound)));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_retire_from_requires_expected_status(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let type_id = standard_vehicle_type(&mut conn, "tuktuk").await;
        let vehicle = create_test_vehicle(&mut conn, &ids, type_id, "KTT 512T").await;

        let mut repo = Vehicles::new(&mut conn);
        // the vehicle was assigned after the caller read ACTIVE
        repo.update_status(vehicle.id, VehicleStatus::Active, VehicleStatus::Assigned)
            .await
            .unwrap();
        let err = repo.retire_from(vehicle.id, VehicleStatus::Active).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FailedPrecondition);
        assert_eq!(
            repo.get_by_id(vehicle.id).await.unwrap().unwrap().status,
            VehicleStatus::Assigned
        );

        repo.update_status(vehicle.id, VehicleStatus::Assigned, VehicleStatus::Active)
            .await
            .unwrap();
        repo.retire_from(vehicle.id, VehicleStatus::Active).await.unwrap();
        assert_eq!(
            repo.get_by_id(vehicle.id).await.unwrap().unwrap().status,
            VehicleStatus::Retired
        );

        assert!(matches!(
            repo.retire_from(vehicle.id, VehicleStatus::Active).await,
            Err(DbError::NotFound)
        ));
        assert!(matches!(
            repo.retire_from(VehicleId::new_v4(), VehicleStatus::Active).await,
            Err(DbError::NotFound)
        ));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_status_write_rejects_stale_expected_status(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let type_id = standard_vehicle_type(&mut conn, "bus").await;
        let vehicle = create_test_vehicle(&mut conn, &ids, type_id, "KBX 900X").await;

        let mut repo = Vehicles::new(&mut conn);
        // two writers both read ACTIVE; the second one's write must not land
        repo.update_status(vehicle.id, VehicleStatus::Active, VehicleStatus::Assigned)
            .await
            .unwrap();
        let err = repo
            .update_status(vehicle.id, VehicleStatus::Active, VehicleStatus::Retired)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FailedPrecondition);
        assert_eq!(
            repo.get_by_id(vehicle.id).await.unwrap().unwrap().status,
            VehicleStatus::Assigned
        );

        let missing = repo
            .update_status(VehicleId::new_v4(), VehicleStatus::Active, VehicleStatus::Assigned)
            .await
            .unwrap_err();
        assert!(matches!(missing, DbError::NotFound));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_corrupt_status_is_internal(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let ids = test_ids();
        let type_id = standard_vehicle_type(&mut conn, "van").await;
        let vehicle = create_test_vehicle(&mut conn, &ids, type_id, "KVV 404V").await;

        sqlx::query("UPDATE vehicles SET status = 'SCRAPPED' WHERE external_id = $1")
            .bind(vehicle.id)
            .execute(&mut *conn)
            .await
            .unwrap();

        let mut repo = Vehicles::new(&mut conn);
        let err = repo.get_by_id(vehicle.id).await.unwrap_err();
        assert!(matches!(err, DbError::Corrupt { .. }));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
