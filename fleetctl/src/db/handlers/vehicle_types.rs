//! Database repository for vehicle types.

use sqlx::PgConnection;
use tracing::instrument;

use crate::db::{
    engine::{FilterComposer, Page, PageRequest},
    errors::Result,
    models::vehicle_types::{VehicleType, VehicleTypeCreateDBRequest},
};
use crate::types::{VehicleTypeId, abbrev_uuid};

pub struct VehicleTypes<'c> {
    db: &'c mut PgConnection,
}

impl<'c> VehicleTypes<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    pub async fn create(&mut self, request: &VehicleTypeCreateDBRequest) -> Result<VehicleType> {
        let vehicle_type = sqlx::query_as::<_, VehicleType>(
            "INSERT INTO vehicle_types (id, name, description) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(VehicleTypeId::new_v4())
        .bind(&request.name)
        .bind(&request.description)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(vehicle_type)
    }

    #[instrument(skip(self), fields(vehicle_type_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: VehicleTypeId) -> Result<Option<VehicleType>> {
        let vehicle_type = sqlx::query_as::<_, VehicleType>("SELECT * FROM vehicle_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(vehicle_type)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_name(&mut self, name: &str) -> Result<Option<VehicleType>> {
        let vehicle_type = sqlx::query_as::<_, VehicleType>("SELECT * FROM vehicle_types WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(vehicle_type)
    }

    #[instrument(skip(self, page), fields(page_size = page.limit()), err)]
    pub async fn list(&mut self, page: &PageRequest) -> Result<Page<VehicleType>> {
        let limit = page.limit();
        let mut query = FilterComposer::new("SELECT * FROM vehicle_types", "id")
            .before_cursor(page.cursor()?)
            .paginate(limit);

        let rows = query.build_query_as::<VehicleType>().fetch_all(&mut *self.db).await?;
        Ok(Page::from_overfetch(rows, limit, |t| t.created_at))
    }
}
