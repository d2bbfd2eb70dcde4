//! Field-mask driven partial updates.
//!
//! An update names the fields it intends to write, either explicitly through a field mask or,
//! when no mask is given, implicitly by supplying a non-empty value. The write is one `UPDATE`
//! with a conditional assignment per column:
//!
//! ```sql
//! UPDATE vehicles SET
//!     make = CASE WHEN $1 THEN $2 ELSE make END,
//!     color = CASE WHEN $3 THEN $4 ELSE color END,
//!     updated_at = clock_timestamp()
//! WHERE external_id = $5
//! ```
//!
//! so columns outside the mask keep their stored value exactly.

use std::fmt::Debug;

use chrono::NaiveDate;
use sqlx::{Encode, PgConnection, Postgres, QueryBuilder, Type};
use uuid::Uuid;

use super::stored::StoredEnum;
use crate::db::errors::{DbError, Result};

/// The closed set of updatable fields for one entity.
pub trait MaskField: Copy + Eq + Debug + Send + Sync + 'static {
    const ALL: &'static [Self];

    /// Wire name, which is also the column name.
    fn name(self) -> &'static str;

    fn parse(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.name() == name)
            .ok_or_else(|| DbError::invalid_argument(format!("unknown field in update mask: {name}")))
    }
}

/// Parsed field mask. `explicit == None` means no mask was supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMask<F> {
    explicit: Option<Vec<F>>,
}

impl<F: MaskField> FieldMask<F> {
    /// An absent path list selects the non-empty-value fallback. A present but empty list is an
    /// explicit mask naming nothing, so the update writes no field.
    pub fn parse(paths: Option<&[String]>) -> Result<Self> {
        let explicit = paths
            .map(|paths| paths.iter().map(|p| F::parse(p.trim())).collect::<Result<Vec<_>>>())
            .transpose()?;
        Ok(Self { explicit })
    }

    pub fn fields(fields: &[F]) -> Self {
        Self {
            explicit: Some(fields.to_vec()),
        }
    }

    pub fn fallback() -> Self {
        Self { explicit: None }
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit.is_some()
    }

    /// Whether `field` is written. An explicit mask decides on membership alone, even for empty
    /// values; otherwise `present` decides.
    pub fn includes(&self, field: F, present: bool) -> bool {
        match &self.explicit {
            Some(fields) => fields.contains(&field),
            None => present,
        }
    }
}

impl<F: MaskField> Default for FieldMask<F> {
    fn default() -> Self {
        Self::fallback()
    }
}

/// "Non-empty / non-zero" test used when no explicit mask is supplied.
pub trait Presence {
    fn is_present(&self) -> bool;
}

impl Presence for Option<String> {
    fn is_present(&self) -> bool {
        self.as_deref().is_some_and(|s| !s.is_empty())
    }
}

impl Presence for Option<i32> {
    fn is_present(&self) -> bool {
        self.is_some_and(|v| v != 0)
    }
}

impl Presence for Option<NaiveDate> {
    fn is_present(&self) -> bool {
        self.is_some()
    }
}

impl Presence for Option<Uuid> {
    fn is_present(&self) -> bool {
        self.is_some_and(|v| !v.is_nil())
    }
}

/// Builder for the conditional `UPDATE` statement. Every column named through it appears in the
/// statement; only those selected by the mask change.
pub struct PartialUpdate<'args, F> {
    builder: QueryBuilder<'args, Postgres>,
    mask: FieldMask<F>,
    applied: usize,
}

impl<'args, F: MaskField> PartialUpdate<'args, F> {
    pub fn new(table: &'static str, mask: &FieldMask<F>) -> Self {
        let mut builder = QueryBuilder::new("UPDATE ");
        builder.push(table).push(" SET ");
        Self {
            builder,
            mask: mask.clone(),
            applied: 0,
        }
    }

    /// `column = CASE WHEN apply THEN value ELSE column END`
    fn assign<T>(&mut self, field: F, apply: bool, value: T) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres>,
    {
        let column = field.name();
        self.builder.push(format!("{column} = CASE WHEN "));
        self.builder.push_bind(apply);
        self.builder.push(" THEN ");
        self.builder.push_bind(value);
        self.builder.push(format!(" ELSE {column} END, "));
        if apply {
            self.applied += 1;
        }
        self
    }

    /// Text column; a masked field without a value is written as the empty string.
    pub fn text(&mut self, field: F, value: &Option<String>) -> &mut Self {
        let apply = self.mask.includes(field, value.is_present());
        self.assign(field, apply, value.clone().unwrap_or_default())
    }

    /// Integer column; a masked field without a value is written as zero.
    pub fn int(&mut self, field: F, value: Option<i32>) -> &mut Self {
        let apply = self.mask.includes(field, value.is_present());
        self.assign(field, apply, value.unwrap_or_default())
    }

    /// Nullable column; a masked field without a value is written as `NULL`.
    pub fn nullable<T>(&mut self, field: F, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres>,
        Option<T>: Presence,
    {
        let apply = self.mask.includes(field, value.is_present());
        self.assign(field, apply, value)
    }

    /// `NOT NULL` column with no meaningful zero value. A masked field must carry a value.
    pub fn required<T>(&mut self, field: F, value: Option<T>) -> Result<&mut Self>
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres>,
    {
        let apply = self.mask.includes(field, value.is_some());
        if apply && value.is_none() {
            return Err(DbError::invalid_argument(format!(
                "{} is in the update mask but has no value",
                field.name()
            )));
        }
        Ok(self.assign(field, apply, value))
    }

    /// Enum column stored as text. Same rules as [`PartialUpdate::required`].
    pub fn stored<E: StoredEnum>(&mut self, field: F, value: Option<E>) -> Result<&mut Self> {
        self.required(field, value.map(|v| v.as_str()))
    }

    /// Number of columns that will actually change.
    pub fn applied(&self) -> usize {
        self.applied
    }

    /// Run the update. Nothing is written when no column applies; zero affected rows is
    /// `NotFound`.
    pub async fn execute(mut self, conn: &mut PgConnection, external_id: Uuid) -> Result<()> {
        if self.applied == 0 {
            return Ok(());
        }
        self.builder.push("updated_at = clock_timestamp() WHERE external_id = ");
        self.builder.push_bind(external_id);

        let result = self.builder.build().execute(&mut *conn).await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    #[cfg(test)]
    fn sql(&self) -> &str {
        self.builder.sql()
    }
}
