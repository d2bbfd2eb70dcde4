//! The entity store engine: the persistence pattern shared by every entity table.
//!
//! - [`ids`]: snowflake `internal_id` plus random `external_id` allocation
//! - [`filter`]: fixed-shape filtered list queries
//! - [`pagination`]: page tokens, page size clamping, over-fetch detection
//! - [`mask`]: field-mask partial updates
//! - [`stored`]: string enums persisted as `TEXT`
//! - [`transitions`]: per-entity status state machines
//! - [`lifecycle`]: compare-and-set status writes and soft deletion
//!
//! Entity tables share a layout: `internal_id BIGINT` primary key, unique `external_id UUID`,
//! `status TEXT`, `created_at` and `updated_at`.

pub mod filter;
pub mod ids;
pub mod lifecycle;
pub mod mask;
pub mod pagination;
pub mod stored;
pub mod transitions;

pub use filter::FilterComposer;
pub use ids::IdAllocator;
pub use mask::{FieldMask, MaskField, PartialUpdate, Presence};
pub use pagination::{Page, PageRequest, PageToken};
pub use stored::StoredEnum;
pub use transitions::{StatusEnum, check_transition};
