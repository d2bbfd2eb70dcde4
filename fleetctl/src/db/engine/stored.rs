//! Closed string enums persisted as `TEXT` columns.

use std::fmt::{Debug, Display};

use crate::db::errors::{DbError, Result};

pub trait StoredEnum: Copy + Eq + Debug + Display + Send + Sync + 'static {
    /// Every value, in declaration order.
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    /// Decode a value read back from storage. Anything outside the set is corruption.
    fn from_stored(value: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == value)
            .ok_or_else(|| DbError::corrupt(format!("unknown {} value {value:?}", std::any::type_name::<Self>())))
    }
}

/// Declares a `StoredEnum` whose wire and column representation is the given string for each
/// variant.
#[macro_export]
macro_rules! stored_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
        $vis enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $crate::db::engine::StoredEnum for $name {
            const ALL: &'static [Self] = &[$( $name::$variant ),+];

            fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::db::engine::StoredEnum::as_str(*self))
            }
        }
    };
}
