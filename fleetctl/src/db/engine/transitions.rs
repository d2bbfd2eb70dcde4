//! Status state machines.
//!
//! Each entity's status enum lists its outgoing edges explicitly. There are no wildcard edges and
//! no self loops: `from == to` is always rejected.

use super::stored::StoredEnum;
use crate::db::errors::{DbError, Result};

pub trait StatusEnum: StoredEnum {
    /// Status assigned on create.
    const INITIAL: Self;
    /// Status a soft delete moves to.
    const SOFT_DELETED: Self;
    /// Table whose `status` column holds this enum.
    const TABLE: &'static str;

    /// Outgoing edges.
    fn successors(self) -> &'static [Self];

    fn can_transition(self, to: Self) -> bool {
        self != to && self.successors().contains(&to)
    }

    fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }
}

/// Edge check run before any status write.
pub fn check_transition<S: StatusEnum>(from: S, to: S) -> Result<()> {
    if from.can_transition(to) {
        Ok(())
    } else {
        Err(DbError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}
