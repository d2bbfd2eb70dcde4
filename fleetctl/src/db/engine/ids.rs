//! Identifier allocation.
//!
//! Every entity carries two identifiers:
//!
//! - an `internal_id`: a snowflake-style 63-bit integer, time ordered and unique across nodes,
//!   used only inside the store
//! - an `external_id`: a random UUIDv4, the only identifier callers ever see
//!
//! Snowflake layout (most significant bit first):
//!
//! ```text
//! | 0 | 41 bits: ms since EPOCH_MS | 10 bits: node id | 12 bits: sequence |
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::db::errors::{DbError, Result};

/// Custom epoch (2024-01-01T00:00:00Z) in unix milliseconds.
pub const EPOCH_MS: u64 = 1_704_067_200_000;

const NODE_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;
const TIMESTAMP_BITS: u32 = 41;

/// Largest accepted node identifier.
pub const MAX_NODE_ID: u16 = (1 << NODE_BITS) - 1;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;
const MAX_TIMESTAMP: u64 = (1 << TIMESTAMP_BITS) - 1;

/// Process-wide allocator. Shared by reference; cloning is not needed since allocation is lock-free.
#[derive(Debug)]
pub struct IdAllocator {
    node_id: u64,
    /// `(last_ms << SEQUENCE_BITS) | last_sequence`
    state: AtomicU64,
}

impl IdAllocator {
    pub fn new(node_id: u16) -> Result<Self> {
        if node_id > MAX_NODE_ID {
            return Err(DbError::invalid_argument(format!(
                "node id {node_id} out of range (max {MAX_NODE_ID})"
            )));
        }
        Ok(Self {
            node_id: node_id as u64,
            state: AtomicU64::new(0),
        })
    }

    pub fn node_id(&self) -> u16 {
        self.node_id as u16
    }

    /// Allocate a fresh `(internal_id, external_id)` pair.
    pub fn allocate(&self) -> Result<(i64, Uuid)> {
        let internal_id = self.next_internal_id()?;
        Ok((internal_id, Uuid::new_v4()))
    }

    /// Next snowflake. Strictly greater than every id previously returned by this allocator.
    pub fn next_internal_id(&self) -> Result<i64> {
        loop {
            let now = elapsed_millis()?;
            let prev = self.state.load(Ordering::Acquire);
            let prev_ms = prev >> SEQUENCE_BITS;
            let prev_seq = prev & SEQUENCE_MASK;

            // A clock that stepped backwards keeps using the last timestamp; an exhausted
            // sequence borrows the next millisecond.
            let (ms, seq) = if now > prev_ms {
                (now, 0)
            } else if prev_seq < SEQUENCE_MASK {
                (prev_ms, prev_seq + 1)
            } else {
                (prev_ms + 1, 0)
            };

            if ms > MAX_TIMESTAMP {
                return Err(DbError::Other(anyhow::anyhow!("snowflake timestamp space exhausted")));
            }

            let next = (ms << SEQUENCE_BITS) | seq;
            if self
                .state
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                let id = (ms << (NODE_BITS + SEQUENCE_BITS)) | (self.node_id << SEQUENCE_BITS) | seq;
                return Ok(id as i64);
            }
        }
    }
}

fn elapsed_millis() -> Result<u64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| DbError::Other(anyhow::anyhow!("system clock before unix epoch: {e}")))?;
    let ms = now.as_millis() as u64;
    ms.checked_sub(EPOCH_MS)
        .ok_or_else(|| DbError::Other(anyhow::anyhow!("system clock before snowflake epoch")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    /// `(millis since EPOCH_MS, node id, sequence)`
    fn decompose(id: i64) -> (u64, u16, u16) {
        let id = id as u64;
        let ms = id >> (NODE_BITS + SEQUENCE_BITS);
        let node = (id >> SEQUENCE_BITS) & MAX_NODE_ID as u64;
        let seq = id & SEQUENCE_MASK;
        (ms, node as u16, seq as u16)
    }

    #[test]
    fn test_rejects_out_of_range_node() {
        assert!(IdAllocator::new(MAX_NODE_ID).is_ok());
        let err = IdAllocator::new(MAX_NODE_ID + 1).unwrap_err();
        assert!(matches!(err, DbError::InvalidArgument { .. }));
    }

    #[test]
    fn test_ids_strictly_increase() {
        let ids = IdAllocator::new(7).unwrap();
        let mut last = 0;
        for _ in 0..20_000 {
            let id = ids.next_internal_id().unwrap();
            assert!(id > last, "{id} <= {last}");
            last = id;
        }
    }

    #[test]
    fn test_node_id_is_embedded() {
        let ids = IdAllocator::new(513).unwrap();
        let (_, node, _) = decompose(ids.next_internal_id().unwrap());
        assert_eq!(node, 513);
        assert_eq!(ids.node_id(), 513);
    }

    #[test]
    fn test_external_id_is_not_derived_from_internal() {
        let ids = IdAllocator::new(1).unwrap();
        let (a_internal, a_external) = ids.allocate().unwrap();
        let (b_internal, b_external) = ids.allocate().unwrap();
        assert!(b_internal > a_internal);
        assert_ne!(a_external, b_external);
        assert_eq!(a_external.get_version_num(), 4);
    }

    #[test]
    fn test_concurrent_allocation_is_collision_free() {
        let ids = Arc::new(IdAllocator::new(3).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = ids.clone();
                std::thread::spawn(move || (0..5_000).map(|_| ids.next_internal_id().unwrap()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            let batch = handle.join().unwrap();
            // each thread observes its own ids in increasing order
            assert!(batch.windows(2).all(|w| w[0] < w[1]));
            for id in batch {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 40_000);
    }
}
