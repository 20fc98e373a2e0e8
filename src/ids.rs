//! Record identifier generation.

use crate::types::RecordId;
use rand::RngCore;
use std::sync::atomic::{AtomicU64, Ordering};

/// Number of random bytes in a generated identifier.
const RANDOM_ID_BYTES: usize = 16;

/// Source of fresh record identifiers. Only uniqueness is required.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> RecordId;
}

/// 16 random bytes rendered as lowercase hex.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> RecordId {
        let mut bytes = [0u8; RANDOM_ID_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        RecordId(hex::encode(bytes))
    }
}

/// Deterministic counter-based ids ("1", "2", ...), handy in tests.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Start counting at 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Start counting at `first`.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> RecordId {
        RecordId(self.next.fetch_add(1, Ordering::SeqCst).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_ids_are_hex() {
        let id = RandomIdGenerator.next_id();
        assert_eq!(id.as_str().len(), RANDOM_ID_BYTES * 2);
        assert!(hex::decode(id.as_str()).is_ok());
    }

    #[test]
    fn test_random_ids_unique() {
        let ids: HashSet<_> = (0..1000).map(|_| RandomIdGenerator.next_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_sequential_ids() {
        let gen = SequentialIdGenerator::starting_at(7);
        assert_eq!(gen.next_id(), RecordId::from("7"));
        assert_eq!(gen.next_id(), RecordId::from("8"));
    }
}
