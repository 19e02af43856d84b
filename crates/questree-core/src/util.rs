//! Question id generation.

use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::IdStrategy;
use crate::store::QuestionStore;
use crate::types::QuestionId;

/// Generate a well-distributed u64 for random question ids.
///
/// Mixes the current timestamp, process id, thread id and an atomic counter
/// through SHA-256.
pub fn rand_u64() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;

    let pid = std::process::id();
    let thread_id = format!("{:?}", std::thread::current().id());
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha256::new();
    hasher.update(timestamp.to_le_bytes());
    hasher.update(pid.to_le_bytes());
    hasher.update(thread_id.as_bytes());
    hasher.update(counter.to_le_bytes());

    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(bytes)
}

/// Produces fresh question ids that are not yet in the store.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    strategy: IdStrategy,
    next: u64,
}

impl IdGenerator {
    pub fn new(prefix: impl Into<String>, strategy: IdStrategy) -> Self {
        IdGenerator {
            prefix: prefix.into(),
            strategy,
            next: 1,
        }
    }

    /// Next id not present in `store`.
    pub fn next_id(&mut self, store: &QuestionStore) -> QuestionId {
        loop {
            let candidate = match self.strategy {
                IdStrategy::Sequential => {
                    let id = format!("{}{}", self.prefix, self.next);
                    self.next += 1;
                    id
                }
                IdStrategy::Random => format!("{}{}", self.prefix, hex::encode(rand_u64().to_be_bytes())),
            };
            let candidate = QuestionId::new(candidate);
            if !store.contains(&candidate) {
                return candidate;
            }
        }
    }
}
