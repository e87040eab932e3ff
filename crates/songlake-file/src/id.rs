//! Song identifier generation.

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use uuid::Uuid;

use songlake_core::types::{SONG_ID_LEN, SongId};

const COUNTER_MASK: u32 = 0x00ff_ffff;

/// Generates identifiers laid out as a 4 byte big-endian seconds timestamp,
/// 5 random bytes fixed per generator and a 3 byte counter.
///
/// Identifiers from one generator sort in creation order.
#[derive(Debug)]
pub(crate) struct IdGenerator {
    random: [u8; 5],
    counter: AtomicU32,
}

impl IdGenerator {
    pub fn new() -> Self {
        let seed = Uuid::new_v4();
        let bytes = seed.as_bytes();

        let mut random = [0u8; 5];
        random.copy_from_slice(&bytes[..5]);
        // Start low enough that a batch does not wrap the counter.
        let start = u32::from_be_bytes([0, 0, bytes[5], bytes[6]]);

        Self {
            random,
            counter: AtomicU32::new(start),
        }
    }

    pub fn next_id(&self) -> SongId {
        let seconds = u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX);
        let count = self.counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; SONG_ID_LEN];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&self.random);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        SongId::from_bytes(bytes)
    }
}
