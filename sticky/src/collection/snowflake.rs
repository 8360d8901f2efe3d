use chrono::Utc;
use log::{debug, warn};
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::Rng;

const NODE_ID_BITS: u64 = 10;
const SEQUENCE_BITS: u64 = 12;
const MAX_NODE_ID: u64 = (1 << NODE_ID_BITS) - 1;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;
const TIMESTAMP_LEFT_SHIFT: u64 = SEQUENCE_BITS + NODE_ID_BITS;
const EPOCH: u64 = 1288834974657;

struct GeneratorState {
    last_timestamp: u64,
    sequence: u64,
}

/// Time-ordered 64-bit identifier generator backing [ObjectId](super::ObjectId).
///
/// Layout, high to low: milliseconds since a fixed epoch, a random node id
/// drawn once per process and a per-millisecond sequence.
pub(crate) struct SnowflakeIdGenerator {
    node_id: u64,
    state: Mutex<GeneratorState>,
}

fn current_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

impl SnowflakeIdGenerator {
    pub(crate) fn new() -> Self {
        let mut node_id = Self::random_node_id();
        if node_id > MAX_NODE_ID {
            warn!("Node id can't be greater than {}", MAX_NODE_ID);
            node_id = OsRng.gen_range(1..=MAX_NODE_ID);
        }
        debug!("Initialized id generator with node id: {}", node_id);

        SnowflakeIdGenerator {
            node_id,
            state: Mutex::new(GeneratorState {
                last_timestamp: 0,
                sequence: 0,
            }),
        }
    }

    pub(crate) fn get_id(&self) -> u64 {
        let mut state = self.state.lock();

        let mut timestamp = current_millis().max(EPOCH);
        if timestamp < state.last_timestamp {
            // clock moved backwards, keep issuing from the last seen millisecond
            timestamp = state.last_timestamp;
        }

        if timestamp == state.last_timestamp {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                // sequence exhausted, borrow the next millisecond
                timestamp = state.last_timestamp + 1;
            }
        } else {
            state.sequence = 0;
        }

        state.last_timestamp = timestamp;

        ((timestamp - EPOCH) << TIMESTAMP_LEFT_SHIFT)
            | (self.node_id << SEQUENCE_BITS)
            | state.sequence
    }

    fn random_node_id() -> u64 {
        let uuid = uuid::Uuid::new_v4();
        let uid = uuid.as_bytes();
        let rnd_byte = OsRng.gen::<u64>() & 0x000000FF;

        ((0x000000FF & uid[uid.len() - 1] as u64) | (0x0000FF00 & (rnd_byte << 8))) >> 6
    }
}
