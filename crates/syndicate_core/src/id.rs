use rand::Rng;
use uuid::Uuid;

use crate::CharacterId;

/// Generate a deterministic v4-format UUID from a seeded RNG.
pub fn generate_uuid(rng: &mut impl Rng) -> Uuid {
    let bytes: [u8; 16] = rng.gen();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

/// Fresh member id, reproducible under a seeded RNG.
pub fn generate_character_id(rng: &mut impl Rng) -> CharacterId {
    CharacterId(format!("thief_{}", generate_uuid(rng)))
}
