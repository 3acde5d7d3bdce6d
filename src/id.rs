//! Random name components for temp artifacts.

use rand::Rng;

/// Number of random bytes behind each name component.
const RANDOM_BYTES: usize = 6;

/// Generate a random file-name component.
///
/// Format: 12 lowercase hex characters
/// Example: `3fa2c19b07de`
pub fn random_component() -> String {
    let bytes: [u8; RANDOM_BYTES] = rand::rng().random();
    hex::encode(bytes)
}
