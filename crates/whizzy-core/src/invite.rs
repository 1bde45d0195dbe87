//! Invite codes.

use rand::Rng;

/// Length of a generated invite code.
pub const INVITE_CODE_LEN: usize = 6;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A fresh lowercase base-36 code. Collisions with existing groups are not
/// checked; joins use the first matching group.
#[must_use]
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITE_CODE_LEN)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect()
}
