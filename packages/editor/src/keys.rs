//! Chronologically sortable unique keys for new store entries.
//!
//! A key is 8 characters of millisecond timestamp followed by 12 random
//! characters, all from an alphabet whose byte order matches its value order.
//! Keys generated within the same millisecond increment the random tail, so
//! they still sort in creation order.

use rand::Rng;
use std::sync::Mutex;

const ALPHABET: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";
const RANDOM_LEN: usize = 12;
const TIME_LEN: usize = 8;

#[derive(Debug, Default)]
struct KeyState {
    last_millis: i64,
    last_random: [u8; RANDOM_LEN],
}

/// Generates push-style keys
#[derive(Debug, Default)]
pub struct KeyGenerator {
    state: Mutex<KeyState>,
}

impl KeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key for the current wall-clock time
    pub fn next_key(&self) -> String {
        self.key_at(chrono::Utc::now().timestamp_millis())
    }

    /// Key for an explicit timestamp
    pub fn key_at(&self, millis: i64) -> String {
        // A poisoned lock only means another generator call panicked; the
        // state is still a valid pair of arrays.
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if millis == state.last_millis {
            increment(&mut state.last_random);
        } else {
            let mut rng = rand::thread_rng();
            for slot in state.last_random.iter_mut() {
                *slot = rng.gen_range(0..64u8);
            }
            state.last_millis = millis;
        }

        let mut key = String::with_capacity(TIME_LEN + RANDOM_LEN);
        let mut time = [0u8; TIME_LEN];
        let mut remaining = millis.max(0);
        for slot in time.iter_mut().rev() {
            *slot = (remaining % 64) as u8;
            remaining /= 64;
        }

        for digit in time.iter().chain(state.last_random.iter()) {
            key.push(ALPHABET[*digit as usize] as char);
        }
        key
    }
}

fn increment(digits: &mut [u8; RANDOM_LEN]) {
    for digit in digits.iter_mut().rev() {
        if *digit == 63 {
            *digit = 0;
        } else {
            *digit += 1;
            return;
        }
    }
}
