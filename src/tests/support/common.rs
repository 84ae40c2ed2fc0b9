// Common test utilities.

use crate::governor::event_hash;

/// Returns `n` event ids whose hash leaves remainder `rem` modulo `modulus`.
pub fn ids_with_remainder(modulus: u64, rem: u64, n: usize) -> Vec<String> {
    (0u64..)
        .map(|i| format!("evt-{modulus}-{rem}-{i}"))
        .filter(|id| event_hash(id.as_bytes()) % modulus == rem)
        .take(n)
        .collect()
}

/// Random event ids, as an exchange would hand them out.
pub fn random_ids(n: usize) -> Vec<String> {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..n)
        .map(|_| format!("{:016x}-{:08x}", rng.gen::<u64>(), rng.gen::<u32>()))
        .collect()
}
