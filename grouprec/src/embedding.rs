//! Mapping free-text hobbies to user embeddings.
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use xxhash_rust::xxh3::xxh3_64;

/// Hobbies used for users without any interest.
pub const DEFAULT_HOBBIES: [&str; 1] = ["general"];

/// Embeds a set of hobbies into a vector of `embed_dim` standard normal values.
///
/// The hobbies are sorted and joined with spaces, and the xxh3 hash of the
/// resulting string seeds the random number generator. The embedding depends
/// only on the set of hobbies, not on their order, and is the same in every
/// process.
pub fn embed_hobbies<S: AsRef<str>>(hobbies: &[S], embed_dim: usize) -> Vec<f32> {
    let mut hobbies: Vec<&str> = hobbies.iter().map(|h| h.as_ref()).collect();
    hobbies.sort_unstable();
    let key = hobbies.join(" ");

    let mut rng = StdRng::seed_from_u64(xxh3_64(key.as_bytes()));
    (0..embed_dim).map(|_| rng.sample(StandardNormal)).collect()
}
