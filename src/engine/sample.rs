//! Uniform sampling without replacement (partial Fisher–Yates).

use rand::Rng;

/// Pick `k` distinct positions of `items` uniformly at random.
///
/// Returns `None` when `k` exceeds the number of items. The result is in
/// draw order; every `k`-subset is equally likely.
pub fn sample_without_replacement<T: Copy, R: Rng>(
    items: &[T],
    k: usize,
    rng: &mut R,
) -> Option<Vec<T>> {
    if k > items.len() {
        return None;
    }
    let mut pool = items.to_vec();
    for i in 0..k {
        let j = rng.gen_range(i..pool.len());
        pool.swap(i, j);
    }
    pool.truncate(k);
    Some(pool)
}

/// Fixed-size form of [`sample_without_replacement`].
pub fn sample_array<T: Copy, const K: usize, R: Rng>(
    items: &[T],
    rng: &mut R,
) -> Option<[T; K]> {
    let picked = sample_without_replacement(items, K, rng)?;
    Some(std::array::from_fn(|i| picked[i]))
}
