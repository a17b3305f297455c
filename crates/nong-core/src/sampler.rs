//! Uniform sampling without replacement from the candidate pool.
use nong_model::PartnerId;
use rand::{Rng, seq::index};

/// Draw `amount` distinct partners uniformly at random from `candidates`.
///
/// The candidate slice is only borrowed. When `amount` exceeds the number of
/// candidates every candidate is returned, in random order.
pub fn sample<R: Rng + ?Sized>(
    rng: &mut R,
    candidates: &[PartnerId],
    amount: usize,
) -> Vec<PartnerId> {
    let amount = amount.min(candidates.len());
    index::sample(rng, candidates.len(), amount)
        .into_iter()
        .map(|i| candidates[i].clone())
        .collect()
}
