use std::cmp::Ordering;
use std::collections::BTreeMap;

use num_bigint::BigInt;

/// All combinations that reconstructed one particular secret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    /// Number of combinations in the bucket.
    pub count: u128,
    /// Lexicographic rank of the first combination that produced this secret.
    pub first_rank: u128,
    pub first: Vec<usize>,
}

/// Secret -> bucket mapping, built from per-combination results.
///
/// Tallies over disjoint rank ranges can be built independently and combined
/// with [`SecretTally::merge`]; the result does not depend on merge order.
/// A bucket holds its count and one k-wide combination, so memory is
/// O(distinct secrets · k).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SecretTally {
    total: u128,
    buckets: BTreeMap<BigInt, Bucket>,
}

impl SecretTally {
    pub fn new() -> Self {
        SecretTally::default()
    }

    pub fn record(&mut self, rank: u128, combination: &[usize], secret: BigInt) {
        let bucket = self.buckets.entry(secret).or_insert_with(|| Bucket {
            count: 0,
            first_rank: rank,
            first: combination.to_vec(),
        });
        bucket.count += 1;
        if rank < bucket.first_rank {
            bucket.first_rank = rank;
            bucket.first = combination.to_vec();
        }
        self.total += 1;
    }

    pub fn merge(mut self, other: SecretTally) -> SecretTally {
        if self.buckets.len() < other.buckets.len() {
            return other.merge(self);
        }
        for (secret, theirs) in other.buckets {
            match self.buckets.get_mut(&secret) {
                Some(ours) => {
                    ours.count += theirs.count;
                    if theirs.first_rank < ours.first_rank {
                        ours.first_rank = theirs.first_rank;
                        ours.first = theirs.first;
                    }
                }
                None => {
                    self.buckets.insert(secret, theirs);
                }
            }
        }
        self.total += other.total;
        self
    }

    /// Number of combinations recorded.
    pub fn total(&self) -> u128 {
        self.total
    }

    pub fn distinct_secrets(&self) -> usize {
        self.buckets.len()
    }

    pub fn bucket(&self, secret: &BigInt) -> Option<&Bucket> {
        self.buckets.get(secret)
    }

    /// The most frequent secret; on equal counts the numerically smallest wins.
    pub fn majority(&self) -> Option<(&BigInt, &Bucket)> {
        let mut best: Option<(&BigInt, &Bucket)> = None;
        // ascending secret order, so only a strictly larger count replaces
        for (secret, bucket) in &self.buckets {
            match best {
                Some((_, b)) if b.count >= bucket.count => {}
                _ => best = Some((secret, bucket)),
            }
        }
        best
    }

    /// Every secret, most frequent first, ties by ascending secret.
    pub fn ranked(&self) -> Vec<(&BigInt, &Bucket)> {
        let mut all: Vec<_> = self.buckets.iter().collect();
        all.sort_by(|(sa, a), (sb, b)| match b.count.cmp(&a.count) {
            Ordering::Equal => sa.cmp(sb),
            other => other,
        });
        all
    }
}
