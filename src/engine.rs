//! Drives one audit run: enumerate every k-subset, interpolate its secret,
//! tally the results and attribute disagreement to individual shares.
//!
//! Work is split over contiguous rank ranges of the lexicographic enumeration.
//! Each range streams into its own partial result and the partials are merged
//! at the end. The first pass builds a [`SecretTally`]; once the majority is
//! known a second pass counts, per share, the combinations that agree with it.
//! Memory is O(distinct secrets · k + n), never O(C(n,k)). The second pass is
//! skipped when every combination produced the same secret. Cost is up to
//! 2 · C(n,k) interpolations; [`AuditConfig`] carries the bound that stops
//! oversized runs before they start.

use num_bigint::BigInt;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::analysis::{self, ShareAgreement, ShareStat};
use crate::combinations::{binomial, Combinations};
use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::interpolate::secret_at_zero;
use crate::report::AuditReport;
use crate::share::{Point, ShareSet};
use crate::tally::SecretTally;

/// Rank ranges handed to each rayon worker, per thread.
const CHUNKS_PER_THREAD: u128 = 4;

#[derive(Clone, Debug, Default)]
pub struct AuditEngine {
    config: AuditConfig,
}

impl AuditEngine {
    pub fn new(config: AuditConfig) -> Self {
        AuditEngine { config }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Number of combinations a run over `shares` will evaluate, checked
    /// against the configured limit.
    pub fn plan(&self, shares: &ShareSet) -> Result<u128> {
        let (n, k) = (shares.len(), shares.threshold());
        if k == 0 || k > n {
            return Err(AuditError::InvalidThreshold { n, k });
        }
        let limit = self.config.max_combinations.unwrap_or(u128::MAX);
        match binomial(n, k) {
            Some(total) if total <= limit => Ok(total),
            _ => Err(AuditError::TooManyCombinations { n, k, limit }),
        }
    }

    /// Reconstructs the secret of every combination and tallies the results.
    pub fn evaluate(&self, shares: &ShareSet) -> Result<SecretTally> {
        let total = self.plan(shares)?;
        let tally = self.map_reduce(
            shares,
            total,
            SecretTally::new,
            |tally, rank, combo, secret| tally.record(rank, combo, secret),
            SecretTally::merge,
        )?;
        debug_assert_eq!(tally.total(), total);
        Ok(tally)
    }

    /// Counts, per share, the combinations that reconstruct `majority`.
    pub fn agreement(&self, shares: &ShareSet, majority: &BigInt) -> Result<ShareAgreement> {
        let total = self.plan(shares)?;
        let n = shares.len();
        self.map_reduce(
            shares,
            total,
            || ShareAgreement::new(n),
            |agreement, _, combo, secret| agreement.record(combo, &secret == majority),
            ShareAgreement::merge,
        )
    }

    /// Full run: evaluate, pick the majority secret, score every share.
    pub fn audit(&self, shares: &ShareSet) -> Result<AuditReport> {
        let tally = self.evaluate(shares)?;
        let Some((majority, bucket)) = tally.majority() else {
            return Err(AuditError::InvalidThreshold {
                n: shares.len(),
                k: shares.threshold(),
            });
        };
        let majority = majority.clone();

        let agreement = if tally.distinct_secrets() == 1 {
            let appearances = binomial(shares.len() - 1, shares.threshold() - 1).unwrap_or(0);
            ShareAgreement::unanimous(shares.len(), appearances)
        } else {
            self.agreement(shares, &majority)?
        };
        let stats: Vec<ShareStat> = analysis::share_stats(shares, &agreement);
        let verdict = analysis::verdict(&stats, &majority, self.config.error_threshold_percent);

        info!(
            combinations = %tally.total(),
            distinct_secrets = tally.distinct_secrets(),
            majority = %majority,
            majority_count = %bucket.count,
            wrong_share = ?verdict.wrong_share(),
            "audit complete"
        );

        Ok(AuditReport::new(
            shares,
            &tally,
            stats,
            verdict,
            self.config.ranking_limit,
        ))
    }

    /// Evaluates every combination rank in `[0, total)` into partial
    /// accumulators, one per rank range, and merges them.
    fn map_reduce<T, I, F, M>(
        &self,
        shares: &ShareSet,
        total: u128,
        init: I,
        fold: F,
        merge: M,
    ) -> Result<T>
    where
        T: Send,
        I: Fn() -> T + Sync + Send,
        F: Fn(&mut T, u128, &[usize], BigInt) + Sync + Send,
        M: Fn(T, T) -> T + Sync + Send,
    {
        let points: Vec<Point> = shares.shares().iter().map(|s| s.point()).collect();

        if !self.config.parallel || total <= 1 {
            debug!(total, "evaluating combinations sequentially");
            return evaluate_range(shares, &points, 0, total, init(), &fold);
        }

        let chunks = (rayon::current_num_threads() as u128 * CHUNKS_PER_THREAD).min(total);
        let chunk_len = total.div_ceil(chunks);
        debug!(total, chunks, chunk_len, "evaluating combinations in parallel");

        (0..chunks as u64)
            .into_par_iter()
            .map(|c| {
                let start = c as u128 * chunk_len;
                let end = (start + chunk_len).min(total);
                evaluate_range(shares, &points, start, end, init(), &fold)
            })
            .try_reduce(&init, |a, b| Ok(merge(a, b)))
    }
}

fn evaluate_range<T, F>(
    shares: &ShareSet,
    points: &[Point],
    start: u128,
    end: u128,
    mut acc: T,
    fold: &F,
) -> Result<T>
where
    F: Fn(&mut T, u128, &[usize], BigInt),
{
    if start >= end {
        return Ok(acc);
    }
    let combos = Combinations::starting_at(shares.len(), shares.threshold(), start)?;
    for (rank, combo) in (start..end).zip(combos) {
        let subset: Vec<Point> = combo.iter().map(|&i| points[i].clone()).collect();
        let secret = secret_at_zero(&subset)?;
        fold(&mut acc, rank, &combo, secret);
    }
    Ok(acc)
}
