use std::fmt;

use num_bigint::BigInt;
use serde::Serialize;

use crate::analysis::{percentage, serialize_secret, ShareStat, Verdict};
use crate::share::{Share, ShareId, ShareSet};
use crate::tally::SecretTally;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SecretFrequency {
    #[serde(serialize_with = "serialize_secret")]
    pub secret: BigInt,
    pub count: u128,
    pub percentage: f64,
    /// Share ids of the first combination that produced this secret.
    pub first_combination: Vec<ShareId>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShareRow {
    pub id: ShareId,
    pub total: u128,
    pub agreeing: u128,
    pub disagreeing: u128,
    pub correctness_rate: f64,
    pub error_rate: f64,
}

impl From<ShareStat> for ShareRow {
    fn from(s: ShareStat) -> Self {
        ShareRow {
            id: s.id,
            total: s.total,
            agreeing: s.agreeing,
            disagreeing: s.disagreeing,
            correctness_rate: s.correctness_rate(),
            error_rate: s.error_rate(),
        }
    }
}

/// Everything one audit run produced, ready for rendering.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuditReport {
    pub shares: Vec<Share>,
    pub threshold: usize,
    pub total_combinations: u128,
    pub distinct_secrets: usize,
    /// Most frequent secrets first, cut to the configured ranking limit.
    pub ranking: Vec<SecretFrequency>,
    #[serde(serialize_with = "serialize_secret")]
    pub majority_secret: BigInt,
    pub majority_count: u128,
    pub majority_percentage: f64,
    pub share_stats: Vec<ShareRow>,
    pub verdict: Verdict,
}

impl AuditReport {
    pub fn new(
        shares: &ShareSet,
        tally: &SecretTally,
        stats: Vec<ShareStat>,
        verdict: Verdict,
        ranking_limit: usize,
    ) -> Self {
        let total = tally.total();
        let ids: Vec<ShareId> = shares.shares().iter().map(|s| s.id).collect();
        let ranking = tally
            .ranked()
            .into_iter()
            .take(ranking_limit)
            .map(|(secret, bucket)| SecretFrequency {
                secret: secret.clone(),
                count: bucket.count,
                percentage: percentage(bucket.count, total),
                first_combination: bucket.first.iter().map(|&i| ids[i]).collect(),
            })
            .collect();

        let majority_secret = verdict.majority_secret().clone();
        let majority_count = tally.bucket(&majority_secret).map_or(0, |b| b.count);

        AuditReport {
            shares: shares.shares().to_vec(),
            threshold: shares.threshold(),
            total_combinations: total,
            distinct_secrets: tally.distinct_secrets(),
            ranking,
            majority_percentage: percentage(majority_count, total),
            majority_secret,
            majority_count,
            share_stats: stats.into_iter().map(ShareRow::from).collect(),
            verdict,
        }
    }

    pub fn wrong_share(&self) -> Option<&Share> {
        let id = self.verdict.wrong_share()?;
        self.shares.iter().find(|s| s.id == id)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

const RULE: &str =
    "--------------------------------------------------------------------------------";

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Parsed {} shares:", self.shares.len())?;
        for share in &self.shares {
            writeln!(f, "Share {}: {}", share.id, share.decimal_value)?;
        }

        writeln!(
            f,
            "\nTrying all {} combinations of exactly {} shares...",
            self.total_combinations, self.threshold
        )?;

        writeln!(f, "\nSecret frequency analysis:")?;
        for (i, row) in self.ranking.iter().enumerate() {
            writeln!(
                f,
                "  {}. Secret {}: appears in {} combinations ({:.2}%)",
                i + 1,
                row.secret,
                row.count,
                row.percentage
            )?;
        }

        writeln!(f, "\nMost frequent secret: {}", self.majority_secret)?;
        writeln!(
            f,
            "Appears in {} out of {} combinations ({:.2}%)",
            self.majority_count, self.total_combinations, self.majority_percentage
        )?;

        writeln!(f, "\nShare analysis:")?;
        writeln!(f, "{RULE}")?;
        writeln!(
            f,
            "{:<6} {:<6} {:<8} {:<10} {:<10} {}",
            "Share", "Total", "Correct", "Incorrect", "Correct %", "Error Rate"
        )?;
        writeln!(f, "{RULE}")?;
        for row in &self.share_stats {
            writeln!(
                f,
                "{:<6} {:<6} {:<8} {:<10} {:<9.1}% {:.1}%",
                row.id, row.total, row.agreeing, row.disagreeing, row.correctness_rate, row.error_rate
            )?;
        }

        writeln!(f, "\n*** ANALYSIS RESULT ***")?;
        match (&self.verdict, self.wrong_share()) {
            (Verdict::WrongShare { error_rate, .. }, Some(share)) => {
                writeln!(f, "WRONG SHARE IDENTIFIED: Share {}", share.id)?;
                writeln!(f, "Share {} value: {}", share.id, share.decimal_value)?;
                writeln!(
                    f,
                    "This share appears in incorrect combinations {error_rate:.1}% of the time"
                )?;
                writeln!(f, "Correct secret: {}", self.majority_secret)?;
                writeln!(f, "\nFinal Result:")?;
                writeln!(f, "Correct secret: {}", self.majority_secret)?;
                writeln!(f, "Wrong share(s):")?;
                writeln!(
                    f,
                    "  Share {}: base={}, value='{}' (decimal: {})",
                    share.id, share.base, share.raw_value, share.decimal_value
                )
            }
            _ => {
                writeln!(f, "Could not definitively identify a single wrong share")?;
                writeln!(f, "\nFinal Result:")?;
                writeln!(f, "Correct secret: {}", self.majority_secret)?;
                writeln!(f, "No wrong shares definitively identified")
            }
        }
    }
}
