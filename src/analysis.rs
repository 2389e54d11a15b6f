use std::cmp::Ordering;

use num_bigint::BigInt;
use serde::Serialize;
use tracing::{debug, warn};

use crate::share::{ShareId, ShareSet};

/// How often a share appeared in combinations that agree with the majority secret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ShareStat {
    pub id: ShareId,
    pub total: u128,
    pub agreeing: u128,
    pub disagreeing: u128,
}

impl ShareStat {
    pub fn error_rate(&self) -> f64 {
        percentage(self.disagreeing, self.total)
    }

    pub fn correctness_rate(&self) -> f64 {
        percentage(self.agreeing, self.total)
    }

    /// Exact comparison of error rates, `disagreeing / total`.
    fn cmp_error_rate(&self, other: &ShareStat) -> Ordering {
        if self.total == 0 || other.total == 0 {
            return self.error_rate().total_cmp(&other.error_rate());
        }
        let lhs = self.disagreeing.checked_mul(other.total);
        let rhs = other.disagreeing.checked_mul(self.total);
        match (lhs, rhs) {
            (Some(l), Some(r)) => l.cmp(&r),
            _ => self.error_rate().total_cmp(&other.error_rate()),
        }
    }
}

pub fn percentage(part: u128, total: u128) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Verdict {
    WrongShare {
        share_id: ShareId,
        error_rate: f64,
        #[serde(serialize_with = "serialize_secret")]
        majority_secret: BigInt,
    },
    NoShareIdentified {
        #[serde(serialize_with = "serialize_secret")]
        majority_secret: BigInt,
    },
}

impl Verdict {
    pub fn majority_secret(&self) -> &BigInt {
        match self {
            Verdict::WrongShare {
                majority_secret, ..
            } => majority_secret,
            Verdict::NoShareIdentified { majority_secret } => majority_secret,
        }
    }

    pub fn wrong_share(&self) -> Option<ShareId> {
        match self {
            Verdict::WrongShare { share_id, .. } => Some(*share_id),
            Verdict::NoShareIdentified { .. } => None,
        }
    }
}

pub(crate) fn serialize_secret<S>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&value.to_str_radix(10))
}

/// Per-share appearance counters, split by agreement with the majority secret.
///
/// Built in a second pass once the majority is known; partial counters over
/// disjoint rank ranges are combined with [`ShareAgreement::merge`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareAgreement {
    total: Vec<u128>,
    agreeing: Vec<u128>,
}

impl ShareAgreement {
    pub fn new(share_count: usize) -> Self {
        ShareAgreement {
            total: vec![0; share_count],
            agreeing: vec![0; share_count],
        }
    }

    /// Every combination agreed: each share appears `appearances` times, all agreeing.
    pub fn unanimous(share_count: usize, appearances: u128) -> Self {
        ShareAgreement {
            total: vec![appearances; share_count],
            agreeing: vec![appearances; share_count],
        }
    }

    pub fn record(&mut self, combination: &[usize], agrees: bool) {
        for &i in combination {
            self.total[i] += 1;
            if agrees {
                self.agreeing[i] += 1;
            }
        }
    }

    pub fn merge(mut self, other: ShareAgreement) -> ShareAgreement {
        for (a, b) in self.total.iter_mut().zip(&other.total) {
            *a += *b;
        }
        for (a, b) in self.agreeing.iter_mut().zip(&other.agreeing) {
            *a += *b;
        }
        self
    }
}

/// Per-share agreement statistics, in share-set order.
pub fn share_stats(shares: &ShareSet, agreement: &ShareAgreement) -> Vec<ShareStat> {
    shares
        .shares()
        .iter()
        .enumerate()
        .map(|(i, share)| {
            let total = agreement.total[i];
            let agreeing = agreement.agreeing[i];
            ShareStat {
                id: share.id,
                total,
                agreeing,
                disagreeing: total - agreeing,
            }
        })
        .collect()
}

/// Flags the share with the strictly highest error rate if that rate is above
/// `threshold_percent`. A tie for the highest rate flags nobody.
pub fn verdict(stats: &[ShareStat], majority: &BigInt, threshold_percent: f64) -> Verdict {
    let mut worst: Option<&ShareStat> = None;
    let mut tied = false;
    for stat in stats {
        match worst.map(|w| stat.cmp_error_rate(w)) {
            None | Some(Ordering::Greater) => {
                worst = Some(stat);
                tied = false;
            }
            Some(Ordering::Equal) => tied = true,
            Some(Ordering::Less) => {}
        }
    }

    let no_share = Verdict::NoShareIdentified {
        majority_secret: majority.clone(),
    };
    let Some(worst) = worst else {
        return no_share;
    };
    let rate = worst.error_rate();
    if rate <= threshold_percent {
        debug!(share = worst.id, rate, threshold_percent, "highest error rate below threshold");
        return no_share;
    }
    if tied {
        warn!(
            rate,
            "several shares share the highest error rate; more than one share may be corrupted"
        );
        return no_share;
    }

    Verdict::WrongShare {
        share_id: worst.id,
        error_rate: rate,
        majority_secret: majority.clone(),
    }
}
