//! Lexicographic enumeration of k-subsets of `0..n`.
//!
//! A combination is a strictly increasing vector of `k` positions into the
//! id-ordered share list. Combinations are produced in lexicographic order,
//! which is also their rank order, so `[0, C(n,k))` can be split into
//! contiguous chunks and each chunk resumed with [`Combinations::starting_at`].

use crate::error::{AuditError, Result};

/// `C(n, k)`, or `None` if it does not fit in a `u128`.
pub fn binomial(n: usize, k: usize) -> Option<u128> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        // acc * (n - i) is always divisible by (i + 1)
        acc = acc.checked_mul((n - i) as u128)? / (i as u128 + 1);
    }
    Some(acc)
}

fn check(n: usize, k: usize) -> Result<()> {
    if k == 0 || k > n {
        return Err(AuditError::InvalidThreshold { n, k });
    }
    Ok(())
}

#[derive(Clone, Debug)]
pub struct Combinations {
    n: usize,
    k: usize,
    current: Option<Vec<usize>>,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Result<Self> {
        check(n, k)?;
        Ok(Combinations {
            n,
            k,
            current: Some((0..k).collect()),
        })
    }

    /// Resumes enumeration at the combination with lexicographic `rank`.
    /// A rank past the end yields an empty iterator.
    pub fn starting_at(n: usize, k: usize, mut rank: u128) -> Result<Self> {
        check(n, k)?;
        let total = binomial(n, k).unwrap_or(u128::MAX);
        if rank >= total {
            return Ok(Combinations { n, k, current: None });
        }

        let mut indices = Vec::with_capacity(k);
        let mut candidate = 0;
        for slot in 0..k {
            loop {
                let rest = binomial(n - candidate - 1, k - slot - 1).unwrap_or(u128::MAX);
                if rank < rest {
                    indices.push(candidate);
                    candidate += 1;
                    break;
                }
                rank -= rest;
                candidate += 1;
            }
        }
        Ok(Combinations {
            n,
            k,
            current: Some(indices),
        })
    }

    fn advance(&mut self) {
        let (n, k) = (self.n, self.k);
        let Some(indices) = self.current.as_mut() else {
            return;
        };
        // rightmost slot that can still move right
        let Some(slot) = (0..k).rev().find(|&i| indices[i] < n - k + i) else {
            self.current = None;
            return;
        };
        indices[slot] += 1;
        for j in slot + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let out = self.current.clone()?;
        self.advance();
        Some(out)
    }
}
