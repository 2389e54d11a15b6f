use std::collections::BTreeSet;

use num_bigint::{BigInt, BigUint};
use serde::Serialize;

use crate::error::{AuditError, Result};
use crate::radix;

pub type ShareId = u32;

/// One submitted share. `decimal_value` is decoded once, at construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Share {
    pub id: ShareId,
    pub base: u32,
    pub raw_value: String,
    #[serde(serialize_with = "serialize_decimal")]
    pub decimal_value: BigUint,
}

/// A point on the sharing polynomial.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: BigInt,
    pub y: BigInt,
}

impl Share {
    pub fn new(id: ShareId, base: u32, raw_value: impl Into<String>) -> Result<Self> {
        if id == 0 {
            return Err(AuditError::InvalidShareId(id.to_string()));
        }
        let raw_value = raw_value.into();
        let decimal_value = radix::decode(&raw_value, base)?;
        Ok(Share {
            id,
            base,
            raw_value,
            decimal_value,
        })
    }

    pub fn point(&self) -> Point {
        Point {
            x: BigInt::from(self.id),
            y: BigInt::from(self.decimal_value.clone()),
        }
    }
}

/// The validated set of shares for one run, held in ascending id order,
/// together with the reconstruction threshold `k`.
#[derive(Clone, Debug)]
pub struct ShareSet {
    shares: Vec<Share>,
    threshold: usize,
}

impl ShareSet {
    pub fn new(mut shares: Vec<Share>, threshold: usize) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for share in &shares {
            if !seen.insert(share.id) {
                return Err(AuditError::IdCollision(share.id));
            }
        }
        if threshold == 0 || threshold > shares.len() {
            return Err(AuditError::InvalidThreshold {
                n: shares.len(),
                k: threshold,
            });
        }
        shares.sort_by_key(|s| s.id);
        Ok(ShareSet { shares, threshold })
    }

    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    pub fn get(&self, id: ShareId) -> Option<&Share> {
        self.shares
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|i| &self.shares[i])
    }

    /// Interpolation points for the shares at `indices` (positions in id order).
    pub fn points(&self, indices: &[usize]) -> Vec<Point> {
        indices.iter().map(|&i| self.shares[i].point()).collect()
    }
}

pub(crate) fn serialize_decimal<S>(value: &BigUint, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&value.to_str_radix(10))
}
