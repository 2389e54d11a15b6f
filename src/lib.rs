//! Recovers a threshold-shared secret from a share set that may contain a
//! corrupted share, and points at the share most likely to be corrupted.
//!
//! Every k-subset of the n shares is interpolated at x = 0 with exact
//! arithmetic; the most frequent result is taken as the secret and each
//! share is scored by how often its combinations disagree with it.

pub mod analysis;
pub mod combinations;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod interpolate;
pub mod radix;
pub mod report;
pub mod share;
pub mod tally;

pub use analysis::{ShareStat, Verdict};
pub use combinations::*;
pub use config::AuditConfig;
pub use engine::*;
pub use error::*;
pub use input::*;
pub use interpolate::*;
pub use radix::{decode, encode};
pub use report::*;
pub use share::*;
pub use tally::*;

/// Parses a JSON share document and audits it with `config`.
pub fn audit_json(text: &str, config: AuditConfig) -> Result<AuditReport> {
    let shares = ShareInput::from_json(text)?.into_share_set()?;
    AuditEngine::new(config).audit(&shares)
}
