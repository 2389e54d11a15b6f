//! Reads the JSON share document:
//!
//! ```json
//! {
//!   "keys": { "n": 4, "k": 3 },
//!   "1": { "base": "10", "value": "5" },
//!   "2": { "base": 16, "value": "8" }
//! }
//! ```

use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;
use tracing::warn;

use crate::error::{AuditError, Result};
use crate::share::{Share, ShareId, ShareSet};

const KEYS: &str = "keys";

/// Top-level entries in document order. Unlike `serde_json::Map`, repeated
/// keys are kept so they can be reported instead of silently overwritten.
struct Entries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Entries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object of shares")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Entries, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// A parsed share document before threshold validation.
#[derive(Clone, Debug)]
pub struct ShareInput {
    pub declared_n: usize,
    pub threshold: usize,
    pub shares: Vec<Share>,
}

impl ShareInput {
    pub fn from_json(text: &str) -> Result<Self> {
        let Entries(entries) = serde_json::from_str(text).map_err(|e| {
            if e.is_data() {
                AuditError::MalformedInput(format!("expected a JSON object: {e}"))
            } else {
                AuditError::MalformedInput(e.to_string())
            }
        })?;

        let mut keys = None;
        let mut shares = Vec::with_capacity(entries.len());
        for (name, value) in &entries {
            if name == KEYS {
                if keys.replace(value).is_some() {
                    return Err(AuditError::MalformedInput("duplicate `keys` entry".into()));
                }
                continue;
            }
            shares.push(parse_share(name, value)?);
        }

        let keys = keys.ok_or_else(|| AuditError::missing(KEYS, "input"))?;
        let declared_n = integer_field(keys, "n", KEYS)?;
        let threshold = integer_field(keys, "k", KEYS)?;

        Ok(ShareInput {
            declared_n,
            threshold,
            shares,
        })
    }

    /// Validates ids and threshold against the shares actually present.
    pub fn into_share_set(self) -> Result<ShareSet> {
        if self.declared_n != self.shares.len() {
            warn!(
                declared = self.declared_n,
                present = self.shares.len(),
                "declared n does not match the number of shares; using the shares present"
            );
        }
        ShareSet::new(self.shares, self.threshold)
    }
}

fn parse_share_id(name: &str) -> Result<ShareId> {
    match name.trim().parse::<ShareId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AuditError::InvalidShareId(name.to_string())),
    }
}

fn parse_share(name: &str, value: &Value) -> Result<Share> {
    let id = parse_share_id(name)?;
    let location = format!("share {name}");
    let record = value
        .as_object()
        .ok_or_else(|| AuditError::MalformedInput(format!("{location} is not an object")))?;

    let base = match record.get("base") {
        None | Some(Value::Null) => return Err(AuditError::missing("base", location)),
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    }
    .and_then(|b| u32::try_from(b).ok())
    .ok_or_else(|| AuditError::MalformedInput(format!("{location}: base is not an integer")))?;

    let raw = match record.get("value") {
        None | Some(Value::Null) => return Err(AuditError::missing("value", location)),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.is_u64() => n.to_string(),
        Some(_) => {
            return Err(AuditError::MalformedInput(format!(
                "{location}: value must be a string"
            )))
        }
    };

    Share::new(id, base, raw)
}

fn integer_field(record: &Value, field: &str, location: &str) -> Result<usize> {
    match record.get(field) {
        None | Some(Value::Null) => Err(AuditError::missing(field, location)),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| {
                AuditError::MalformedInput(format!("{location}.{field} is not a non-negative integer"))
            }),
    }
}
