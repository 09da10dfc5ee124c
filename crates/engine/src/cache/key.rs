//! Content-addressed cache keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use relic_core::{CombatContext, RelicId};

/// Hex-encoded SHA-256 digest identifying one composition input.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

#[derive(Serialize)]
struct KeyMaterial<'a> {
    relic_ids: &'a [&'a str],
    context: &'a CombatContext,
    version: &'a str,
}

impl CacheKey {
    /// Computes the key for `(relic_ids, context, engine_version)`.
    ///
    /// Ids are sorted ascending so input order never changes the key, and
    /// the caller passes the normalized context. Canonical JSON comes from
    /// routing through `serde_json::Value`, whose object maps are
    /// BTreeMap-backed and therefore serialize with sorted keys.
    pub fn compute(relic_ids: &[RelicId], context: &CombatContext, engine_version: &str) -> Self {
        let mut ids: Vec<&str> = relic_ids.iter().map(RelicId::as_str).collect();
        ids.sort_unstable();

        let material = KeyMaterial {
            relic_ids: &ids,
            context,
            version: engine_version,
        };
        let canonical = serde_json::to_value(&material)
            .expect("key material serializes")
            .to_string();

        let digest = Sha256::digest(canonical.as_bytes());
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
