//! Hashing System - SHA-256 over Canonical Forms
//!
//! Render identity and output identity are both plain digests, so two runs
//! with the same request can be compared without diffing bytes.

use serde::Serialize;
use serde_json::{to_string, Value};
use sha2::{Digest, Sha256};

use crate::turtle::Segment;

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    to_string(&sort_value(&v))
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            let sorted_map: serde_json::Map<String, Value> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), sort_value(v)))
                .collect();
            Value::Object(sorted_map)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_value).collect()),
        _ => v.clone(),
    }
}

#[derive(Serialize)]
struct NormalizedSegment {
    start: [f64; 2],
    end: [f64; 2],
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0 + 0.0
}

/// Digest of the segment list with coordinates rounded to two decimals,
/// stable enough to pin drawing geometry in regression tests.
pub fn segments_digest(segments: &[Segment]) -> Result<String, serde_json::Error> {
    let normalized: Vec<NormalizedSegment> = segments
        .iter()
        .map(|s| NormalizedSegment {
            start: [round2(s.start.x), round2(s.start.y)],
            end: [round2(s.end.x), round2(s.end.y)],
        })
        .collect();
    Ok(sha256_hex(canonical_json(&normalized)?.as_bytes()))
}

/// job_hash = sha256(label + canonical_request + engine_version)
pub fn compute_job_hash(
    label: &str,
    request: &impl Serialize,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let canonical_request = canonical_json(request)?;
    let combined = format!("{}:{}:{}", label, canonical_request, engine_version);
    Ok(sha256_hex(combined.as_bytes()))
}

// We need hex encoding
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}
