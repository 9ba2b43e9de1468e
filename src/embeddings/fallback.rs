//! Deterministic fallback vectors.
//!
//! When the remote embeddings endpoint is unreachable the pipeline keeps
//! working on vectors derived from the text itself. The same input always
//! produces the same vector, so content-hash deduplication and tests stay
//! stable. Fallback vectors are dimensionally valid but carry no semantic
//! meaning.

use std::hash::{Hash, Hasher};

use twox_hash::XxHash64;

/// Derive a unit-length pseudo-embedding from `text`.
///
/// Each dimension hashes the full text with a per-dimension seed and maps
/// the result into [-0.5, 0.5]; the vector is then L2-normalized.
pub fn pseudo_embedding(text: &str, dimension: usize) -> Vec<f32> {
    let mut values = Vec::with_capacity(dimension);
    for dim in 0..dimension {
        let mut hasher = XxHash64::with_seed(dim as u64);
        text.hash(&mut hasher);
        let raw = hasher.finish();
        values.push((raw as f64 / u64::MAX as f64 - 0.5) as f32);
    }

    let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for value in &mut values {
            *value /= norm;
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_same_vector() {
        let a = pseudo_embedding("RegisterNetEvent", 64);
        let b = pseudo_embedding("RegisterNetEvent", 64);
        assert_eq!(a, b);
    }

    #[test]
    fn different_texts_differ() {
        let a = pseudo_embedding("GetPlayerPed", 64);
        let b = pseudo_embedding("TriggerEvent", 64);
        assert_ne!(a, b);
    }

    #[test]
    fn output_is_unit_length() {
        let v = pseudo_embedding("Wait(0) in a tight loop", 128);
        assert_eq!(v.len(), 128);
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }
}
