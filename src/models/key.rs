//! Stable identifier keys for models
//!
//! Keys name models in the llama-swap config, so they must be safe as YAML
//! mapping keys and as path segments.

use super::reference::ModelReference;

/// Quant label used when a reference has no quantization tag
pub const FULL_QUANT_LABEL: &str = "full";

/// Derive a key from a repo short name and optional quant
///
/// `"<short_name>-<quant|full>"`, lower-cased, with `.` and `_` replaced by
/// `-`. Repos differing only in punctuation collapse to the same key.
pub fn derive_key(short_name: &str, quant: Option<&str>) -> String {
    let raw = format!("{}-{}", short_name, quant.unwrap_or(FULL_QUANT_LABEL));
    raw.to_lowercase().replace('.', "-").replace('_', "-")
}

/// [`derive_key`] applied to a parsed reference
pub fn key_for(reference: &ModelReference) -> String {
    derive_key(reference.short_name(), reference.quant.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(
            derive_key("My.Model_Name", Some("Q4_K_M")),
            "my-model-name-q4-k-m"
        );
    }

    #[test]
    fn test_no_quant_uses_full() {
        assert_eq!(derive_key("x", None), "x-full");
        assert_eq!(derive_key("MyModel-GGUF", None), "mymodel-gguf-full");
    }

    #[test]
    fn test_key_for_reference() {
        let r = ModelReference::parse("user/Qwen3-8B-GGUF:Q4_K_M", None);
        assert_eq!(key_for(&r), "qwen3-8b-gguf-q4-k-m");

        let r = ModelReference::parse("user/My.Model-GGUF:Q4_K_M", None);
        assert_eq!(key_for(&r), "my-model-gguf-q4-k-m");
    }

    #[test]
    fn test_punctuation_collisions() {
        assert_eq!(derive_key("a.b", Some("q")), derive_key("a_b", Some("q")));
    }
}
