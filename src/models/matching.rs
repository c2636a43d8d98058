//! Filename matching shared by local lookup and remote file selection
//!
//! The only matching primitive is a case-insensitive substring test. Local
//! and remote quantization filtering both go through [`matches_quant`] so the
//! two sides always agree on what a quant tag selects.

/// File extension of model weight files
pub const GGUF_EXTENSION: &str = ".gguf";

/// Case-insensitive substring test: does `name` contain `needle`?
pub fn contains_ignore_case(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(&needle.to_lowercase())
}

/// Does a filename satisfy a quantization tag?
///
/// Loose by intent: `Q4_K_M` matches `model-q4_k_m-00001-of-00003.gguf`.
pub fn matches_quant(file_name: &str, quant: &str) -> bool {
    contains_ignore_case(file_name, quant)
}

/// Whether a filename carries the `.gguf` extension
pub fn is_gguf(file_name: &str) -> bool {
    file_name.ends_with(GGUF_EXTENSION)
}

/// Select remote files matching a quant tag
///
/// Keeps `.gguf` entries whose name contains `quant`, ignoring case, in
/// listing order.
pub fn match_remote_files<S: AsRef<str>>(remote_files: &[S], quant: &str) -> Vec<String> {
    remote_files
        .iter()
        .map(AsRef::as_ref)
        .filter(|f| is_gguf(f) && matches_quant(f, quant))
        .map(str::to_string)
        .collect()
}

/// All `.gguf` entries of a remote listing
pub fn gguf_files<S: AsRef<str>>(remote_files: &[S]) -> Vec<String> {
    remote_files
        .iter()
        .map(AsRef::as_ref)
        .filter(|f| is_gguf(f))
        .map(str::to_string)
        .collect()
}
