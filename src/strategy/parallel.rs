//! Parallel Path Reads
//!
//! Uses Rayon to answer many independent `read_path` lookups against one
//! tree. Reads only; writes always go through the session one at a time.

use crate::dom::DocumentAccess;
use crate::error::ConvertError;
use crate::path::read_path;
use rayon::prelude::*;

/// Read multiple paths in parallel; results keep the input order
pub fn read_paths_parallel<D: DocumentAccess + Sync>(
    doc: &D,
    paths: &[&str],
) -> Vec<Result<Option<String>, ConvertError>> {
    paths.par_iter().map(|path| read_path(doc, path)).collect()
}

/// Parallel read map - read `(key, path)` pairs and collect `(key, value)`.
/// The first malformed path fails the whole batch.
pub fn read_map<D: DocumentAccess + Sync>(
    doc: &D,
    queries: &[(&str, &str)],
) -> Result<Vec<(String, Option<String>)>, ConvertError> {
    queries
        .par_iter()
        .map(|(key, path)| read_path(doc, path).map(|v| (key.to_string(), v)))
        .collect()
}
