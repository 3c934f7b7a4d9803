//! Compiled query cache
//!
//! A session tends to read and rewrite the same handful of paths, so
//! parsed queries are kept in a small LRU keyed by the expression text.

use super::{compile, Query, QueryError};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::trace;

/// Default number of compiled queries kept per session
pub const DEFAULT_CAPACITY: usize = 256;

/// LRU cache of compiled queries
pub struct QueryCache {
    entries: LruCache<String, Arc<Query>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl QueryCache {
    /// Create a cache holding at most `capacity` queries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        QueryCache {
            entries: LruCache::new(capacity),
        }
    }

    /// Return the compiled form of `expr`, compiling it on a miss.
    /// Failed compilations are not cached.
    pub fn get_or_compile(&mut self, expr: &str) -> Result<Arc<Query>, QueryError> {
        if let Some(query) = self.entries.get(expr) {
            return Ok(Arc::clone(query));
        }
        let query = Arc::new(compile(expr)?);
        self.entries.put(expr.to_string(), Arc::clone(&query));
        trace!(expr, cached = self.len(), "compiled query");
        Ok(query)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
