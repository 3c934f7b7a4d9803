//! ResourceArc Wrappers
//!
//! Persistent conversion sessions: a tree plus the compiled-query cache
//! used by every write and read against it.

use crate::dom::XmlTree;
use crate::query::QueryCache;
use rustler::ResourceArc;
use std::sync::Mutex;

/// One tree and its query cache
#[derive(Default)]
pub struct Session {
    pub tree: XmlTree,
    pub queries: QueryCache,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already built tree with an empty cache
    pub fn from_tree(tree: XmlTree) -> Self {
        Session {
            tree,
            queries: QueryCache::default(),
        }
    }
}

/// Wrapper for a Session that can be stored in a ResourceArc
pub struct TreeResource {
    pub session: Mutex<Session>,
}

impl TreeResource {
    pub fn new(session: Session) -> Self {
        TreeResource {
            session: Mutex::new(session),
        }
    }

    /// Run `f` with exclusive access to the session.
    ///
    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if the session mutex is poisoned.
    pub fn with_session<F, R>(&self, f: F) -> Result<R, &'static str>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut guard = self.session.lock().map_err(|_| "mutex_poisoned")?;
        Ok(f(&mut guard))
    }
}

#[rustler::resource_impl]
impl rustler::Resource for TreeResource {}

impl Default for TreeResource {
    fn default() -> Self {
        Self::new(Session::new())
    }
}

/// Type alias for the tree ResourceArc
pub type TreeRef = ResourceArc<TreeResource>;
