//! Data Module - nested data ↔ tree conversion
//!
//! Encoding flattens data into path pairs and writes each pair into a
//! fresh tree; decoding collects pairs from a tree and rebuilds the data.

pub mod flatten;
pub mod unflatten;
pub mod value;

pub use flatten::flatten;
pub use unflatten::reconstruct;
pub use value::{Key, Value};

use crate::config::WriteOptions;
use crate::dom::XmlTree;
use crate::error::ConvertError;
use crate::path::{collect, write_path, write_path_cached};
use crate::query::QueryCache;
use tracing::debug;

/// Build a new tree from nested data
pub fn encode(data: &Value, options: &WriteOptions) -> Result<XmlTree, ConvertError> {
    let pairs = flatten(data)?;
    debug!(pairs = pairs.len(), "encoding flattened data");
    let mut tree = XmlTree::new();
    for (path, value) in &pairs {
        write_path(&mut tree, path, value.as_deref(), options)?;
    }
    Ok(tree)
}

/// Write nested data into a session's tree, compiling through its cache.
/// Writes stop at the first error; pairs already written stay in the tree.
pub fn encode_into(
    tree: &mut XmlTree,
    cache: &mut QueryCache,
    data: &Value,
    options: &WriteOptions,
) -> Result<(), ConvertError> {
    let pairs = flatten(data)?;
    debug!(pairs = pairs.len(), "merging flattened data");
    for (path, value) in &pairs {
        write_path_cached(tree, cache, path, value.as_deref(), options)?;
    }
    Ok(())
}

/// Rebuild nested data from a tree
pub fn decode(tree: &XmlTree) -> Result<Value, ConvertError> {
    let pairs = collect(tree);
    debug!(pairs = pairs.len(), "decoding collected pairs");
    reconstruct(&pairs)
}
