//! Path Module - write and read trees through path strings
//!
//! - `segment`: fragment splitting and classification
//! - `resolver`: resolve one fragment against a node, creating as needed
//! - `writer`: full path writes with overwrite detection
//! - `reader`: document-order `(path, value)` collection and point reads

pub mod reader;
pub mod resolver;
pub mod segment;
pub mod writer;

pub use reader::{collect, read_path, read_path_cached, PathPair};
pub use writer::{write_path, write_path_cached};
