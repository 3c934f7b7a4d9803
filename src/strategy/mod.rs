//! Strategy Module
//!
//! Execution strategies layered over the single-threaded core:
//! - Parallel reads (rayon) for batches of path lookups

pub mod parallel;

pub use parallel::{read_map, read_paths_parallel};
