#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// A byte-keyed map over the Robin Hood table.
///
/// This module provides a `HashMap` that owns a hasher builder, hashes keys
/// itself and delegates storage to the `HashTable`.
pub mod hash_map;

pub mod hash_table;

mod error;
mod options;

/// Probe-distance histograms and memory statistics.
#[cfg(feature = "stats")]
pub mod stats;

pub use error::Error;
pub use hash_map::DefaultHashBuilder;
pub use hash_map::HashMap;
pub use hash_map::hash_key;
pub use hash_table::HashTable;
pub use options::Options;
