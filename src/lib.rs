#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod error;

/// A key-value map built on the chained `HashTable`.
///
/// This module provides a `HashMap` that hashes keys through a `KeyHasher`
/// and reports missing, duplicate, and null keys as errors.
pub mod hash_map;

pub mod hash_table;

/// Key types and the hash functions applied to them.
pub mod key;

#[cfg(test)]
mod proptests;

pub use error::Error;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_table::HashTable;
