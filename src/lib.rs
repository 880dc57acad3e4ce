#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

macro_rules! log_debug {
    ($($arg:tt)+) => {
        #[cfg(feature = "logging")]
        ::log::debug!($($arg)+);
    };
}

macro_rules! log_warn {
    ($($arg:tt)+) => {
        #[cfg(feature = "logging")]
        ::log::warn!($($arg)+);
    };
}

/// Table configuration: load limit, minimum capacity, growth and deletion
/// policies.
pub mod config;

mod error;

pub mod hash;

/// A HashMap built on the Robin Hood probe engine.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with configurable hashers.
pub mod hash_map;

pub mod hash_table;

/// A read-only view that is either a dynamic map or a static table.
pub mod lookup_table;

mod slots;

pub mod static_table;

pub use error::Error;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_table::HashTable;
pub use lookup_table::LookupTable;
pub use static_table::StaticTable;
