//! Adapters for the domain ports: ledger stores, the session store and clocks.

pub mod clock;
pub mod in_memory;
pub mod json_file;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
