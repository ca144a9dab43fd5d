//! tidekv: a durable single-node key-value store.
//!
//! In-memory state lives in [`store::KeyValueStore`]; every accepted mutation
//! is recorded by [`wal_writer::FileTransactionLog`] in an append-only,
//! sequence-numbered transaction log. On startup [`recovery::replay_log`]
//! rebuilds the store from the log before the HTTP surface is exposed.

pub mod config;
pub mod errors;
pub mod event;
pub mod recovery;
pub mod server;
pub mod store;
pub mod telemetry;
pub mod wal_reader;
pub mod wal_writer;
