//! Writing archive entries to disk.
//!
//! Zip entries are extracted concurrently by a bounded [`WorkerPool`];
//! tar.gz entries are extracted in stream order. Both paths send every
//! entry name through the [`PathGuard`](crate::security::PathGuard) before
//! touching the filesystem.

pub mod engine;
pub mod pool;
pub mod writer;

pub use pool::WorkerPool;
