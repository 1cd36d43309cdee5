//! Filesystem I/O: log ingest, curve JSON, and staged output files.

pub mod curve;
pub mod export;
pub mod ingest;

pub use ingest::load_log;
