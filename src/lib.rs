//! offcache - Offline Resource Cache
//!
//! Seeds versioned cache generations from a resource manifest, prunes
//! superseded generations on activation, and serves requests from the
//! current generation without ever falling back to the network.

pub mod audit;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod storage;
pub mod ui;

pub use error::{OffcacheError, OffcacheResult};
