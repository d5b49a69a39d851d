//! Persistence-service integration for edukit.
//!
//! Implements the store traits from `edukit-core` over HTTP and in memory,
//! plus configuration loading and the optimistic-update helper.

pub mod config;
pub mod http;
pub mod memory;
pub mod optimistic;

pub use config::{load_config, load_config_from, EdukitConfig};
pub use http::HttpStore;
pub use memory::MemoryStore;
pub use optimistic::Optimistic;
