//! Configuration module for batch fetching
//!
//! This module provides the `FetchConfig` struct, its type-safe builder, and
//! the environment overrides used by the binary.

// Sub-modules
pub mod builder;
pub mod env;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::{FetchConfigBuilder, WithInputPath};
pub use env::apply_env_overrides;
pub use types::FetchConfig;
