//! Configuration management
//!
//! This module handles the node's runtime settings: the listen address,
//! proof-of-work difficulty, and gossip flood depth, each overridable via
//! environment variables.

pub mod settings;

pub use settings::{Config, GLOBAL_CONFIG};
