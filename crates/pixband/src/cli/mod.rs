//! Command implementations.

pub mod bench;
pub mod config;
pub mod profile;
pub mod transform;
