//! Shared error plumbing used across the conduit crates.

pub mod context;

pub use context::FromMessage;
