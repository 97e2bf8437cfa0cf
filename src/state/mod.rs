/// State management module
///
/// This module handles all review state, including:
/// - Shared data structures (data.rs)
/// - The submission store and its MongoDB implementation (store.rs)

pub mod data;
pub mod store;

#[cfg(test)]
pub mod memory;
