//! Alder - Gas transmission network analysis and mapping
//!
//! This library provides shared types and modules for the analyze binary.

pub mod analysis;
pub mod models;
pub mod render;
pub mod scigrid;

pub use models::{GridNode, Pipeline};
