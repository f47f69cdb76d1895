//! Common types, traits, and error definitions for rust_highway_planning
//!
//! This module provides the foundational building blocks shared by the
//! road geometry model and the highway planner.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
