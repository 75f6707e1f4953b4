//! Shared test infrastructure for the query layer.
//!
//! Each integration test binary compiles this module on its own and uses a
//! different subset of it.

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
