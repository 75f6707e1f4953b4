//! Pager tests.
//!
//! The in-memory store counts every query and every document it reads, so
//! these tests check read cost as well as results.

pub mod hybrid_tests;
pub mod keyset_tests;
pub mod lookup_tests;
pub mod search_tests;
