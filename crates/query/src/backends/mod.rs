//! Document store backends.
//!
//! | Backend | Feature | Notes |
//! |---------|---------|-------|
//! | [`memory::MemoryStore`] | always | in-process; read accounting and failure injection |
//! | [`sqlite::SqliteStore`] | `sqlite` (default) | JSON documents in one table; keyset emulated in SQL |

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;
