//! Service layer for per-user bookmark collections.
//! - `bookmarks`: record types and validation of incoming data.
//! - `storage`: pluggable backends holding the whole user map.
//! - `user_store`: the operations the HTTP handlers call.

pub mod errors;
pub mod bookmarks;
pub mod storage;
pub mod user_store;
pub mod runtime;
