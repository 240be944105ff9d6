#![allow(clippy::disallowed_types)]
//! Lock wrappers so lock choices stay swappable in one place.

/// A synchronous mutex.
pub type SyncMutex<T> = parking_lot::Mutex<T>;
/// A synchronous read-write lock.
pub type SyncRwLock<T> = parking_lot::RwLock<T>;
