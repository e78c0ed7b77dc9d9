/// Device-local key/value cache.
pub mod local_cache;
/// Record and entity definitions.
pub mod models;
/// Remote authoritative collections and their backends.
pub mod remote_store;
/// Storage error taxonomy shared by the remote backends.
pub mod storage;
