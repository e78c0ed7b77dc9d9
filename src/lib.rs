//! Library crate for courtside-back, exposing modules for binaries and integration tests.

/// Application configuration loading.
pub mod config;
/// Local cache, remote backends and record models.
pub mod dao;
mod dto;
mod error;
/// HTTP routers.
pub mod routes;
/// Domain services and background tasks.
pub mod services;
/// Shared application state and the synchronised collections.
pub mod state;
