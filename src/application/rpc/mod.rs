//! The common wallet RPC service: token auth, the permission-checked method
//! table and the HTTP server in front of it.
pub mod auth;
pub mod core;
pub mod server;
