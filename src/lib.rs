//! linkkeeper, a categorized link collection with a soft-deletion archive.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod logging;
pub mod managers;
pub mod rpc_handler;
pub mod services;
pub mod types;
