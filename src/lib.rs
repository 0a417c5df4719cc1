//! Linkbook: the data and ordering engine behind a grouped, pinnable link book.
//!
//! This library crate exposes all modules for use by the RPC binary and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod store;
pub mod types;
