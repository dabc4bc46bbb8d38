// Fature Daemon Library
// Exposes internal modules for the binary and the integration tests

extern crate log;

pub mod config;
pub mod core;
pub mod logger;
pub mod rpc;
