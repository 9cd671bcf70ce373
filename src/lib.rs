//! Local static-content HTTP server
//!
//! Serves files and directory listings from a single root directory with
//! conditional caching, gzip/deflate compression and byte ranges.

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod listing;
pub mod logger;
pub mod server;
