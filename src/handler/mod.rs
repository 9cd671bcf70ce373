//! Request handler module
//!
//! Path resolution, request dispatch and the static content responder.

pub mod resolve;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
