//! IO modules - external interfaces around the pipeline core
//!
//! This module contains the external collaborators:
//! - `gateway` - submission parsing and non-blocking admission
//! - `http` - HTTP ingestion endpoint plus operational endpoints

pub mod gateway;
pub mod http;

// Re-export commonly used types
pub use gateway::{SubmissionGateway, SubmitOutcome};
pub use http::start_http_server;
