//! Error types for the Reelforge workflow engine.
//!
//! This crate provides the foundation error types used throughout the Reelforge workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use reelforge_error::{CapabilityError, CapabilityErrorKind, ReelforgeResult};
//!
//! fn lookup() -> ReelforgeResult<String> {
//!     Err(CapabilityError::new(CapabilityErrorKind::CapabilityNotFound("llm/missing".to_string())))?
//! }
//!
//! assert!(lookup().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod capability;
mod config;
mod error;
mod json;
mod pipeline;
mod provider;
mod storage;

pub use builder::{BuilderError, BuilderErrorKind};
pub use capability::{CapabilityError, CapabilityErrorKind};
pub use config::ConfigError;
pub use error::{ReelforgeError, ReelforgeErrorKind, ReelforgeResult};
pub use json::{JsonError, JsonErrorKind};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use provider::{ProviderError, ProviderErrorKind, RetryableError};
pub use storage::{StorageError, StorageErrorKind};
