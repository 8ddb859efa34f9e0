// Common traits and types
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod auth_mode;
mod bucket_source;
mod client_config;
mod metric_source;
mod region;
mod spinner;

pub use auth_mode::*;
pub use bucket_source::*;
pub use client_config::*;
pub use metric_source::*;
pub use region::*;
pub use spinner::*;

/// Bucket names, in the order they will be reported.
pub type BucketNames = Vec<String>;
