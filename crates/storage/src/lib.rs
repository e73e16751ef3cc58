//! S3-compatible object storage for gallery image bytes.

pub mod config;
pub mod s3;

pub use config::{StorageConfig, StorageConfigError};
pub use s3::S3ObjectStore;
