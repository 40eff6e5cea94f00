//! Datasetio Core - Core library for the dataset management service

pub mod error;
pub mod operations;
pub mod storage;

pub use error::{DatasetError, Result};
pub use operations::*;
pub use storage::{
    DatasetRecord, FileStore, MetadataStore, ProjectRecord, compute_hash,
};
