//! Storage modules for Datasetio
//!
//! Provides filesystem dataset storage and metadata management.

pub mod file_store;
pub mod metadata_store;

pub use file_store::{FileStore, compute_hash};
pub use metadata_store::{DatasetRecord, MetadataStore, ProjectRecord};
