//! Storage module
//!
//! Provides blob storage for binary data (background images).

pub mod blob_store;

pub use blob_store::BlobStore;
