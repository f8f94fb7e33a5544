//! LocalTab library
//!
//! Storage and ordering core of the LocalTab new-tab dashboard, exposed
//! for the binary and for integration tests.

pub mod app;
pub mod config;
pub mod dashboard;
pub mod database;
pub mod error;
pub mod services;
pub mod storage;
