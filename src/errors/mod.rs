//! Error types for the travel photo log service

pub mod types;

pub use types::{AppError, ArchiveError, CollaboratorError, ExtractionError};
