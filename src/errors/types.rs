//! Error type definitions for the travel photo log service
//!
//! This module defines all error types used throughout the application,
//! providing a hierarchical error system: metadata extraction failures,
//! collaborator-service failures and archival-pipeline failures each get
//! their own enum, with a top-level `AppError` tying them together.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// EXIF metadata extraction errors
    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    /// External collaborator errors (geocoding, weather, places, sheets, auth)
    #[error("{0}")]
    Collaborator(#[from] CollaboratorError),

    /// Image archival pipeline errors
    #[error("{0}")]
    Archive(#[from] ArchiveError),

    /// Malformed or missing request parameters
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Missing or invalid session credentials
    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Filesystem failures while staging uploads
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Coordinate/metadata extraction errors
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// GPS latitude, longitude or a hemisphere reference is absent
    #[error("No complete GPS data found")]
    MissingGpsData,

    /// Coordinates present but outside valid degree ranges
    #[error("GPS coordinates out of range: lat {latitude}, lon {longitude}")]
    CoordinatesOutOfRange { latitude: f64, longitude: f64 },

    /// The EXIF container could not be parsed at all
    #[error("Error parsing EXIF data: {message}")]
    UnreadableExif { message: String },
}

/// Errors from the external collaborator services
#[derive(Error, Debug)]
pub enum CollaboratorError {
    /// Non-success response from a collaborator
    #[error("{service} request failed: {message}")]
    RequestFailed { service: String, message: String },

    /// Collaborator returned a payload we could not interpret
    #[error("{service} returned an invalid response: {message}")]
    InvalidResponse { service: String, message: String },

    /// Authentication against a collaborator failed
    #[error("{service} authentication failed: {message}")]
    AuthFailed { service: String, message: String },
}

/// Image archival pipeline errors
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Extension outside the supported raster set, rejected before any I/O
    #[error("Unsupported image format: {path}")]
    UnsupportedFormat { path: String },

    /// Any decode/resize/encode/upload step failed
    #[error("Error processing and uploading {path}: {message}")]
    ProcessingFailed { path: String, message: String },
}

impl AppError {
    /// Create an invalid request error
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an unauthenticated error
    pub fn unauthenticated<S: Into<String>>(message: S) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }
}

impl CollaboratorError {
    /// Create a request failed error
    pub fn request_failed<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::RequestFailed {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::InvalidResponse {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create an authentication failed error
    pub fn auth_failed<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::AuthFailed {
            service: service.into(),
            message: message.into(),
        }
    }
}

impl ArchiveError {
    /// Create a processing failed error carrying the underlying cause
    pub fn processing_failed<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::ProcessingFailed {
            path: path.into(),
            message: message.into(),
        }
    }
}
