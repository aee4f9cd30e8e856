//! Travel photo log service library
//!
//! The workflow: a geotagged photo is uploaded, GPS/time metadata is
//! extracted from its EXIF tags, the coordinates are enriched with
//! reverse-geocoding, weather and nearby points of interest, the
//! confirmed record is appended to a spreadsheet, and the image is
//! re-encoded and archived to object storage.
//!
//! Every external collaborator (geocoding, weather, places, spreadsheet,
//! object storage, session provider) sits behind a trait in
//! [`services`] / [`storage`] so it can be substituted with a test
//! double.

pub mod config;
pub mod errors;
pub mod exif;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
pub mod web;
