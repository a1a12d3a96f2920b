//! # paychan-schema
//!
//! Field catalog, field mapping model, and API document field extraction.
//!
//! A channel's field catalog is derived from the provider's uploaded API
//! document (Swagger 2 or OpenAPI 3). Mapping definitions pair those
//! provider fields with internal field names.

pub mod catalog;
pub mod loader;
pub mod model;

pub use catalog::FieldCatalog;
pub use loader::{ApiDocument, DocumentKind, Endpoint, load_value};
pub use model::{FieldDefinition, FieldMapping};

use thiserror::Error;

/// Errors that can occur when loading documents
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported API document format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid document format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
