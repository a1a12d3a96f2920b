#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # paychan-pipeline
//!
//! Batch application of channel field mappings.
//!
//! A [`BatchApplier`] runs a whole mapping set over one payload,
//! renaming fields and running their transform rules. Every mapping is
//! attempted before the batch fails, so the caller sees every problem at
//! once in [`Error::Aggregate`].

pub mod batch;
pub mod policies;

pub use batch::{BatchApplier, BatchResult};
pub use policies::{ApplyConfig, TRADE_QUERY_RESPONSE, output_key};

use thiserror::Error;

/// Errors that can occur while applying a mapping set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Batch apply failed with {} error(s): {}", errors.len(), errors.join("; "))]
    Aggregate { errors: Vec<String> },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl Error {
    /// Every underlying message, in mapping order
    #[must_use]
    pub fn errors(&self) -> &[String] {
        match self {
            Error::Aggregate { errors } => errors,
            Error::InvalidPayload(_) => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
