//! Shared building blocks for the stride crates

mod error;

pub use error::{ErrorBody, HttpError};
