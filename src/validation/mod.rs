//! Fix admission and the application-facing error taxonomy

pub mod admission;
pub mod error;

pub use admission::{AdmissionFilter, Rejection};
pub use error::LocationError;
