//! Core types shared across the hydration pipeline.
//!
//! - [`error`] - [`HydrateError`] and the user-facing [`ErrorContext`]

pub mod error;

pub use error::{ErrorContext, HydrateError, user_friendly_error};
