//! EVRYTHNG platform API integration module.
//!
//! Provides [`ThngReader`], a one-shot reader that resolves a single Thng
//! by id and classifies the response into a typed result.

mod client;
mod model;

pub use client::{
    validate_thng_id, ThngError, ThngReader, EVRYTHNG_API_BASE_URL, EVRYTHNG_API_KEY_ENV,
};
pub use model::{ErrorEnvelope, Thng};
