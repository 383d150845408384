//! Data Transfer Objects for API requests and responses.
//!
//! Request DTOs use Serde for JSON deserialization and validator for input
//! validation.

pub mod export;
pub mod health;
