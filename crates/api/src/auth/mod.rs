//! Authentication primitives.
//!
//! Users are provisioned outside this service; it only verifies the access
//! tokens they present.
//!
//! - [`jwt`] -- JWT access-token generation and validation.

pub mod jwt;
