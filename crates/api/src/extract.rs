//! Request extractors whose rejections render through [`AppError`].
//!
//! axum's own `Json` and `Path` reject malformed input with plain-text
//! 400/422 responses. These wrappers route the same failures into the JSON
//! error envelope as `400 VALIDATION_ERROR`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Typed path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
