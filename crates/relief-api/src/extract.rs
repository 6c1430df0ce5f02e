//! Extractors whose rejections render as [`ApiError`] JSON bodies rather than
//! axum's plain-text defaults.

use axum::{
  Json,
  extract::{FromRequest, FromRequestParts, Path, Query},
};

use crate::error::ApiError;

/// A JSON request body. Malformed or incomplete bodies are a 400.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Path parameters, e.g. a request id that must parse as a UUID.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
