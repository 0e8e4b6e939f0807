//! HTTP handlers

pub mod home;
pub mod health;
pub mod predict;

#[cfg(test)]
mod tests;

use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::AppError;

/// Turns a panic inside a handler into the generic 500 body
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::InternalError(format!("handler panicked: {}", detail)).into_response()
}
