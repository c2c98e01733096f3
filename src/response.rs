//! Success and error envelopes returned across the HTTP boundary.
//!
//! Both shapes carry `status_code`, `data`, `message` and `success`. The
//! classification rule lives in the constructors: a status code of 400 or
//! above is a failure, so `success` is false and `data` is null no matter
//! what payload the caller handed in.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Serialize, Serializer};

pub const DEFAULT_SUCCESS_MESSAGE: &str = "success";
pub const DEFAULT_ERROR_MESSAGE: &str = "something went wrong";

fn serialize_status<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u16(status.as_u16())
}

fn is_failure(status: StatusCode) -> bool {
    status.as_u16() >= 400
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    #[serde(serialize_with = "serialize_status")]
    status_code: StatusCode,
    data: Option<T>,
    message: String,
    success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        let success = !is_failure(status);
        Self {
            status_code: status,
            data: if success { Some(data) } else { None },
            message: message.into(),
            success,
        }
    }

    pub fn ok(data: T) -> Self {
        Self::new(StatusCode::OK, data, DEFAULT_SUCCESS_MESSAGE)
    }

    pub fn created(data: T) -> Self {
        Self::new(StatusCode::CREATED, data, DEFAULT_SUCCESS_MESSAGE)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn success(&self) -> bool {
        self.success
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status_code, Json(self)).into_response()
    }
}

/// Error envelope. `data` is always null and `success` always false.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(serialize_with = "serialize_status")]
    status_code: StatusCode,
    data: (),
    message: String,
    success: bool,
    errors: Vec<String>,
    #[serde(skip)]
    trace: Option<String>,
}

impl ApiError {
    /// Builds an error envelope and captures a backtrace when the runtime has
    /// backtraces enabled (`RUST_BACKTRACE`). Status codes below 400 are
    /// coerced to 500.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        let status_code = if is_failure(status) {
            status
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        Self {
            status_code,
            data: (),
            message: message.into(),
            success: false,
            errors: Vec::new(),
            trace: capture_trace(),
        }
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }

    /// Replaces the captured trace with one supplied by the caller.
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }
}

impl Default for ApiError {
    fn default() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, DEFAULT_ERROR_MESSAGE)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status_code.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Some(trace) = &self.trace {
            tracing::debug!(status = self.status_code.as_u16(), message = %self.message, trace = %trace, "Error response");
        }
        (self.status_code, Json(self)).into_response()
    }
}

fn capture_trace() -> Option<String> {
    let backtrace = Backtrace::capture();
    match backtrace.status() {
        BacktraceStatus::Captured => Some(backtrace.to_string()),
        _ => None,
    }
}
