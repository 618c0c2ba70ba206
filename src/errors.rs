use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {message}")]
    BadRequest {
        code: &'static str,
        message: &'static str,
    },
    #[error("unauthorized: {message}")]
    Unauthorized {
        code: &'static str,
        message: &'static str,
    },
    #[error("forbidden: {message}")]
    Forbidden {
        code: &'static str,
        message: &'static str,
    },
    #[error("internal error")]
    Internal { code: &'static str, message: String },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: &'static str) -> Self {
        Self::BadRequest { code, message }
    }

    pub fn unauthorized(code: &'static str, message: &'static str) -> Self {
        Self::Unauthorized { code, message }
    }

    pub fn forbidden(code: &'static str, message: &'static str) -> Self {
        Self::Forbidden { code, message }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            code: "internal_error",
            message: message.into(),
        }
    }
}

impl From<Fault> for AppError {
    fn from(fault: Fault) -> Self {
        Self::internal(fault.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, code, message.to_string())
            }
            Self::Unauthorized { code, message } => {
                (StatusCode::UNAUTHORIZED, code, message.to_string())
            }
            Self::Forbidden { code, message } => (StatusCode::FORBIDDEN, code, message.to_string()),
            Self::Internal { code, message } => {
                tracing::error!(error = %message, "request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code,
                    "internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                code: code.to_string(),
                message,
                details: json!({}),
            }),
        )
            .into_response()
    }
}

/// Failures raised while talking to the monitoring backend or provisioning hosts.
///
/// These propagate to the caller of the operation; nothing recovers from them locally.
#[derive(Debug, Error)]
pub enum Fault {
    #[error("transport failure calling {method}: {message}")]
    Transport { method: String, message: String },
    #[error("backend rejected {method}: {message}")]
    Backend { method: String, message: String },
    #[error("malformed response for {method}: {message}")]
    Protocol { method: String, message: String },
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Fault {
    pub fn transport(method: &str, message: impl fmt::Display) -> Self {
        Self::Transport {
            method: method.to_string(),
            message: message.to_string(),
        }
    }

    pub fn backend(method: &str, message: impl fmt::Display) -> Self {
        Self::Backend {
            method: method.to_string(),
            message: message.to_string(),
        }
    }

    pub fn protocol(method: &str, message: impl fmt::Display) -> Self {
        Self::Protocol {
            method: method.to_string(),
            message: message.to_string(),
        }
    }

    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupService {
    Ssl,
    Whois,
}

impl fmt::Display for LookupService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ssl => f.write_str("SSL"),
            Self::Whois => f.write_str("WHOIS"),
        }
    }
}

/// A failed certificate or registration lookup for a single domain.
///
/// Carried as data inside report records rather than propagated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{service} Error: {message}")]
pub struct LookupFault {
    pub service: LookupService,
    pub message: String,
}

impl LookupFault {
    pub fn ssl(message: impl fmt::Display) -> Self {
        Self {
            service: LookupService::Ssl,
            message: message.to_string(),
        }
    }

    pub fn whois(message: impl fmt::Display) -> Self {
        Self {
            service: LookupService::Whois,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Fault, LookupFault};

    #[test]
    fn lookup_fault_renders_service_prefix() {
        assert_eq!(
            LookupFault::ssl("connection refused").to_string(),
            "SSL Error: connection refused"
        );
        assert_eq!(
            LookupFault::whois("no expiration date").to_string(),
            "WHOIS Error: no expiration date"
        );
    }

    #[test]
    fn not_found_names_kind_and_value() {
        let fault = Fault::not_found("group", "Domains");
        assert_eq!(fault.to_string(), "group 'Domains' not found");
    }
}
