//! Typed error hierarchy for the Tekstil client.
//!
//! One enum per subsystem:
//! - `ApiError` — REST transport, HTTP status and decoding failures
//! - `LabelError` — QR encoding and PDF composition failures
//! - `FormError` — validation failures and the mutation that follows
//! - `SocketError` — notification push channel failures

use thiserror::Error;

use crate::forms::ValidationErrors;

/// Shown when the server fails without a usable message of its own.
pub const GENERIC_ERROR_MESSAGE: &str = "Beklenmeyen bir hata oluştu";

/// Errors from the REST client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("invalid URL '{0}'")]
    InvalidUrl(String),
}

impl ApiError {
    /// Message suitable for a toast: the server's text when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Server { message, .. } => message.clone(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Errors from label composition.
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("QR encoding failed: {0}")]
    QrEncode(String),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF generation failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF serialization failed: {0}")]
    Write(String),

    #[error("Unknown label kind '{0}'")]
    UnknownKind(String),

    #[error("Invalid label data for {kind}: {message}")]
    InvalidData { kind: String, message: String },
}

/// Errors from submitting a form.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors from the notification push channel.
#[derive(Debug, Error)]
pub enum SocketError {
    #[error("invalid WebSocket URL '{0}'")]
    InvalidUrl(String),

    #[error("WebSocket connect failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),
}
