//! Error types for the engine's capability contracts.

use thiserror::Error;

/// Errors from [`SessionStore`](crate::traits::SessionStore) implementations.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session store error: {message}")]
    Store { message: String },
    #[error("failed to encode session: {message}")]
    Serialize { message: String },
    #[error("failed to decode session: {message}")]
    Deserialize { message: String },
}

/// Errors from [`ChatAdapter`](crate::traits::ChatAdapter) implementations.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("message delivery failed: {message}")]
    Delivery { message: String },
}

/// Errors from loading flow definition files.
#[derive(Debug, Error)]
pub enum FlowLoadError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error("failed to parse flow file {path}: {message}")]
    Parse { path: String, message: String },
}
