//
// error.rs
// Orthanc-Client-rs
//
// Centralizes the error kinds surfaced by the crate so callers can branch on them.
//
// Thales Matheus Mendonça Santos - August 2026

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the archive or decoding its answers.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested DICOM tag is not among the entity's main tags. Optional
    /// tags are routinely absent, so callers are expected to branch on this
    /// variant rather than treat it as a failure.
    #[error("DICOM tag '{0}' is not in the main tags of the entity")]
    TagMissing(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport-level failure (connection, TLS, body decoding).
    #[error("request to the archive failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("not found: {0}")]
    NotFound(String),

    /// Any non-2xx answer other than a plain 404.
    #[error("archive answered HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("could not parse '{value}' as {expected}")]
    Parse {
        value: String,
        expected: &'static str,
    },

    /// The server answered 2xx but the payload lacks the documented shape.
    #[error("unexpected answer from the archive: {0}")]
    UnexpectedResponse(String),

    #[error("could not read DICOM data: {0}")]
    Dicom(#[from] dicom::object::ReadError),
}
