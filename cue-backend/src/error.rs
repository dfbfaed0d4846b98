//! Mapping HTTP and reqwest failures to [`BackendError`].

use std::time::Duration;

use cue_types::BackendError;

/// Map a non-success status from the backend to a [`BackendError`].
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> BackendError {
    match status.as_u16() {
        401 | 403 => BackendError::Authentication(body.to_string()),
        404 => BackendError::NotFound(body.to_string()),
        429 => BackendError::RateLimited,
        500..=599 => BackendError::Unavailable(body.to_string()),
        code => BackendError::Status {
            status: code,
            body: body.to_string(),
        },
    }
}

/// Map a [`reqwest::Error`] to a [`BackendError`].
///
/// `timeout` is the client's configured limit, reported on timeouts.
pub(crate) fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(timeout)
    } else if err.is_decode() {
        BackendError::InvalidResponse(err.to_string())
    } else {
        BackendError::Network(Box::new(err))
    }
}

/// Whether a boxed stream read error is a reqwest timeout.
pub(crate) fn is_timeout(err: &(dyn std::error::Error + Send + Sync + 'static)) -> bool {
    err.downcast_ref::<reqwest::Error>()
        .is_some_and(reqwest::Error::is_timeout)
}
