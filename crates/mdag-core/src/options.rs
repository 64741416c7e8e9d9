//! Per-facade call options.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};

/// A shared flag a caller flips to abandon in-flight operations.
///
/// Clones observe the same flag. Operations poll it at safe points and stop
/// with [`ApiError::Cancelled`] before persisting anything.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options shared by every sub-API obtained from one facade.
#[derive(Clone, Debug)]
pub struct ApiOptions {
    /// Checked between chunks of streamed input and before each persist.
    pub cancel: Option<CancelToken>,
    /// Follow `/name/...` references. When off they are rejected.
    pub resolve_names: bool,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            cancel: None,
            resolve_names: true,
        }
    }
}

impl ApiOptions {
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn resolve_names(mut self, resolve: bool) -> Self {
        self.resolve_names = resolve;
        self
    }

    /// Fail with [`ApiError::Cancelled`] if the token has been tripped.
    pub fn check_cancelled(&self) -> ApiResult<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(ApiError::Cancelled),
            _ => Ok(()),
        }
    }
}
