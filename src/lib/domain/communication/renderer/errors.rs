//! Render errors

use thiserror::Error;
use tracing::debug;

/// Errors raised while rendering an email
#[derive(Debug, Error)]
pub enum RenderError {
    /// The templating backend has no view with this name
    #[error("could not find view \"{0}\"")]
    ViewNotFound(String),

    /// The view exists but rendering it failed
    #[error(transparent)]
    RenderFailed(#[from] anyhow::Error),
}

impl From<askama::Error> for RenderError {
    fn from(err: askama::Error) -> Self {
        debug!("askama::Error -> RenderError");

        RenderError::RenderFailed(err.into())
    }
}

impl From<css_inline::InlineError> for RenderError {
    fn from(err: css_inline::InlineError) -> Self {
        debug!("InlineError -> RenderError");

        RenderError::RenderFailed(err.into())
    }
}
