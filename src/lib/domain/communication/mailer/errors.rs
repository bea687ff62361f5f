//! Mailer errors

use thiserror::Error;
use tracing::debug;

use crate::domain::communication::{message::TemplateModelError, renderer::RenderError};

/// The single error kind returned by every [`EmailSender`](super::EmailSender).
///
/// Provider errors are never returned unwrapped: transport and HTTP failures end up in
/// [`EmailSenderError::Transmission`] with the original error as the source.
#[derive(Debug, Error)]
pub enum EmailSenderError {
    /// A credential or the sender address is missing. Raised before any network call.
    #[error("email sender is misconfigured: {0}")]
    Configuration(String),

    /// The message is missing a required field or has a malformed one
    #[error("invalid email message: {0}")]
    Validation(String),

    /// The renderer could not produce the HTML body
    #[error("could not render email: {0}")]
    Render(#[from] RenderError),

    /// The provider rejected the email or could not be reached
    #[error("could not send email via {provider}: {source}")]
    Transmission {
        /// The provider that failed
        provider: &'static str,

        /// The underlying cause
        #[source]
        source: anyhow::Error,
    },
}

impl EmailSenderError {
    /// Wraps a provider failure
    pub fn transmission(provider: &'static str, source: impl Into<anyhow::Error>) -> Self {
        EmailSenderError::Transmission {
            provider,
            source: source.into(),
        }
    }
}

impl From<TemplateModelError> for EmailSenderError {
    fn from(err: TemplateModelError) -> Self {
        debug!("TemplateModelError -> EmailSenderError");

        EmailSenderError::Validation(err.to_string())
    }
}
