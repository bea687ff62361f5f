//! Email sender contract

use async_trait::async_trait;
use tracing::{error, info};

use crate::domain::communication::{message::EmailMessage, renderer::HtmlRenderer};

mod content;
mod errors;
mod outgoing;
mod placeholders;

pub use content::{looks_like_html, strip_html_tags};
pub use errors::EmailSenderError;
pub use outgoing::{OutgoingEmail, ResolvedBody};
pub use placeholders::substitute_placeholders;

/// Delivers emails through one concrete provider.
///
/// Implementations hold only read-only configuration, so a single sender can be shared
/// between concurrent callers.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Sends an email
    ///
    /// # Arguments
    /// * `message` - The [`EmailMessage`] to send. The sender takes ownership of it.
    /// * `renderer` - Optional [`HtmlRenderer`] that produces the HTML body.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] once the provider accepted the email, or an [`Err`]
    /// containing an [`EmailSenderError`]. Exactly one request is made to the provider per
    /// call, and none at all when the message fails validation.
    async fn send_email(
        &self,
        message: EmailMessage,
        renderer: Option<&dyn HtmlRenderer>,
    ) -> Result<(), EmailSenderError>;

    /// Short provider name, for logs
    fn provider_name(&self) -> &'static str;
}

/// Logs the outcome of a send attempt and passes the result through
pub(crate) fn log_outcome<T>(
    provider: &'static str,
    recipients: &str,
    subject: &str,
    result: Result<T, EmailSenderError>,
) -> Result<T, EmailSenderError> {
    match &result {
        Ok(_) => info!(provider, recipients, subject, "email sent"),
        Err(err) => error!(provider, recipients, subject, error = %err, "failed to send email"),
    }

    result
}
