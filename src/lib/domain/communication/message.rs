//! Email message

mod attachment;
mod builder;
mod render_options;
mod template_model;

pub use attachment::Attachment;
pub use builder::EmailMessageBuilder;
pub use render_options::RenderOptions;
pub use template_model::{TemplateModel, TemplateModelError};

use crate::domain::communication::email_addresses::EmailAddress;

/// Provider-independent representation of an outbound email.
///
/// A message stays freely mutable until it is passed by value to an
/// [`EmailSender`](crate::domain::communication::mailer::EmailSender), which then owns it
/// for the duration of the send.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmailMessage {
    /// The sender of the email. Falls back to the provider default when `None`.
    pub from: Option<EmailAddress>,

    /// The recipients of the email, in send order
    pub to: Vec<EmailAddress>,

    /// Carbon-copy recipients
    pub cc: Vec<EmailAddress>,

    /// Blind carbon-copy recipients
    pub bcc: Vec<EmailAddress>,

    /// The subject of the email
    pub subject: String,

    /// The raw body, used when nothing is rendered
    pub body: String,

    /// A view name or inline markup. Which one is decided by the renderer.
    pub body_template: Option<String>,

    /// Values for template placeholders
    pub model: Option<TemplateModel>,

    /// Visual theme handed to the renderer
    pub render_options: Option<RenderOptions>,

    /// Attachments, in the order they were added
    pub attachments: Vec<Attachment>,
}

impl EmailMessage {
    /// Start building a new message
    pub fn builder() -> EmailMessageBuilder {
        EmailMessageBuilder::new()
    }

    /// Comma-separated `to` addresses, for log lines
    pub fn recipient_list(&self) -> String {
        self.to
            .iter()
            .map(EmailAddress::email)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
