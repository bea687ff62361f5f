//! Send-time validation and body resolution shared by every provider

use crate::domain::communication::{
    email_addresses::EmailAddress,
    message::{Attachment, EmailMessage},
    renderer::HtmlRenderer,
};

use super::{
    content::{looks_like_html, strip_html_tags},
    placeholders::substitute_placeholders,
    EmailSenderError,
};

/// The final body of an email and its content type
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedBody {
    /// `text/html`
    Html(String),

    /// `text/plain`
    PlainText(String),
}

impl ResolvedBody {
    /// Resolves the body of `message`:
    ///
    /// 1. with a renderer, its output is the HTML body;
    /// 2. without one, a `body_template` plus `model` goes through placeholder substitution;
    /// 3. otherwise the raw `body` is used.
    ///
    /// The content type of 2. and 3. is detected from common HTML markers.
    pub async fn resolve(
        message: &EmailMessage,
        renderer: Option<&dyn HtmlRenderer>,
    ) -> Result<Self, EmailSenderError> {
        if let Some(renderer) = renderer {
            return Ok(Self::Html(renderer.render_email(message).await?));
        }

        let content = match (message.body_template.as_deref(), message.model.as_ref()) {
            (Some(template), Some(model)) if !template.is_empty() => {
                substitute_placeholders(template, model)
            }
            _ => message.body.clone(),
        };

        Ok(Self::detect(content))
    }

    /// Wraps `content` as HTML if it looks like HTML, plain text otherwise
    pub fn detect(content: String) -> Self {
        if looks_like_html(&content) {
            Self::Html(content)
        } else {
            Self::PlainText(content)
        }
    }

    /// The MIME type of the body
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Html(_) => "text/html",
            Self::PlainText(_) => "text/plain",
        }
    }

    /// The HTML body, if there is one
    pub fn html(&self) -> Option<&str> {
        match self {
            Self::Html(html) => Some(html),
            Self::PlainText(_) => None,
        }
    }

    /// The plain-text body, derived from the HTML when necessary
    pub fn plain_text(&self) -> String {
        match self {
            Self::Html(html) => strip_html_tags(html),
            Self::PlainText(text) => text.clone(),
        }
    }
}

/// A message that passed send-time checks, ready to be mapped to a provider's wire format
#[derive(Clone, Debug, PartialEq)]
pub struct OutgoingEmail {
    /// The resolved sender
    pub from: EmailAddress,

    /// Recipients, never empty
    pub to: Vec<EmailAddress>,

    /// Carbon-copy recipients
    pub cc: Vec<EmailAddress>,

    /// Blind carbon-copy recipients
    pub bcc: Vec<EmailAddress>,

    /// The subject
    pub subject: String,

    /// The final body
    pub body: ResolvedBody,

    /// Attachments, unchanged from the message
    pub attachments: Vec<Attachment>,
}

impl OutgoingEmail {
    /// Validates `message` and resolves its sender and body.
    ///
    /// # Arguments
    /// * `message` - The message to send. It is consumed.
    /// * `default_sender` - The provider-level sender used when the message has none.
    /// * `renderer` - Optional [`HtmlRenderer`] for the body.
    ///
    /// # Returns
    /// - [`EmailSenderError::Configuration`] when there is neither an explicit nor a default sender.
    /// - [`EmailSenderError::Validation`] when there are no recipients or an address is malformed.
    /// - [`EmailSenderError::Render`] when the renderer fails.
    pub async fn prepare(
        message: EmailMessage,
        default_sender: Option<&EmailAddress>,
        renderer: Option<&dyn HtmlRenderer>,
    ) -> Result<Self, EmailSenderError> {
        let from = match (&message.from, default_sender) {
            (Some(from), _) => from.clone(),
            (None, Some(default)) => default.clone(),
            (None, None) => {
                return Err(EmailSenderError::Configuration(
                    "no sender address on the message and no default sender configured"
                        .to_string(),
                ))
            }
        };

        if message.to.is_empty() {
            return Err(EmailSenderError::Validation(
                "at least one recipient is required".to_string(),
            ));
        }

        if let Some(malformed) = std::iter::once(&from)
            .chain(&message.to)
            .chain(&message.cc)
            .chain(&message.bcc)
            .find(|address| !address.is_well_formed())
        {
            return Err(EmailSenderError::Validation(format!(
                "malformed email address \"{}\"",
                malformed.email()
            )));
        }

        let body = ResolvedBody::resolve(&message, renderer).await?;

        let EmailMessage {
            to,
            cc,
            bcc,
            subject,
            attachments,
            ..
        } = message;

        Ok(Self {
            from,
            to,
            cc,
            bcc,
            subject,
            body,
            attachments,
        })
    }
}
