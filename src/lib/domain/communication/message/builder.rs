//! Email message builder

use crate::domain::communication::email_addresses::EmailAddress;

use super::{Attachment, EmailMessage, RenderOptions, TemplateModel};

/// Fluent builder for [`EmailMessage`].
///
/// No setter fails and nothing is validated here; that happens when the message is sent.
/// [`EmailMessageBuilder::build`] returns a snapshot and leaves the builder untouched, so
/// calling it twice yields two equal messages. Start a new builder for a fresh message.
#[derive(Clone, Debug, Default)]
pub struct EmailMessageBuilder {
    message: EmailMessage,
}

impl EmailMessageBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender, replacing any previous one
    pub fn from(mut self, address: impl Into<EmailAddress>) -> Self {
        self.message.from = Some(address.into());
        self
    }

    /// Adds a recipient
    pub fn to(mut self, address: impl Into<EmailAddress>) -> Self {
        self.message.to.push(address.into());
        self
    }

    /// Adds one recipient without a display name per email
    pub fn to_many<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.message
            .to
            .extend(emails.into_iter().map(EmailAddress::new));
        self
    }

    /// Adds a carbon-copy recipient
    pub fn cc(mut self, address: impl Into<EmailAddress>) -> Self {
        self.message.cc.push(address.into());
        self
    }

    /// Adds a blind carbon-copy recipient
    pub fn bcc(mut self, address: impl Into<EmailAddress>) -> Self {
        self.message.bcc.push(address.into());
        self
    }

    /// Sets the subject
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.message.subject = subject.into();
        self
    }

    /// Sets the raw body
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.message.body = body.into();
        self
    }

    /// Sets the view name or inline markup
    pub fn body_template(mut self, template: impl Into<String>) -> Self {
        self.message.body_template = Some(template.into());
        self
    }

    /// Sets the template model, replacing any previous one
    pub fn model(mut self, model: TemplateModel) -> Self {
        self.message.model = Some(model);
        self
    }

    /// Sets the render options, replacing any previous ones as a whole
    pub fn render_options(mut self, options: RenderOptions) -> Self {
        self.message.render_options = Some(options);
        self
    }

    /// Adds an attachment. The bytes are moved into the message.
    pub fn attach(
        mut self,
        file_name: impl Into<String>,
        content: impl Into<Vec<u8>>,
        content_type: impl Into<String>,
    ) -> Self {
        self.message
            .attachments
            .push(Attachment::new(file_name, content, content_type));
        self
    }

    /// Returns the message accumulated so far
    pub fn build(&self) -> EmailMessage {
        self.message.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_collects_all_fields() {
        let message = EmailMessageBuilder::new()
            .from(("a@x.com", "A"))
            .to("b@y.com")
            .to(("c@y.com", "C"))
            .cc("d@y.com")
            .bcc("e@y.com")
            .subject("S")
            .body("plain")
            .body_template("Welcome")
            .model(TemplateModel::new().with("Name", "Ann"))
            .render_options(RenderOptions::with_theme("minimal"))
            .attach("report.pdf", vec![1u8, 2, 3], "application/pdf")
            .build();

        assert_eq!(message.from, Some(EmailAddress::with_name("a@x.com", "A")));
        assert_eq!(
            message.to,
            vec![
                EmailAddress::new("b@y.com"),
                EmailAddress::with_name("c@y.com", "C")
            ]
        );
        assert_eq!(message.cc, vec![EmailAddress::new("d@y.com")]);
        assert_eq!(message.bcc, vec![EmailAddress::new("e@y.com")]);
        assert_eq!(message.subject, "S");
        assert_eq!(message.body, "plain");
        assert_eq!(message.body_template.as_deref(), Some("Welcome"));
        assert_eq!(
            message.model.and_then(|m| m.field_text("Name")).as_deref(),
            Some("Ann")
        );
        assert_eq!(
            message.render_options.map(|o| o.theme).as_deref(),
            Some("minimal")
        );
        assert_eq!(message.attachments.len(), 1);
        assert_eq!(message.attachments[0].file_name(), "report.pdf");
        assert_eq!(message.attachments[0].content(), &[1, 2, 3]);
        assert_eq!(message.attachments[0].content_type(), "application/pdf");
    }

    #[test]
    fn test_from_is_last_write_wins() {
        let message = EmailMessageBuilder::new()
            .from("first@x.com")
            .from(("second@x.com", "Second"))
            .build();

        assert_eq!(
            message.from,
            Some(EmailAddress::with_name("second@x.com", "Second"))
        );
    }

    #[test]
    fn test_to_many_appends_unnamed_addresses_in_order() {
        let message = EmailMessageBuilder::new()
            .to(("first@y.com", "First"))
            .to_many(["b@y.com", "a@y.com", "b@y.com"])
            .build();

        let emails: Vec<_> = message.to.iter().map(EmailAddress::email).collect();

        assert_eq!(emails, vec!["first@y.com", "b@y.com", "a@y.com", "b@y.com"]);
        assert!(message.to[1..].iter().all(|a| a.name().is_none()));
    }

    #[test]
    fn test_render_options_are_replaced_wholesale() {
        let mut first = RenderOptions::with_theme("classic");
        first.company_name = Some("Acme".to_string());

        let message = EmailMessageBuilder::new()
            .render_options(first)
            .render_options(RenderOptions::with_theme("minimal"))
            .build();

        let options = message.render_options.unwrap();
        assert_eq!(options.theme, "minimal");
        assert_eq!(options.company_name, None);
    }

    #[test]
    fn test_build_twice_returns_same_content() {
        let builder = EmailMessageBuilder::new()
            .from("a@x.com")
            .to("b@y.com")
            .subject("S")
            .body("plain");

        assert_eq!(builder.build(), builder.build());
    }

    #[test]
    fn test_setters_accept_empty_values() {
        let message = EmailMessageBuilder::new()
            .from("")
            .to("")
            .subject("")
            .body("")
            .build();

        assert_eq!(message.from, Some(EmailAddress::new("")));
        assert_eq!(message.to, vec![EmailAddress::new("")]);
    }
}
