//! MIME composition shared by the SMTP relay and the Gmail API

use lettre::{
    message::{header::ContentType, Attachment as AttachmentPart, Mailbox, MultiPart, SinglePart},
    Address, Message,
};

use crate::domain::communication::{
    email_addresses::EmailAddress,
    mailer::{EmailSenderError, OutgoingEmail, ResolvedBody},
    message::Attachment,
};

/// Builds an RFC 5322 message from a prepared email.
///
/// HTML bodies become `multipart/alternative` with a plain-text part, attachments wrap the
/// body in `multipart/mixed`. With `keep_bcc` the `Bcc` header stays in the output, which
/// APIs that take a raw message need in order to deliver to those recipients.
pub(super) fn compose(email: &OutgoingEmail, keep_bcc: bool) -> Result<Message, EmailSenderError> {
    let mut builder = Message::builder()
        .from(mailbox(&email.from)?)
        .subject(email.subject.as_str());

    for address in &email.to {
        builder = builder.to(mailbox(address)?);
    }

    for address in &email.cc {
        builder = builder.cc(mailbox(address)?);
    }

    for address in &email.bcc {
        builder = builder.bcc(mailbox(address)?);
    }

    if keep_bcc {
        builder = builder.keep_bcc();
    }

    let message = if email.attachments.is_empty() {
        match &email.body {
            ResolvedBody::Html(html) => builder.multipart(MultiPart::alternative_plain_html(
                email.body.plain_text(),
                html.clone(),
            )),
            ResolvedBody::PlainText(text) => builder.singlepart(SinglePart::plain(text.clone())),
        }
    } else {
        let mut mixed = match &email.body {
            ResolvedBody::Html(html) => MultiPart::mixed().multipart(
                MultiPart::alternative_plain_html(email.body.plain_text(), html.clone()),
            ),
            ResolvedBody::PlainText(text) => {
                MultiPart::mixed().singlepart(SinglePart::plain(text.clone()))
            }
        };

        for attachment in &email.attachments {
            mixed = mixed.singlepart(attachment_part(attachment)?);
        }

        builder.multipart(mixed)
    };

    message.map_err(|err| EmailSenderError::Validation(format!("could not compose email: {err}")))
}

fn mailbox(address: &EmailAddress) -> Result<Mailbox, EmailSenderError> {
    let email: Address = address.email().trim().parse().map_err(|err| {
        EmailSenderError::Validation(format!("invalid address \"{}\": {err}", address.email()))
    })?;

    let name = address
        .name()
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    Ok(Mailbox::new(name, email))
}

fn attachment_part(attachment: &Attachment) -> Result<SinglePart, EmailSenderError> {
    let content_type = ContentType::parse(attachment.content_type()).map_err(|err| {
        EmailSenderError::Validation(format!(
            "invalid content type \"{}\" for attachment \"{}\": {err}",
            attachment.content_type(),
            attachment.file_name()
        ))
    })?;

    Ok(AttachmentPart::new(attachment.file_name().to_string())
        .body(attachment.content().to_vec(), content_type))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn outgoing(body: ResolvedBody) -> OutgoingEmail {
        OutgoingEmail {
            from: EmailAddress::with_name("a@x.com", "A"),
            to: vec![EmailAddress::new("b@y.com"), EmailAddress::new("c@y.com")],
            cc: vec![EmailAddress::new("d@y.com")],
            bcc: vec![EmailAddress::new("e@y.com")],
            subject: "S".to_string(),
            body,
            attachments: vec![],
        }
    }

    fn formatted(message: &Message) -> String {
        String::from_utf8_lossy(&message.formatted()).into_owned()
    }

    #[test]
    fn test_compose_plain_text() -> TestResult {
        let message = compose(&outgoing(ResolvedBody::PlainText("plain".to_string())), false)?;
        let raw = formatted(&message);

        assert!(raw.contains("From: A <a@x.com>"));
        assert!(raw.contains("To: b@y.com"));
        assert!(raw.contains("c@y.com"));
        assert!(raw.contains("Cc: d@y.com"));
        assert!(!raw.contains("Bcc:"));
        assert!(raw.contains("Subject: S"));
        assert!(raw.contains("Content-Type: text/plain; charset=utf-8"));
        assert!(raw.contains("\r\n\r\nplain"));

        Ok(())
    }

    #[test]
    fn test_compose_keeps_bcc_when_asked() -> TestResult {
        let message = compose(&outgoing(ResolvedBody::PlainText("plain".to_string())), true)?;

        assert!(formatted(&message).contains("Bcc: e@y.com"));

        Ok(())
    }

    #[test]
    fn test_compose_html_has_plain_alternative() -> TestResult {
        let message = compose(&outgoing(ResolvedBody::Html("<p>Hello</p>".to_string())), false)?;
        let raw = formatted(&message);

        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("Content-Type: text/html; charset=utf-8"));
        assert!(raw.contains("<p>Hello</p>"));

        Ok(())
    }

    #[test]
    fn test_compose_with_attachment() -> TestResult {
        let mut email = outgoing(ResolvedBody::PlainText("see attached".to_string()));
        email.attachments = vec![Attachment::new("notes.txt", b"hello".to_vec(), "text/plain")];

        let raw = formatted(&compose(&email, false)?);

        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("filename=\"notes.txt\""));

        Ok(())
    }

    #[test]
    fn test_compose_rejects_invalid_content_type() {
        let mut email = outgoing(ResolvedBody::PlainText("x".to_string()));
        email.attachments = vec![Attachment::new("x.bin", vec![0u8], "not a mime type")];

        let result = compose(&email, false);

        assert!(matches!(result, Err(EmailSenderError::Validation(_))));
    }

    #[test]
    fn test_compose_rejects_unparseable_address() {
        let mut email = outgoing(ResolvedBody::PlainText("x".to_string()));
        email.to = vec![EmailAddress::new("b@@y.com")];

        let result = compose(&email, false);

        assert!(matches!(result, Err(EmailSenderError::Validation(_))));
    }
}
