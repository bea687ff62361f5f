//! Email delivery providers

pub mod gmail;
pub mod sendgrid;
pub mod smtp;

mod mime;

use std::convert::Infallible;

use secrecy::Secret;

use crate::domain::communication::email_addresses::EmailAddress;

fn parse_secret(raw: &str) -> Result<Secret<String>, Infallible> {
    Ok(Secret::new(raw.to_string()))
}

/// Builds the provider-level default sender. Blank values count as absent.
fn default_sender(email: Option<&str>, name: Option<&str>) -> Option<EmailAddress> {
    let email = email.map(str::trim).filter(|email| !email.is_empty())?;

    Some(match name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => EmailAddress::with_name(email, name),
        None => EmailAddress::new(email),
    })
}
