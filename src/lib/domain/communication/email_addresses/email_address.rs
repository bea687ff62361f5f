//! Email Address

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^@\s]*?@[^@\s]*?\.[^@\s]*$").unwrap();
}

use std::fmt;

/// A participant of an email: an address plus an optional display name.
///
/// Nothing is validated on construction. Senders call [`EmailAddress::is_well_formed`]
/// when a message is handed over for delivery.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EmailAddress {
    email: String,
    name: Option<String>,
}

impl EmailAddress {
    /// Create an address without a display name
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    /// Create an address with a display name
    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
        }
    }

    /// The bare address, e.g. `ann@example.com`
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The display name, if one was given
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the address has the rough shape `local@domain.tld`
    pub fn is_well_formed(&self) -> bool {
        let trimmed = self.email.trim();

        !trimmed.is_empty() && EMAIL_REGEX.is_match(trimmed)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) if !name.is_empty() => write!(f, "{} <{}>", name, self.email),
            _ => write!(f, "{}", self.email),
        }
    }
}

impl From<&str> for EmailAddress {
    fn from(email: &str) -> Self {
        Self::new(email)
    }
}

impl From<String> for EmailAddress {
    fn from(email: String) -> Self {
        Self::new(email)
    }
}

impl From<(&str, &str)> for EmailAddress {
    fn from((email, name): (&str, &str)) -> Self {
        Self::with_name(email, name)
    }
}

impl From<(String, String)> for EmailAddress {
    fn from((email, name): (String, String)) -> Self {
        Self::with_name(email, name)
    }
}

impl From<EmailAddress> for String {
    fn from(address: EmailAddress) -> Self {
        address.email
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_address_display_without_name() {
        let address = EmailAddress::new("email@example.com");

        assert_eq!(format!("{}", address), "email@example.com".to_string());
    }

    #[test]
    fn test_email_address_display_with_name() {
        let address = EmailAddress::with_name("ann@example.com", "Ann");

        assert_eq!(address.to_string(), "Ann <ann@example.com>");
    }

    #[test]
    fn test_email_address_display_with_empty_name() {
        let address = EmailAddress::with_name("ann@example.com", "");

        assert_eq!(address.to_string(), "ann@example.com");
    }

    #[test]
    fn test_empty_email_address_is_not_well_formed() {
        assert!(!EmailAddress::new("").is_well_formed());
        assert!(!EmailAddress::new("   ").is_well_formed());
    }

    #[test]
    fn test_email_address_without_at_symbol_is_not_well_formed() {
        assert!(!EmailAddress::new("email").is_well_formed());
    }

    #[test]
    fn test_email_address_is_well_formed() {
        assert!(EmailAddress::new("email@example.com").is_well_formed());
    }

    #[test]
    fn test_email_address_from_tuple() {
        let address = EmailAddress::from(("a@x.com", "A"));

        assert_eq!(address.email(), "a@x.com");
        assert_eq!(address.name(), Some("A"));
    }

    #[test]
    fn test_email_address_into_string() {
        let address = EmailAddress::with_name("email@example.com", "Someone");

        assert_eq!(String::from(address), "email@example.com".to_string());
    }
}
