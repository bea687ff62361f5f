//! Email composition, rendering and delivery contracts

pub mod email_addresses;
pub mod mailer;
pub mod message;
pub mod renderer;
