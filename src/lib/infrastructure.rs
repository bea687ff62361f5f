//! Infrastructure layer: delivery providers and templating backends

pub mod email;
pub mod templates;
