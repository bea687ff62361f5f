//! Email attachment

/// A binary attachment. The content is owned by the attachment once attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    file_name: String,
    content: Vec<u8>,
    content_type: String,
}

impl Attachment {
    /// Creates a new attachment
    pub fn new(
        file_name: impl Into<String>,
        content: impl Into<Vec<u8>>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
            content_type: content_type.into(),
        }
    }

    /// The file name shown to the recipient
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The raw bytes
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The MIME type, e.g. `application/pdf`
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}
