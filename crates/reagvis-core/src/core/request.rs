// crates/reagvis-core/src/core/request.rs
// ============================================================================
// Module: Reagvis Analysis Requests
// Description: Submission descriptor and uploaded attachment types.
// Purpose: Carry everything the derivation rules and pipeline key off.
// Dependencies: serde, sha2
// ============================================================================

//! ## Overview
//! An [`AnalysisRequest`] names the selected tool and optionally carries a
//! filename, pasted content, claimed location/event, and an uploaded file.
//! All fields are untrusted user input; rules only perform string matching on
//! them and never interpret them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

use crate::core::verdict::ToolType;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Content type used when an upload does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

// ============================================================================
// SECTION: Attachments
// ============================================================================

/// Uploaded file bytes with their declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Declared MIME type (may be empty).
    pub content_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment.
    #[must_use]
    pub fn new(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Returns true when the declared type is an image type.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Returns the content type to send upstream, defaulting when empty.
    #[must_use]
    pub fn effective_content_type(&self) -> &str {
        if self.content_type.trim().is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            &self.content_type
        }
    }

    /// Summarizes the attachment without retaining its bytes.
    #[must_use]
    pub fn summary(&self) -> AttachmentSummary {
        let digest = Sha256::digest(&self.bytes);
        AttachmentSummary {
            content_type: self.effective_content_type().to_string(),
            size_bytes: self.bytes.len(),
            sha256: hex_encode(&digest),
        }
    }
}

/// Metadata describing an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentSummary {
    /// Effective MIME type.
    pub content_type: String,
    /// File size in bytes.
    pub size_bytes: usize,
    /// Lowercase hex SHA-256 of the file bytes.
    pub sha256: String,
}

// ============================================================================
// SECTION: Requests
// ============================================================================

/// A single analysis submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Selected analysis tool.
    pub tool_type: ToolType,
    /// Submitted filename, if any.
    pub filename: Option<String>,
    /// Pasted text content, if any.
    pub content: Option<String>,
    /// Location the submitter claims the media shows.
    pub claimed_location: Option<String>,
    /// Event the submitter claims the media shows.
    pub claimed_event: Option<String>,
    /// Uploaded file, if any.
    pub attachment: Option<Attachment>,
}

impl AnalysisRequest {
    /// Creates an empty request for the given tool.
    #[must_use]
    pub const fn new(tool_type: ToolType) -> Self {
        Self {
            tool_type,
            filename: None,
            content: None,
            claimed_location: None,
            claimed_event: None,
            attachment: None,
        }
    }

    /// Sets the filename.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the pasted content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets the claimed location.
    #[must_use]
    pub fn with_claimed_location(mut self, location: impl Into<String>) -> Self {
        self.claimed_location = Some(location.into());
        self
    }

    /// Sets the claimed event.
    #[must_use]
    pub fn with_claimed_event(mut self, event: impl Into<String>) -> Self {
        self.claimed_event = Some(event.into());
        self
    }

    /// Attaches an uploaded file.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Filename, or the empty string.
    #[must_use]
    pub fn filename_str(&self) -> &str {
        self.filename.as_deref().unwrap_or_default()
    }

    /// Content, or the empty string.
    #[must_use]
    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Lowercased filename used by the trigger tables.
    #[must_use]
    pub fn filename_lower(&self) -> String {
        self.filename_str().to_lowercase()
    }

    /// Returns the filename when non-empty, otherwise the content.
    #[must_use]
    pub fn primary_text(&self) -> &str {
        let filename = self.filename_str();
        if filename.is_empty() { self.content_str() } else { filename }
    }

    /// Returns true when the request carries an image upload.
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.attachment.as_ref().is_some_and(Attachment::is_image)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_text_prefers_filename() {
        let request =
            AnalysisRequest::new(ToolType::Document).with_filename("a.png").with_content("text");
        assert_eq!(request.primary_text(), "a.png");
        let request = AnalysisRequest::new(ToolType::Document).with_content("text");
        assert_eq!(request.primary_text(), "text");
        let request = AnalysisRequest::new(ToolType::Document).with_filename("").with_content("x");
        assert_eq!(request.primary_text(), "x");
    }

    #[test]
    fn attachment_summary_hashes_bytes() {
        let summary = Attachment::new("", b"abc".to_vec()).summary();
        assert_eq!(summary.content_type, DEFAULT_CONTENT_TYPE);
        assert_eq!(summary.size_bytes, 3);
        assert_eq!(
            summary.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn image_detection_uses_content_type_prefix() {
        assert!(Attachment::new("image/png", Vec::new()).is_image());
        assert!(!Attachment::new("application/pdf", Vec::new()).is_image());
        assert!(!AnalysisRequest::new(ToolType::Document).has_image());
    }
}
