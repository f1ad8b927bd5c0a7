//! Optional metadata attached to a published manifest.

use std::collections::BTreeMap;

/// Builder for the metadata fields [`crate::DdsCoreService::publish`]
/// attaches to the manifest it generates. All fields are optional; the
/// default produces a manifest with no filename, MIME type, or custom
/// metadata.
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    pub(crate) filename: String,
    pub(crate) mime_type: String,
    pub(crate) custom_metadata: Option<BTreeMap<String, String>>,
}

impl PublishOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn with_custom_metadata(mut self, meta: BTreeMap<String, String>) -> Self {
        self.custom_metadata = Some(meta);
        self
    }
}
