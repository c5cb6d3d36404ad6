//! Loading and saving the lopdf document behind a form.

use lopdf::encryption::DecryptionError;
use lopdf::{Document, ObjectId};
use pdffiller_core::FormError;
use tracing::debug;

use crate::error::BackendError;

/// A parsed PDF document backed by lopdf.
pub struct FormDocument {
    inner: Document,
    /// Cached ordered list of page ObjectIds (indexed by 0-based page number).
    page_ids: Vec<ObjectId>,
}

impl FormDocument {
    /// Parse a document from bytes.
    ///
    /// # Errors
    ///
    /// [`FormError::PasswordRequired`] if the document is encrypted, or a
    /// parse error if the bytes are not a readable PDF.
    pub fn open(bytes: &[u8]) -> Result<Self, BackendError> {
        let inner = Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;

        // Reject encrypted PDFs when no password is provided
        if inner.is_encrypted() {
            return Err(BackendError::Core(FormError::PasswordRequired));
        }

        Ok(Self::from_document(inner))
    }

    /// Parse and, if needed, decrypt a document.
    ///
    /// The password is ignored for unencrypted documents.
    ///
    /// # Errors
    ///
    /// [`FormError::InvalidPassword`] if the password opens neither the user
    /// nor the owner side of an encrypted document.
    pub fn open_with_password(bytes: &[u8], password: &str) -> Result<Self, BackendError> {
        let inner = Document::load_mem_with_password(bytes, password).map_err(|e| match e {
            lopdf::Error::InvalidPassword
            | lopdf::Error::Decryption(DecryptionError::IncorrectPassword) => {
                BackendError::Core(FormError::InvalidPassword)
            }
            other => BackendError::Parse(format!("failed to parse PDF: {other}")),
        })?;

        if inner.is_encrypted() {
            return Err(BackendError::Core(FormError::InvalidPassword));
        }

        Ok(Self::from_document(inner))
    }

    /// Wrap an already-built lopdf document.
    pub fn from_document(inner: Document) -> Self {
        // get_pages returns BTreeMap<u32, ObjectId> with 1-based keys
        let page_ids: Vec<ObjectId> = inner.get_pages().values().copied().collect();
        debug!(pages = page_ids.len(), "opened document");
        Self { inner, page_ids }
    }

    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut Document {
        &mut self.inner
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    pub fn page_ids(&self) -> &[ObjectId] {
        &self.page_ids
    }

    /// 0-based index of a page object.
    pub fn page_index(&self, page_id: ObjectId) -> Option<usize> {
        self.page_ids.iter().position(|id| *id == page_id)
    }

    /// Serialize the (possibly mutated) document.
    pub fn save_to<W: std::io::Write>(&mut self, target: &mut W) -> Result<(), BackendError> {
        self.inner
            .save_to(target)
            .map_err(|e| BackendError::Serialize(e.to_string()))
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>, BackendError> {
        let mut buf = Vec::new();
        self.save_to(&mut buf)?;
        Ok(buf)
    }
}

impl std::fmt::Debug for FormDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}
