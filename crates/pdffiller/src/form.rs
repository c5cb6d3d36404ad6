//! Top-level form document type for inspecting, filling and flattening.

use pdffiller_core::{
    ApplyReport, Field, FieldRecord, FieldTree, FlattenReport, FormError, FormOptions, InputValue,
    dump,
};
use pdffiller_parse::{FormDocument, apply_values, build_field_tree, flatten};
use tracing::debug;

/// A PDF document opened for form processing.
///
/// Owns the parsed document together with its field tree; every mutation
/// goes through both so they never drift apart.
///
/// # Example
///
/// ```ignore
/// let mut form = PdfForm::open(&bytes, None)?;
/// let report = form.fill([("name", InputValue::from("Jane"))])?;
/// form.flatten()?;
/// let out = form.to_bytes()?;
/// ```
pub struct PdfForm {
    doc: FormDocument,
    tree: FieldTree,
    options: FormOptions,
}

impl PdfForm {
    /// Open a PDF document from a file path.
    ///
    /// Reads the file into memory and delegates to [`PdfForm::open`].
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] if the file cannot be read, is not a valid PDF,
    /// or has a malformed field tree.
    #[cfg(feature = "std")]
    pub fn open_file(
        path: impl AsRef<std::path::Path>,
        options: Option<FormOptions>,
    ) -> Result<Self, FormError> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| FormError::IoError(e.to_string()))?;
        Self::open(&bytes, options)
    }

    /// Open an encrypted PDF file with a password.
    #[cfg(feature = "std")]
    pub fn open_file_with_password(
        path: impl AsRef<std::path::Path>,
        password: &str,
        options: Option<FormOptions>,
    ) -> Result<Self, FormError> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| FormError::IoError(e.to_string()))?;
        Self::open_with_password(&bytes, password, options)
    }

    /// Open a PDF document from bytes and build its field tree.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Raw PDF file bytes.
    /// * `options` - Tree and fill options. Uses defaults if `None`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::PasswordRequired`] if the PDF is encrypted,
    /// [`FormError::MalformedFieldTree`] or [`FormError::DuplicateFieldName`]
    /// if the field hierarchy is corrupt.
    pub fn open(bytes: &[u8], options: Option<FormOptions>) -> Result<Self, FormError> {
        let options = options.unwrap_or_default();
        check_size(bytes, &options)?;
        let doc = FormDocument::open(bytes)?;
        Self::from_doc(doc, options)
    }

    /// Open an encrypted PDF document from bytes with a password.
    ///
    /// If the PDF is not encrypted, the password is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidPassword`] if the password is incorrect.
    pub fn open_with_password(
        bytes: &[u8],
        password: &str,
        options: Option<FormOptions>,
    ) -> Result<Self, FormError> {
        let options = options.unwrap_or_default();
        check_size(bytes, &options)?;
        let doc = FormDocument::open_with_password(bytes, password)?;
        Self::from_doc(doc, options)
    }

    fn from_doc(doc: FormDocument, options: FormOptions) -> Result<Self, FormError> {
        let tree = build_field_tree(&doc, &options)?;
        Ok(Self { doc, tree, options })
    }

    pub fn page_count(&self) -> usize {
        self.doc.page_count()
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    /// The full field hierarchy.
    pub fn fields(&self) -> &FieldTree {
        &self.tree
    }

    /// Look up a field by fully-qualified name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.tree.get(name)
    }

    /// Flat records for every terminal field, in hierarchy order.
    pub fn dump(&self) -> Vec<FieldRecord> {
        dump(&self.tree)
    }

    /// Apply `values` in order.
    ///
    /// Names that match no field and values a field cannot hold are listed in
    /// the returned report and do not stop the batch.
    ///
    /// # Errors
    ///
    /// Only if the document no longer matches its field tree.
    pub fn fill<N, V>(
        &mut self,
        values: impl IntoIterator<Item = (N, V)>,
    ) -> Result<ApplyReport, FormError>
    where
        N: AsRef<str>,
        V: std::borrow::Borrow<InputValue>,
    {
        let report = apply_values(&mut self.doc, &mut self.tree, values, &self.options)?;
        debug!(
            applied = report.applied.len(),
            issues = report.issues.len(),
            "filled form"
        );
        Ok(report)
    }

    /// Burn every widget's current appearance into its page and remove the
    /// interactive annotations. Irreversible.
    pub fn flatten(&mut self) -> Result<FlattenReport, FormError> {
        Ok(flatten(&mut self.doc, &mut self.tree)?)
    }

    /// Serialize the document to `writer`.
    ///
    /// # Errors
    ///
    /// [`FormError::SerializationFailure`] if the document cannot be written.
    pub fn save_to<W: std::io::Write>(&mut self, writer: &mut W) -> Result<(), FormError> {
        Ok(self.doc.save_to(writer)?)
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>, FormError> {
        Ok(self.doc.to_bytes()?)
    }

    /// Serialize to a file. The file is only created once serialization has
    /// succeeded.
    #[cfg(feature = "std")]
    pub fn save(&mut self, path: impl AsRef<std::path::Path>) -> Result<(), FormError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), bytes).map_err(|e| FormError::IoError(e.to_string()))
    }
}

impl std::fmt::Debug for PdfForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfForm")
            .field("pages", &self.doc.page_count())
            .field("fields", &self.tree.len())
            .finish_non_exhaustive()
    }
}

fn check_size(bytes: &[u8], options: &FormOptions) -> Result<(), FormError> {
    match options.max_input_bytes {
        Some(limit) if bytes.len() > limit => Err(FormError::InputTooLarge {
            limit,
            actual: bytes.len(),
        }),
        _ => Ok(()),
    }
}
