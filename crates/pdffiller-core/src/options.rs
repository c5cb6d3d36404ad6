/// Options controlling tree building and filling.
///
/// Provides sensible defaults for all settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOptions {
    /// Maximum nesting depth of the field hierarchy (default: 64).
    ///
    /// Deeper trees are rejected as malformed.
    pub max_field_depth: usize,
    /// Maximum input PDF size in bytes (default: None = no limit).
    pub max_input_bytes: Option<usize>,
    /// Set `/NeedAppearances true` on the AcroForm after a fill so viewers
    /// regenerate field appearances (default: true).
    pub need_appearances: bool,
    /// Synthesize a normal appearance stream for filled text and combo
    /// fields from their `/DA` string (default: true).
    pub generate_appearances: bool,
    /// Remove the `/XFA` entry when filling, so XFA-aware viewers fall back
    /// to the AcroForm values (default: true).
    pub drop_xfa: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            max_field_depth: 64,
            max_input_bytes: None,
            need_appearances: true,
            generate_appearances: true,
            drop_xfa: true,
        }
    }
}

impl FormOptions {
    /// Options that leave the document exactly as written apart from the
    /// field values themselves.
    pub fn minimal() -> Self {
        Self {
            need_appearances: false,
            generate_appearances: false,
            drop_xfa: false,
            ..Self::default()
        }
    }
}
