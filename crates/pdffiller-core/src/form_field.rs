//! PDF form field kinds and values.
//!
//! Provides [`FieldType`] (the raw `/FT` entry), [`FieldKind`] (the closed set
//! of behaviors the value applier switches on), [`FieldValue`] and
//! [`ChoiceOption`].

use std::fmt;

use crate::FieldFlags;

/// The type of a PDF form field.
///
/// Corresponds to the `/FT` entry in a field dictionary (PDF 1.7 Table 220).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldType {
    /// Text field (`/FT /Tx`).
    Text,
    /// Button field (`/FT /Btn`): checkboxes, radio buttons, push buttons.
    Button,
    /// Choice field (`/FT /Ch`): dropdowns, list boxes.
    Choice,
    /// Signature field (`/FT /Sig`).
    Signature,
}

impl FieldType {
    /// Parse a field type from its PDF name string.
    ///
    /// Returns `None` if the string is not a recognized field type.
    pub fn from_pdf_name(name: &str) -> Option<Self> {
        match name {
            "Tx" => Some(Self::Text),
            "Btn" => Some(Self::Button),
            "Ch" => Some(Self::Choice),
            "Sig" => Some(Self::Signature),
            _ => None,
        }
    }

    /// Return the PDF name string for this field type.
    pub fn as_pdf_name(&self) -> &'static str {
        match self {
            Self::Text => "Tx",
            Self::Button => "Btn",
            Self::Choice => "Ch",
            Self::Signature => "Sig",
        }
    }
}

/// The behavioral kind of a terminal field.
///
/// Derived from the (possibly inherited) `/FT` type and `/Ff` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum FieldKind {
    Text,
    #[cfg_attr(feature = "serde", serde(rename = "checkbox"))]
    CheckBox,
    #[cfg_attr(feature = "serde", serde(rename = "radio"))]
    RadioGroup,
    #[cfg_attr(feature = "serde", serde(rename = "list"))]
    ChoiceList,
    #[cfg_attr(feature = "serde", serde(rename = "combo"))]
    ChoiceCombo,
    #[cfg_attr(feature = "serde", serde(rename = "button"))]
    PushButton,
    Signature,
}

impl FieldKind {
    /// Resolve the kind from a field type and its effective flags.
    pub fn resolve(field_type: FieldType, flags: FieldFlags) -> Self {
        match field_type {
            FieldType::Text => Self::Text,
            FieldType::Signature => Self::Signature,
            FieldType::Choice if flags.contains(FieldFlags::COMBO) => Self::ChoiceCombo,
            FieldType::Choice => Self::ChoiceList,
            FieldType::Button if flags.contains(FieldFlags::PUSHBUTTON) => Self::PushButton,
            FieldType::Button if flags.contains(FieldFlags::RADIO) => Self::RadioGroup,
            FieldType::Button => Self::CheckBox,
        }
    }

    /// Short lowercase tag used in dumps.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::CheckBox => "checkbox",
            Self::RadioGroup => "radio",
            Self::ChoiceList => "list",
            Self::ChoiceCombo => "combo",
            Self::PushButton => "button",
            Self::Signature => "signature",
        }
    }

    /// Whether the value of this kind lives in widget appearance states.
    pub fn is_button(&self) -> bool {
        matches!(self, Self::CheckBox | Self::RadioGroup)
    }

    /// Whether this kind selects among `/Opt` entries.
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::ChoiceList | Self::ChoiceCombo)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a choice field's `/Opt` array.
///
/// A plain string entry has identical export value and label; a two-element
/// array entry is `[export label]`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChoiceOption {
    pub export: String,
    pub label: String,
}

impl ChoiceOption {
    pub fn new(export: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            export: export.into(),
            label: label.into(),
        }
    }

    /// An option whose label equals its export value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            export: value,
        }
    }
}

/// The stored value of a field (`/V` or `/DV`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum FieldValue {
    /// Text content of a text field.
    Text(String),
    /// Appearance state name of a button field (`Off` when unselected).
    State(String),
    /// Selected export values of a choice field, in option order.
    Choices(Vec<String>),
}

impl FieldValue {
    /// Flatten the value to a single display string.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Text(s) | Self::State(s) => s.clone(),
            Self::Choices(values) => values.join(", "),
        }
    }

    /// Returns `true` for an empty text, the `Off` state, or no choices.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::State(s) => s == OFF_STATE,
            Self::Choices(values) => values.is_empty(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

/// The appearance state name of an unselected button.
pub const OFF_STATE: &str = "Off";

/// Backend-independent indirect object identifier (`id gen R`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectRef {
    pub id: u32,
    pub generation: u16,
}

impl ObjectRef {
    pub fn new(id: u32, generation: u16) -> Self {
        Self { id, generation }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.id, self.generation)
    }
}
