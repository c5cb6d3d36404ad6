//! Per-field outcome reports for fill and flatten operations.
//!
//! Non-fatal problems (a name that matches no field, a value a field cannot
//! hold, a widget that could not be drawn) never abort a batch; they are
//! collected here so the caller can decide what to do with them.

use std::fmt;

/// Why a single fill entry was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum IssueKind {
    /// No field has this fully-qualified name.
    UnknownField,
    /// The value does not fit the field.
    InvalidValue { reason: String },
}

/// A fill entry that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldIssue {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: IssueKind,
}

impl FieldIssue {
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: IssueKind::UnknownField,
        }
    }

    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: IssueKind::InvalidValue {
                reason: reason.into(),
            },
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::UnknownField => write!(f, "unknown field: {}", self.name),
            IssueKind::InvalidValue { reason } => {
                write!(f, "invalid value for {}: {reason}", self.name)
            }
        }
    }
}

/// Result of applying a batch of values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApplyReport {
    /// Names of the fields that were written, in input order.
    pub applied: Vec<String>,
    pub issues: Vec<FieldIssue>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn unknown_fields(&self) -> impl Iterator<Item = &str> {
        self.issues
            .iter()
            .filter(|i| i.kind == IssueKind::UnknownField)
            .map(|i| i.name.as_str())
    }

    pub fn invalid_values(&self) -> impl Iterator<Item = &FieldIssue> {
        self.issues
            .iter()
            .filter(|i| matches!(i.kind, IssueKind::InvalidValue { .. }))
    }
}

/// A widget the flattening engine had to skip.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WidgetIssue {
    /// Fully-qualified name of the owning field.
    pub field: String,
    /// Annotation object id.
    pub object: crate::ObjectRef,
    pub reason: String,
}

impl fmt::Display for WidgetIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not flatten widget {} of {}: {}",
            self.object, self.field, self.reason
        )
    }
}

/// Result of a flatten operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlattenReport {
    /// Widgets burned into page content.
    pub drawn: usize,
    /// Widgets removed without drawing (hidden, or no appearance).
    pub discarded: usize,
    /// Fields that lost all their widgets and were marked read-only.
    pub flattened_fields: Vec<String>,
    pub issues: Vec<WidgetIssue>,
}

impl FlattenReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}
