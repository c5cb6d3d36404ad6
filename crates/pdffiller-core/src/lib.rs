//! pdffiller-core: Backend-independent form model and rules.
//!
//! This crate provides the AcroForm field model ([`FieldTree`], [`Field`],
//! [`Widget`]), the value conversion rules used when filling
//! ([`resolve_value`]), the dump projection ([`dump`]) and the report and
//! error types shared by the other pdffiller crates. It never parses PDF
//! syntax; building a tree from a document is the parse crate's job.

/// Dump projection of the field tree.
pub mod dump;
/// Fatal error type.
pub mod error;
/// Field tree arena: fields, widgets and the name index.
pub mod field_tree;
/// Field and annotation flag sets.
pub mod flags;
/// Field kinds, values and choice options.
pub mod form_field;
/// Rectangles and transformation matrices.
pub mod geometry;
/// Build and fill options.
pub mod options;
/// Fill and flatten reports.
pub mod report;
/// Conversion of input values to field state.
pub mod value;

pub use dump::{FieldRecord, dump};
pub use error::FormError;
pub use field_tree::{Appearance, Field, FieldId, FieldTree, PageRef, Widget, WidgetId};
pub use flags::{AnnotationFlags, FieldFlags};
pub use form_field::{ChoiceOption, FieldKind, FieldType, FieldValue, OFF_STATE, ObjectRef};
pub use geometry::{Matrix, Rect, fmt_number};
pub use options::FormOptions;
pub use report::{ApplyReport, FieldIssue, FlattenReport, IssueKind, WidgetIssue};
pub use value::{
    InputValue, Resolution, checkbox_on_state, radio_exports, radio_options, resolve_value,
};
