//! pdffiller: Inspect, fill, and flatten PDF AcroForm fields.
//!
//! This is the public API facade crate for pdffiller-rs. It re-exports types from
//! pdffiller-core and uses pdffiller-parse for reading and rewriting documents.
//!
//! # Architecture
//!
//! - **pdffiller-core**: Backend-independent field model, value rules, and reports
//! - **pdffiller-parse**: Field tree builder, value applier, and flattening engine on lopdf
//! - **pdffiller** (this crate): Public API that ties everything together

mod form;

pub use form::PdfForm;
pub use pdffiller_core;
pub use pdffiller_core::{
    Appearance, ApplyReport, ChoiceOption, Field, FieldFlags, FieldId, FieldIssue, FieldKind,
    FieldRecord, FieldTree, FieldType, FieldValue, FlattenReport, FormError, FormOptions,
    InputValue, IssueKind, Widget, WidgetIssue,
};
pub use pdffiller_parse;
