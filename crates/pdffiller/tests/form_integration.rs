//! Integration tests for the PdfForm public API.
//!
//! These tests exercise the full pipeline:
//! PDF bytes → PdfForm::open → fill / flatten → to_bytes → reopen.
//!
//! Test PDFs are created programmatically using lopdf.

mod common;

use pdffiller::{
    FieldFlags, FieldKind, FieldValue, FormError, FormOptions, InputValue, IssueKind, PdfForm,
};

fn state(value: &str) -> Option<FieldValue> {
    Some(FieldValue::State(value.to_string()))
}

#[test]
fn dump_lists_terminal_fields_in_order() {
    let form = PdfForm::open(&common::sample_form(), None).unwrap();
    let records = form.dump();
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["name", "subscribe", "plan"]);
    assert_eq!(records[0].kind, Some(FieldKind::Text));
    assert_eq!(records[1].kind, Some(FieldKind::CheckBox));
    assert_eq!(records[2].kind, Some(FieldKind::RadioGroup));
    assert_eq!(records[2].options, ["A", "B"]);
    assert_eq!(records[2].value, state("A"));
    assert_eq!(records[0].page, Some(1));
}

#[test]
fn fill_sample_scenario() {
    let mut form = PdfForm::open(&common::sample_form(), None).unwrap();
    let report = form
        .fill([
            ("name", InputValue::from("Jane")),
            ("subscribe", InputValue::from(true)),
            ("plan", InputValue::from("B")),
        ])
        .unwrap();
    assert!(report.is_clean(), "{report:?}");
    assert_eq!(report.applied, ["name", "subscribe", "plan"]);

    let reopened = PdfForm::open(&form.to_bytes().unwrap(), None).unwrap();
    let records = reopened.dump();
    assert_eq!(records[0].value, Some(FieldValue::Text("Jane".into())));
    assert_eq!(records[1].value, state("On"));
    assert_eq!(records[2].value, state("B"));

    let plan = reopened.field("plan").unwrap();
    let states: Vec<Option<&str>> = reopened
        .fields()
        .widgets_of(plan.id)
        .map(|w| w.current_state.as_deref())
        .collect();
    assert_eq!(states, [Some("Off"), Some("B")]);
}

#[test]
fn invalid_radio_value_keeps_default() {
    let mut form = PdfForm::open(&common::sample_form(), None).unwrap();
    let report = form.fill([("plan", InputValue::from("C"))]).unwrap();
    assert!(report.applied.is_empty());
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].name, "plan");
    assert!(matches!(report.issues[0].kind, IssueKind::InvalidValue { .. }));

    let reopened = PdfForm::open(&form.to_bytes().unwrap(), None).unwrap();
    assert_eq!(reopened.field("plan").unwrap().value, state("A"));
}

#[test]
fn unknown_names_are_reported_not_raised() {
    let mut form = PdfForm::open(&common::sample_form(), None).unwrap();
    let before = form.dump();
    let report = form
        .fill([("nickname", InputValue::from("JJ"))])
        .unwrap();
    assert_eq!(report.unknown_fields().collect::<Vec<_>>(), ["nickname"]);
    assert_eq!(form.dump(), before);
}

#[test]
fn flatten_filled_sample() {
    let mut form = PdfForm::open(&common::sample_form(), None).unwrap();
    form.fill([
        ("name", InputValue::from("Jane")),
        ("subscribe", InputValue::from(true)),
        ("plan", InputValue::from("B")),
    ])
    .unwrap();
    let (content_before, annots_before) = common::page_summary(&form.to_bytes().unwrap());
    assert_eq!(annots_before, 4);

    let values_before: Vec<_> = form.dump().into_iter().map(|r| r.value).collect();
    let report = form.flatten().unwrap();
    assert!(report.is_clean(), "{report:?}");
    assert_eq!(report.flattened_fields, ["name", "subscribe", "plan"]);

    for field in form.fields().terminal_fields() {
        assert_eq!(form.fields().widgets_of(field.id).count(), 0);
        assert!(
            form.fields()
                .effective_flags(field.id)
                .contains(FieldFlags::READ_ONLY)
        );
    }
    let values_after: Vec<_> = form.dump().into_iter().map(|r| r.value).collect();
    assert_eq!(values_before, values_after);

    let (content_after, annots_after) = common::page_summary(&form.to_bytes().unwrap());
    assert_eq!(annots_after, 0);
    assert!(content_after > content_before);
}

#[test]
fn flatten_reaches_every_page() {
    let mut form = PdfForm::open(&common::split_form(), None).unwrap();
    assert_eq!(form.page_count(), 2);
    assert_eq!(form.fields().widgets_of(form.fields().id_of("name").unwrap()).count(), 3);
    form.fill([("name", InputValue::from("Ada"))]).unwrap();
    let before = common::page_summaries(&form.to_bytes().unwrap());
    assert_eq!(before.iter().map(|(_, annots)| *annots).collect::<Vec<_>>(), [2, 1]);

    let report = form.flatten().unwrap();
    assert!(report.is_clean(), "{report:?}");
    assert_eq!(report.drawn, 3);
    assert_eq!(report.flattened_fields, ["name"]);

    let after = common::page_summaries(&form.to_bytes().unwrap());
    for ((content_before, _), (content_after, annots_after)) in before.iter().zip(&after) {
        assert_eq!(*annots_after, 0);
        assert!(content_after > content_before);
    }
    let reopened = PdfForm::open(&form.to_bytes().unwrap(), None).unwrap();
    let record = &reopened.dump()[0];
    assert!(record.read_only);
    assert_eq!(record.value, Some(FieldValue::Text("Ada".into())));
}

#[test]
fn flattened_output_reopens_read_only() {
    let mut form = PdfForm::open(&common::sample_form(), None).unwrap();
    form.fill([("name", InputValue::from("Jane"))]).unwrap();
    form.flatten().unwrap();

    let reopened = PdfForm::open(&form.to_bytes().unwrap(), None).unwrap();
    let records = reopened.dump();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.read_only));
    assert!(records.iter().all(|r| r.page.is_none()));
    assert_eq!(records[0].value, Some(FieldValue::Text("Jane".into())));
}

#[test]
fn nested_names_and_combo() {
    let mut form = PdfForm::open(&common::nested_form(), None).unwrap();
    let names: Vec<String> = form.dump().into_iter().map(|r| r.name).collect();
    assert_eq!(names, ["applicant.first", "applicant.last", "country"]);
    assert_eq!(
        form.field("applicant.first").unwrap().kind,
        Some(FieldKind::Text)
    );

    let report = form
        .fill([
            ("applicant.first", InputValue::from("Jane")),
            ("applicant.last", InputValue::from("Doe")),
            ("country", InputValue::from("fr")),
        ])
        .unwrap();
    assert!(report.is_clean(), "{report:?}");

    let reopened = PdfForm::open(&form.to_bytes().unwrap(), None).unwrap();
    assert_eq!(
        reopened.field("applicant.last").unwrap().value,
        Some(FieldValue::Text("Doe".into()))
    );
    assert_eq!(
        reopened.field("country").unwrap().value,
        Some(FieldValue::Choices(vec!["fr".into()]))
    );
}

#[test]
fn combo_rejects_label() {
    let mut form = PdfForm::open(&common::nested_form(), None).unwrap();
    let report = form.fill([("country", InputValue::from("France"))]).unwrap();
    assert_eq!(report.invalid_values().count(), 1);
}

#[test]
fn generated_appearances_are_flattened() {
    let mut form = PdfForm::open(&common::nested_form(), None).unwrap();
    form.fill([("applicant.first", InputValue::from("Jane"))])
        .unwrap();
    let report = form.flatten().unwrap();

    // The unfilled fields have no appearance to draw.
    assert_eq!(report.drawn, 1);
    assert_eq!(report.issues.len(), 2);
    assert_eq!(report.flattened_fields, ["applicant.first"]);
}

#[test]
fn minimal_options_skip_appearances() {
    let mut form =
        PdfForm::open(&common::nested_form(), Some(FormOptions::minimal())).unwrap();
    form.fill([("applicant.first", InputValue::from("Jane"))])
        .unwrap();
    let report = form.flatten().unwrap();
    assert_eq!(report.drawn, 0);
    assert_eq!(report.issues.len(), 3);
}

#[test]
fn save_writes_file() {
    let dir = std::env::temp_dir().join(format!("pdffiller-save-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("out.pdf");

    let mut form = PdfForm::open(&common::sample_form(), None).unwrap();
    form.fill([("name", InputValue::from("Jane"))]).unwrap();
    form.save(&path).unwrap();

    let reopened = PdfForm::open_file(&path, None).unwrap();
    assert_eq!(
        reopened.field("name").unwrap().value,
        Some(FieldValue::Text("Jane".into()))
    );
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn open_missing_file() {
    let err = PdfForm::open_file("/nonexistent/form.pdf", None).unwrap_err();
    assert!(matches!(err, FormError::IoError(_)));
}
