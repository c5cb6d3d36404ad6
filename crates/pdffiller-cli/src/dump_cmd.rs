use std::path::Path;

use pdffiller::{FieldRecord, FieldValue};

use crate::cli::DumpFormat;
use crate::exit_codes::ERROR_ENCOUNTERED;
use crate::shared::open_form;

pub fn run(file: &Path, format: DumpFormat, password: Option<&str>) -> Result<(), i32> {
    let form = open_form(file, password)?;
    let records = form.dump();

    match format {
        DumpFormat::Text => {
            print!("{}", format_text(&records));
            Ok(())
        }
        DumpFormat::Json => {
            let json = serde_json::to_string_pretty(&format_json(&records)).map_err(|e| {
                eprintln!("Error: failed to encode JSON: {e}");
                ERROR_ENCOUNTERED
            })?;
            println!("{json}");
            Ok(())
        }
    }
}

fn type_name(record: &FieldRecord) -> String {
    record
        .kind
        .map_or_else(|| "group".to_string(), |kind| kind.to_string())
}

/// Values as they would be typed back in; empty values are dropped.
fn value_lines(value: Option<&FieldValue>) -> Vec<String> {
    match value {
        Some(v) if v.is_empty() => Vec::new(),
        Some(FieldValue::Choices(values)) => values.clone(),
        Some(v) => vec![v.to_display_string()],
        None => Vec::new(),
    }
}

/// One `----------` block per field with `Key: value` lines.
pub fn format_text(records: &[FieldRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str("----------\n");
        out.push_str(&format!("FieldType: {}\n", type_name(record)));
        out.push_str(&format!("FieldName: {}\n", record.name));
        for value in value_lines(record.value.as_ref()) {
            out.push_str(&format!("FieldValue: {value}\n"));
        }
        for option in &record.options {
            out.push_str(&format!("FieldOptions: {option}\n"));
        }
        if let Some(max_len) = record.max_len {
            out.push_str(&format!("MaxLength: {max_len}\n"));
        }
    }
    out
}

fn record_to_json(record: &FieldRecord) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    obj.insert("FieldType".into(), type_name(record).into());
    obj.insert("FieldName".into(), record.name.clone().into());
    let values = value_lines(record.value.as_ref());
    if matches!(record.value, Some(FieldValue::Choices(_))) {
        obj.insert("FieldValue".into(), values.into());
    } else if let Some(value) = values.into_iter().next() {
        obj.insert("FieldValue".into(), value.into());
    }
    if !record.options.is_empty() {
        obj.insert("FieldOptions".into(), record.options.clone().into());
    }
    if let Some(max_len) = record.max_len {
        obj.insert("MaxLength".into(), max_len.into());
    }
    if record.read_only {
        obj.insert("ReadOnly".into(), true.into());
    }
    if record.required {
        obj.insert("Required".into(), true.into());
    }
    serde_json::Value::Object(obj)
}

pub fn format_json(records: &[FieldRecord]) -> serde_json::Value {
    serde_json::Value::Array(records.iter().map(record_to_json).collect())
}
