//! Writing field values into the object graph.
//!
//! [`apply_values`] runs [`resolve_value`] for each requested name and, on
//! success, writes `/V`, the widgets' `/AS` and (for variable-text fields) a
//! fresh normal appearance stream. Per-field problems are collected in the
//! [`ApplyReport`] and never stop the batch.

use lopdf::{Object, ObjectId, dictionary};
use pdffiller_core::{
    Appearance, ApplyReport, FieldFlags, FieldId, FieldIssue, FieldKind, FieldTree, FieldValue,
    FormOptions, InputValue, Rect, Resolution, WidgetId, resolve_value,
};
use tracing::debug;

use crate::FormDocument;
use crate::appearance::{TextLayout, normal_stream_id, text_appearance};
use crate::error::BackendError;
use crate::graph::{self, encode_text_string, to_object_id};

/// Apply `values` in order, updating both the field tree and the document.
///
/// Unknown names and values a field cannot hold are reported and skipped;
/// the field is left unchanged.
///
/// # Errors
///
/// Returns an error only when the object graph no longer matches the tree,
/// e.g. a field object was removed after the tree was built.
pub fn apply_values<N, V>(
    doc: &mut FormDocument,
    tree: &mut FieldTree,
    values: impl IntoIterator<Item = (N, V)>,
    options: &FormOptions,
) -> Result<ApplyReport, BackendError>
where
    N: AsRef<str>,
    V: std::borrow::Borrow<InputValue>,
{
    let mut report = ApplyReport::default();

    for (name, input) in values {
        let name = name.as_ref();
        let input = input.borrow();
        let Some(id) = tree.id_of(name) else {
            debug!(field = name, "no such field");
            report.issues.push(FieldIssue::unknown(name));
            continue;
        };
        let resolution = match resolve_value(tree, id, input) {
            Ok(resolution) => resolution,
            Err(reason) => {
                debug!(field = name, %input, reason = %reason, "value rejected");
                report.issues.push(FieldIssue::invalid(name, reason));
                continue;
            }
        };

        write_value(doc, tree, id, &resolution)?;
        write_states(doc, tree, &resolution.states)?;
        if options.generate_appearances {
            write_text_appearances(doc, tree, id, &resolution.value)?;
        }
        debug!(field = name, value = %resolution.value, "applied value");
        tree.field_mut(id).value = Some(resolution.value);
        report.applied.push(name.to_string());
    }

    if !report.applied.is_empty() {
        update_acroform(doc, options);
    }
    Ok(report)
}

/// Write `/V` (and `/I` for list boxes) on the field dictionary.
fn write_value(
    doc: &mut FormDocument,
    tree: &FieldTree,
    id: FieldId,
    resolution: &Resolution,
) -> Result<(), BackendError> {
    let field = tree.field(id);
    let indices: Vec<Object> = match (&resolution.value, field.kind) {
        (FieldValue::Choices(selected), Some(FieldKind::ChoiceList)) => field
            .options
            .iter()
            .enumerate()
            .filter(|(_, o)| selected.contains(&o.export))
            .map(|(i, _)| Object::Integer(i as i64))
            .collect(),
        _ => Vec::new(),
    };

    let dict = graph::dict_mut(doc.inner_mut(), to_object_id(field.object))?;
    match &resolution.value {
        FieldValue::Text(text) => dict.set("V", encode_text_string(text)),
        FieldValue::State(state) => dict.set("V", Object::Name(state.as_bytes().to_vec())),
        FieldValue::Choices(selected) => match selected.as_slice() {
            [] => {
                dict.remove(b"V");
            }
            [single] => dict.set("V", encode_text_string(single)),
            many => dict.set(
                "V",
                Object::Array(many.iter().map(|s| encode_text_string(s)).collect()),
            ),
        },
    }
    if indices.is_empty() {
        dict.remove(b"I");
    } else {
        dict.set("I", Object::Array(indices));
    }
    Ok(())
}

/// Switch each widget's `/AS` to its new appearance state.
fn write_states(
    doc: &mut FormDocument,
    tree: &mut FieldTree,
    states: &[(WidgetId, String)],
) -> Result<(), BackendError> {
    for (widget_id, state) in states {
        let Some(widget) = tree.widget_mut(*widget_id) else {
            continue;
        };
        widget.current_state = Some(state.clone());
        let dict = graph::dict_mut(doc.inner_mut(), to_object_id(widget.object))?;
        dict.set("AS", Object::Name(state.as_bytes().to_vec()));
    }
    Ok(())
}

/// Regenerate the normal appearance of every widget of a text or combo field.
fn write_text_appearances(
    doc: &mut FormDocument,
    tree: &mut FieldTree,
    id: FieldId,
    value: &FieldValue,
) -> Result<(), BackendError> {
    let field = tree.field(id);
    let text = match (field.kind, value) {
        (Some(FieldKind::Text), FieldValue::Text(text)) => text.clone(),
        // Show the option's label, or free text as typed.
        (Some(FieldKind::ChoiceCombo), FieldValue::Choices(selected)) => match selected.first() {
            Some(export) => field
                .options
                .iter()
                .find(|o| &o.export == export)
                .map_or_else(|| export.clone(), |o| o.label.clone()),
            None => String::new(),
        },
        _ => return Ok(()),
    };
    let Some(da) = tree.default_appearance(id).map(str::to_string) else {
        debug!(field = %field.name, "no default appearance, leaving appearance to the viewer");
        return Ok(());
    };
    let flags = tree.effective_flags(id);
    let layout = TextLayout {
        quadding: tree.quadding(id),
        multiline: flags.contains(FieldFlags::MULTILINE),
        password: flags.contains(FieldFlags::PASSWORD),
        comb: field.max_len.filter(|_| flags.contains(FieldFlags::COMB)),
    };

    let widgets: Vec<(WidgetId, ObjectId, Rect)> = tree
        .widgets_of(id)
        .map(|w| (w.id, to_object_id(w.object), w.rect))
        .collect();
    for (widget_id, object, rect) in widgets {
        let inner = doc.inner_mut();
        let stream = text_appearance(inner, &da, &text, rect, layout);
        let existing = normal_stream_id(inner, graph::dict(inner, object)?);
        match existing {
            Some(stream_id) => {
                inner.objects.insert(stream_id, Object::Stream(stream));
            }
            None => {
                let stream_id = inner.add_object(stream);
                graph::dict_mut(inner, object)?
                    .set("AP", dictionary! { "N" => Object::Reference(stream_id) });
            }
        }
        if let Some(widget) = tree.widget_mut(widget_id) {
            widget.appearance = Appearance::Single;
        }
    }
    Ok(())
}

fn update_acroform(doc: &mut FormDocument, options: &FormOptions) {
    let Some(form) = graph::acroform_mut(doc.inner_mut()) else {
        return;
    };
    if options.need_appearances {
        form.set("NeedAppearances", Object::Boolean(true));
    }
    if options.drop_xfa && form.remove(b"XFA").is_some() {
        debug!("removed XFA form data");
    }
}
