//! Burning widget appearances into page content.
//!
//! Each drawable widget's selected normal appearance is registered as a form
//! XObject in its page's resources and painted with `q <matrix> cm /Name Do Q`
//! appended to the page content. The widget annotation is then removed from
//! the page and from its field. A field left without widgets is marked
//! read-only but stays in the field tree.
//!
//! All widgets are inspected before the document is touched, so a widget
//! that cannot be flattened is reported and left exactly as it was.

use std::collections::{BTreeMap, BTreeSet};

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdffiller_core::{
    FieldFlags, FieldId, FieldTree, FlattenReport, Matrix, OFF_STATE, Rect, WidgetId, WidgetIssue,
};
use tracing::{debug, warn};

use crate::FormDocument;
use crate::error::BackendError;
use crate::graph::{self, get_dict, get_numbers, get_rect, to_object_id, to_object_ref};

/// Annotation-only keys removed from a field dictionary that doubled as its
/// own widget.
const ANNOTATION_KEYS: &[&[u8]] = &[
    b"Type",
    b"Subtype",
    b"Rect",
    b"AP",
    b"AS",
    b"F",
    b"P",
    b"MK",
    b"BS",
    b"Border",
    b"H",
    b"StructParent",
];

/// Flatten every widget of every terminal field.
///
/// # Errors
///
/// Only structural failures while rewriting pages (a page or field object
/// that vanished from the document) are errors; widgets whose appearance
/// cannot be located are reported in [`FlattenReport::issues`].
pub fn flatten(
    doc: &mut FormDocument,
    tree: &mut FieldTree,
) -> Result<FlattenReport, BackendError> {
    let mut report = FlattenReport::default();
    let steps = plan(doc, tree, &mut report);

    let mut page_ops: BTreeMap<ObjectId, String> = BTreeMap::new();
    let mut counter = 0usize;
    for step in &steps {
        let Step::Draw(draw) = step else { continue };
        let inner = doc.inner_mut();
        let stream_id = match &draw.source {
            Source::Object(id) => *id,
            Source::Inline(stream) => inner.add_object(stream.clone()),
        };
        mark_form_xobject(inner, stream_id)?;
        let name = register_xobject(inner, draw.page, stream_id, &mut counter)?;
        page_ops
            .entry(draw.page)
            .or_default()
            .push_str(&format!("q {} cm /{name} Do Q\n", draw.transform.to_operands()));
        debug!(
            field = %tree.qualified_name(draw.field),
            widget = %to_object_ref(draw.object),
            xobject = %name,
            "drew widget appearance"
        );
    }
    for (page_id, ops) in page_ops {
        append_content(doc.inner_mut(), page_id, ops)?;
    }

    let mut touched = BTreeSet::new();
    for step in steps {
        let (field, widget, object, page) = match step {
            Step::Draw(draw) => {
                report.drawn += 1;
                (draw.field, draw.widget, draw.object, Some(draw.page))
            }
            Step::Discard {
                field,
                widget,
                object,
                page,
            } => {
                report.discarded += 1;
                (field, widget, object, page)
            }
        };
        remove_widget(doc, tree, field, object, page)?;
        tree.remove_widget(widget);
        touched.insert(field);
    }

    for field in touched {
        if tree.field(field).widgets.is_empty() {
            mark_read_only(doc, tree, field)?;
            report.flattened_fields.push(tree.qualified_name(field).to_string());
        }
    }

    debug!(
        drawn = report.drawn,
        discarded = report.discarded,
        skipped = report.issues.len(),
        "flattened form"
    );
    Ok(report)
}

enum Source {
    Object(ObjectId),
    /// A stream stored directly in the `/AP` dictionary.
    Inline(Stream),
}

struct Draw {
    field: FieldId,
    widget: WidgetId,
    object: ObjectId,
    page: ObjectId,
    source: Source,
    transform: Matrix,
}

enum Step {
    Draw(Draw),
    /// Remove without drawing: hidden, or an `Off` state with no stream.
    Discard {
        field: FieldId,
        widget: WidgetId,
        object: ObjectId,
        page: Option<ObjectId>,
    },
}

enum Selected {
    Stream { source: Source, bbox: Rect, matrix: Matrix },
    Nothing,
}

/// Decide what happens to each widget, recording the ones to skip.
fn plan(doc: &FormDocument, tree: &FieldTree, report: &mut FlattenReport) -> Vec<Step> {
    let inner = doc.inner();
    let mut steps = Vec::new();

    for field in tree.terminal_fields() {
        for widget in tree.widgets_of(field.id) {
            let object = to_object_id(widget.object);
            let page = widget.page.map(|p| to_object_id(p.object));
            let mut skip = |reason: String| {
                warn!(
                    field = %field.name,
                    widget = %widget.object,
                    reason = %reason,
                    "cannot flatten widget"
                );
                report.issues.push(WidgetIssue {
                    field: field.name.clone(),
                    object: widget.object,
                    reason,
                });
            };

            let discard = Step::Discard {
                field: field.id,
                widget: widget.id,
                object,
                page,
            };
            if !widget.flags.is_drawn() {
                steps.push(discard);
                continue;
            }
            let dict = match graph::dict(inner, object) {
                Ok(dict) => dict,
                Err(e) => {
                    skip(e.to_string());
                    continue;
                }
            };
            let state = widget.current_state.as_deref().unwrap_or(OFF_STATE);
            match select_appearance(inner, dict, state) {
                Ok(Selected::Nothing) => steps.push(discard),
                Ok(Selected::Stream {
                    source,
                    bbox,
                    matrix,
                }) => {
                    let Some(page) = page else {
                        skip("widget is not placed on any page".to_string());
                        continue;
                    };
                    // Map the transformed form bounding box onto the widget rectangle.
                    let transform =
                        Matrix::rect_to_rect(&matrix.transform_rect(&bbox), &widget.rect);
                    steps.push(Step::Draw(Draw {
                        field: field.id,
                        widget: widget.id,
                        object,
                        page,
                        source,
                        transform,
                    }));
                }
                Err(reason) => skip(reason),
            }
        }
    }
    steps
}

/// Pick the normal appearance stream shown for `state`.
fn select_appearance(doc: &Document, widget: &Dictionary, state: &str) -> Result<Selected, String> {
    let ap = get_dict(doc, widget, b"AP")
        .ok_or_else(|| "no /AP appearance dictionary".to_string())?;
    let normal = ap
        .get(b"N")
        .map_err(|_| "no normal (/N) appearance".to_string())?;

    let entry = match graph::resolve(doc, normal) {
        Object::Dictionary(states) => match states.get(state.as_bytes()) {
            Ok(entry) => entry,
            Err(_) if state == OFF_STATE => return Ok(Selected::Nothing),
            Err(_) => return Err(format!("no appearance stream for state '{state}'")),
        },
        _ => normal,
    };

    let (source, stream) = match (entry, graph::resolve(doc, entry)) {
        (Object::Reference(id), Object::Stream(stream)) => (Source::Object(*id), stream),
        (_, Object::Stream(stream)) => (Source::Inline(stream.clone()), stream),
        (_, other) => {
            return Err(format!(
                "appearance is a {}, not a stream",
                graph::kind_name(other)
            ));
        }
    };
    let bbox = get_rect(doc, &stream.dict, b"BBox")
        .ok_or_else(|| "appearance stream has no /BBox".to_string())?;
    let matrix = get_numbers(doc, &stream.dict, b"Matrix")
        .and_then(|values| Matrix::from_slice(&values))
        .unwrap_or_default();
    Ok(Selected::Stream {
        source,
        bbox,
        matrix,
    })
}

fn mark_form_xobject(doc: &mut Document, stream_id: ObjectId) -> Result<(), BackendError> {
    let dict = graph::dict_mut(doc, stream_id)?;
    if !dict.has(b"Subtype") {
        dict.set("Type", "XObject");
        dict.set("Subtype", "Form");
    }
    Ok(())
}

/// Where a dictionary-valued entry lives.
enum Slot {
    Inline,
    Indirect(ObjectId),
    Missing,
}

fn slot(dict: &Dictionary, key: &[u8]) -> Slot {
    match dict.get(key) {
        Ok(Object::Dictionary(_)) => Slot::Inline,
        Ok(Object::Reference(id)) => Slot::Indirect(*id),
        _ => Slot::Missing,
    }
}

/// The page's own resource dictionary, copying inherited resources down
/// when the page has none of its own.
fn page_resources_mut(
    doc: &mut Document,
    page_id: ObjectId,
) -> Result<&mut Dictionary, BackendError> {
    match slot(graph::dict(doc, page_id)?, b"Resources") {
        Slot::Indirect(id) => return graph::dict_mut(doc, id),
        Slot::Inline => {}
        Slot::Missing => {
            let inherited = match graph::page_inherited(doc, page_id, b"Resources") {
                Some(Object::Dictionary(resources)) => resources.clone(),
                _ => Dictionary::new(),
            };
            graph::dict_mut(doc, page_id)?.set("Resources", inherited);
        }
    }
    match graph::dict_mut(doc, page_id)?.get_mut(b"Resources") {
        Ok(Object::Dictionary(resources)) => Ok(resources),
        _ => Err(BackendError::Parse(format!(
            "page {} {} R has unusable /Resources",
            page_id.0, page_id.1
        ))),
    }
}

/// Add `stream_id` to the page's `/XObject` resources under a fresh name.
fn register_xobject(
    doc: &mut Document,
    page_id: ObjectId,
    stream_id: ObjectId,
    counter: &mut usize,
) -> Result<String, BackendError> {
    let indirect = match slot(page_resources_mut(doc, page_id)?, b"XObject") {
        Slot::Indirect(id) => Some(id),
        Slot::Inline => None,
        Slot::Missing => {
            page_resources_mut(doc, page_id)?.set("XObject", Dictionary::new());
            None
        }
    };
    let xobjects = match indirect {
        Some(id) => graph::dict_mut(doc, id)?,
        None => match page_resources_mut(doc, page_id)?.get_mut(b"XObject") {
            Ok(Object::Dictionary(xobjects)) => xobjects,
            _ => {
                return Err(BackendError::Parse(format!(
                    "page {} {} R has unusable /XObject resources",
                    page_id.0, page_id.1
                )));
            }
        },
    };

    loop {
        let name = format!("Flat{counter}");
        *counter += 1;
        if !xobjects.has(name.as_bytes()) {
            xobjects.set(name.as_str(), Object::Reference(stream_id));
            return Ok(name);
        }
    }
}

/// Wrap the existing page content in `q ... Q` and append `ops` after it.
fn append_content(doc: &mut Document, page_id: ObjectId, ops: String) -> Result<(), BackendError> {
    let existing: Vec<Object> = match graph::dict(doc, page_id)?.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    let head = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let tail = doc.add_object(Stream::new(
        Dictionary::new(),
        format!("Q\n{ops}").into_bytes(),
    ));
    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(head));
    contents.extend(existing);
    contents.push(Object::Reference(tail));
    graph::dict_mut(doc, page_id)?.set("Contents", Object::Array(contents));
    Ok(())
}

/// Detach a widget annotation from its page and its field.
fn remove_widget(
    doc: &mut FormDocument,
    tree: &FieldTree,
    field: FieldId,
    object: ObjectId,
    page: Option<ObjectId>,
) -> Result<(), BackendError> {
    let pages: Vec<ObjectId> = match page {
        Some(page) => vec![page],
        None => doc.page_ids().to_vec(),
    };
    let inner = doc.inner_mut();
    for page_id in pages {
        if graph::remove_reference(inner, page_id, b"Annots", object)
            && graph::array_mut(inner, page_id, b"Annots").is_some_and(|a| a.is_empty())
        {
            graph::dict_mut(inner, page_id)?.remove(b"Annots");
        }
    }

    let field_object = to_object_id(tree.field(field).object);
    if field_object == object {
        let dict = graph::dict_mut(inner, object)?;
        for key in ANNOTATION_KEYS {
            dict.remove(key);
        }
    } else {
        if graph::remove_reference(inner, field_object, b"Kids", object)
            && graph::array_mut(inner, field_object, b"Kids").is_some_and(|k| k.is_empty())
        {
            graph::dict_mut(inner, field_object)?.remove(b"Kids");
        }
        inner.objects.remove(&object);
    }
    Ok(())
}

fn mark_read_only(
    doc: &mut FormDocument,
    tree: &mut FieldTree,
    field: FieldId,
) -> Result<(), BackendError> {
    let node = tree.field_mut(field);
    let flags = node.flags.unwrap_or_default() | FieldFlags::READ_ONLY;
    node.flags = Some(flags);

    let dict = graph::dict_mut(doc.inner_mut(), to_object_id(node.object))?;
    let raw = dict.get(b"Ff").and_then(Object::as_i64).unwrap_or(0);
    dict.set(
        "Ff",
        Object::Integer(raw | i64::from(FieldFlags::READ_ONLY.bits())),
    );
    Ok(())
}
