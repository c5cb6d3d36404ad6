//! Field tree construction from the `/AcroForm` dictionary.
//!
//! Walks the `/Fields` array recursively. A kid without a partial name `/T`
//! and without kids of its own is a widget annotation of its parent; any
//! other kid is a child field. Field and widget may share one dictionary.
//!
//! A `/Fields` entry that names a `/Parent` is walked from its topmost
//! ancestor. Page annotations that point at a known field through `/Parent`
//! but are missing from its `/Kids` are attached after the walk.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};
use pdffiller_core::{
    Appearance, AnnotationFlags, ChoiceOption, Field, FieldFlags, FieldId, FieldKind, FieldTree,
    FieldType, FieldValue, FormError, FormOptions, PageRef, Rect, Widget,
};
use tracing::{debug, warn};

use crate::FormDocument;
use crate::error::BackendError;
use crate::graph::{self, get, get_array, get_dict, get_int, get_name, get_text};

/// Build the field tree of `doc`.
///
/// A document without an AcroForm yields an empty tree.
///
/// # Errors
///
/// [`FormError::MalformedFieldTree`] for a field cycle, a hierarchy deeper
/// than [`FormOptions::max_field_depth`], or a widget-bearing field whose
/// type cannot be resolved; [`FormError::DuplicateFieldName`] when two fields
/// share a fully-qualified name.
pub fn build_field_tree(
    doc: &FormDocument,
    options: &FormOptions,
) -> Result<FieldTree, BackendError> {
    let inner = doc.inner();
    let (annot_pages, annot_order) = page_annotations(doc);
    let mut builder = TreeBuilder {
        doc: inner,
        max_depth: options.max_field_depth,
        annot_pages,
        ancestors: Vec::new(),
        visited: HashSet::new(),
        fields: HashMap::new(),
        widgets: HashSet::new(),
        tree: FieldTree::new(),
    };

    let Some(acroform) = graph::acroform(inner) else {
        debug!("document has no AcroForm");
        return Ok(builder.tree);
    };
    builder.tree.default_appearance = get_text(inner, acroform, b"DA");

    let roots: Vec<ObjectId> = get_array(inner, acroform, b"Fields")
        .unwrap_or_default()
        .iter()
        .filter_map(|entry| match entry {
            Object::Reference(id) => Some(*id),
            _ => {
                warn!("skipping direct object in /Fields");
                None
            }
        })
        .collect();

    for entry in roots {
        let root = builder.topmost_ancestor(entry)?;
        if root != entry {
            debug!(
                entry = %graph::to_object_ref(entry),
                root = %graph::to_object_ref(root),
                "/Fields entry has a parent field"
            );
        }
        if !builder.visited.contains(&root) {
            builder.walk(root, None, 0)?;
        }
        builder.adopt(entry)?;
    }
    for annot in annot_order {
        builder.adopt(annot)?;
    }

    let tree = builder.tree;
    debug!(
        fields = tree.len(),
        terminals = tree.terminal_fields().count(),
        "built field tree"
    );
    Ok(tree)
}

/// Map each annotation object to the first page that lists it in
/// `/Annots`, along with every annotation in page order.
fn page_annotations(doc: &FormDocument) -> (HashMap<ObjectId, PageRef>, Vec<ObjectId>) {
    let inner = doc.inner();
    let mut map = HashMap::new();
    let mut order = Vec::new();
    for (index, page_id) in doc.page_ids().iter().enumerate() {
        let Ok(page) = graph::dict(inner, *page_id) else {
            continue;
        };
        for annot in get_array(inner, page, b"Annots").unwrap_or_default() {
            if let Object::Reference(id) = annot {
                map.entry(*id).or_insert_with(|| {
                    order.push(*id);
                    PageRef {
                        index,
                        object: graph::to_object_ref(*page_id),
                    }
                });
            }
        }
    }
    (map, order)
}

/// The field a dictionary names as its `/Parent`, if that is a field.
fn parent_field(doc: &Document, dict: &Dictionary) -> Option<ObjectId> {
    let Ok(Object::Reference(parent)) = dict.get(b"Parent") else {
        return None;
    };
    let parent_dict = graph::dict(doc, *parent).ok()?;
    let is_field = parent_dict.has(b"T") || parent_dict.has(b"FT") || parent_dict.has(b"Kids");
    is_field.then_some(*parent)
}

struct TreeBuilder<'a> {
    doc: &'a Document,
    max_depth: usize,
    annot_pages: HashMap<ObjectId, PageRef>,
    /// Field objects on the path from the root to the current node.
    ancestors: Vec<ObjectId>,
    visited: HashSet<ObjectId>,
    fields: HashMap<ObjectId, FieldId>,
    /// Annotation objects already attached as widgets.
    widgets: HashSet<ObjectId>,
    tree: FieldTree,
}

impl TreeBuilder<'_> {
    /// Follow `/Parent` links from `id` up to the outermost field.
    fn topmost_ancestor(&self, id: ObjectId) -> Result<ObjectId, BackendError> {
        let mut current = id;
        for _ in 0..self.max_depth {
            let Some(parent) = graph::dict(self.doc, current)
                .ok()
                .and_then(|dict| parent_field(self.doc, dict))
            else {
                return Ok(current);
            };
            current = parent;
        }
        Err(FormError::MalformedFieldTree(format!(
            "/Parent chain of field {} {} R is longer than {} levels",
            id.0, id.1, self.max_depth
        ))
        .into())
    }

    /// Attach an object that names a built field as its `/Parent` but was
    /// not reached through that field's `/Kids`.
    fn adopt(&mut self, id: ObjectId) -> Result<(), BackendError> {
        if self.visited.contains(&id) || self.widgets.contains(&id) {
            return Ok(());
        }
        let doc = self.doc;
        let Ok(dict) = graph::dict(doc, id) else {
            return Ok(());
        };
        let Some(parent) = parent_field(doc, dict).and_then(|p| self.fields.get(&p).copied())
        else {
            return Ok(());
        };

        if !is_widget_kid(dict) {
            if self.tree.field(parent).is_terminal() {
                warn!(
                    field = %self.tree.qualified_name(parent),
                    object = %graph::to_object_ref(id),
                    "terminal field claims a child field; ignoring it"
                );
                return Ok(());
            }
            debug!(object = %graph::to_object_ref(id), "adopting child field missing from /Kids");
            let depth = self.tree.ancestors(parent).count();
            return self.walk(id, Some(parent), depth);
        }

        if !self.tree.field(parent).children.is_empty() {
            warn!(
                field = %self.tree.qualified_name(parent),
                object = %graph::to_object_ref(id),
                "field has child fields; ignoring widget that names it as /Parent"
            );
            return Ok(());
        }
        if self.tree.field(parent).kind.is_none() {
            let Some(field_type) = self.tree.effective_type(parent) else {
                return Err(FormError::MalformedFieldTree(format!(
                    "field '{}' has a widget but no /FT and inherits none",
                    self.tree.qualified_name(parent)
                ))
                .into());
            };
            let kind = FieldKind::resolve(field_type, self.tree.effective_flags(parent));
            self.tree.field_mut(parent).kind = Some(kind);
        }
        debug!(
            field = %self.tree.qualified_name(parent),
            widget = %graph::to_object_ref(id),
            "adopting widget missing from /Kids"
        );
        self.attach_widget(parent, id, dict);
        Ok(())
    }

    fn walk(
        &mut self,
        id: ObjectId,
        parent: Option<FieldId>,
        depth: usize,
    ) -> Result<(), BackendError> {
        if self.ancestors.contains(&id) {
            return Err(FormError::MalformedFieldTree(format!(
                "field {} {} R is its own ancestor",
                id.0, id.1
            ))
            .into());
        }
        if depth >= self.max_depth {
            return Err(FormError::MalformedFieldTree(format!(
                "field hierarchy deeper than {} levels at {} {} R",
                self.max_depth, id.0, id.1
            ))
            .into());
        }
        if !self.visited.insert(id) {
            warn!(object = %graph::to_object_ref(id), "field object reachable twice, skipping");
            return Ok(());
        }

        let doc = self.doc;
        let dict = match graph::dict(doc, id) {
            Ok(dict) => dict,
            Err(e) => {
                warn!(error = %e, "skipping unreadable field");
                return Ok(());
            }
        };

        let field = read_field(doc, id, dict);
        let fid = self.tree.add_field(parent, field)?;
        self.fields.insert(id, fid);
        let field_type = self.tree.effective_type(fid);
        {
            let node = self.tree.field_mut(fid);
            node.value = get(doc, dict, b"V").and_then(|v| field_value(v, field_type));
            node.default_value = get(doc, dict, b"DV").and_then(|v| field_value(v, field_type));
        }

        let mut widget_kids = Vec::new();
        self.ancestors.push(id);
        for kid in get_array(doc, dict, b"Kids").unwrap_or_default() {
            let Object::Reference(kid_id) = kid else {
                warn!(field = %self.tree.qualified_name(fid), "skipping direct object in /Kids");
                continue;
            };
            if self.ancestors.contains(kid_id) {
                return Err(FormError::MalformedFieldTree(format!(
                    "field {} {} R is its own ancestor",
                    kid_id.0, kid_id.1
                ))
                .into());
            }
            match graph::dict(doc, *kid_id) {
                Ok(kid_dict) if is_widget_kid(kid_dict) => widget_kids.push((*kid_id, kid_dict)),
                Ok(_) => self.walk(*kid_id, Some(fid), depth + 1)?,
                Err(e) => warn!(error = %e, "skipping unreadable kid"),
            }
        }
        self.ancestors.pop();

        let own_widget = is_annotation(doc, dict);
        if !self.tree.field(fid).children.is_empty() {
            if own_widget || !widget_kids.is_empty() {
                warn!(
                    field = %self.tree.qualified_name(fid),
                    "field has both child fields and widgets; ignoring the widgets"
                );
            }
            return Ok(());
        }

        if field_type.is_none() && widget_kids.is_empty() && !own_widget {
            // Empty namespace node.
            return Ok(());
        }
        let Some(field_type) = field_type else {
            return Err(FormError::MalformedFieldTree(format!(
                "field '{}' ({} {} R) has no /FT and inherits none",
                self.tree.qualified_name(fid),
                id.0,
                id.1
            ))
            .into());
        };

        let kind = FieldKind::resolve(field_type, self.tree.effective_flags(fid));
        self.tree.field_mut(fid).kind = Some(kind);
        if own_widget {
            self.attach_widget(fid, id, dict);
        }
        for (kid_id, kid_dict) in widget_kids {
            self.attach_widget(fid, kid_id, kid_dict);
        }
        Ok(())
    }

    fn attach_widget(&mut self, field: FieldId, id: ObjectId, dict: &Dictionary) {
        let widget = self.read_widget(id, dict);
        self.tree.add_widget(field, widget);
        self.widgets.insert(id);
    }

    fn read_widget(&self, id: ObjectId, dict: &Dictionary) -> Widget {
        let doc = self.doc;
        let rect = graph::get_rect(doc, dict, b"Rect").unwrap_or_else(Rect::zero);
        let mut widget = Widget::new(graph::to_object_ref(id), rect);
        widget.appearance = read_appearance(doc, dict);
        widget.current_state = get_name(doc, dict, b"AS");
        widget.flags = get_int(doc, dict, b"F")
            .map(AnnotationFlags::from_raw)
            .unwrap_or_default();
        widget.page = self.annot_pages.get(&id).copied().or_else(|| {
            // Widgets missing from every /Annots array still name their page.
            let Ok(Object::Reference(page_id)) = dict.get(b"P") else {
                return None;
            };
            let index = doc.get_pages().values().position(|p| p == page_id)?;
            Some(PageRef {
                index,
                object: graph::to_object_ref(*page_id),
            })
        });
        widget
    }
}

fn read_field(doc: &Document, id: ObjectId, dict: &Dictionary) -> Field {
    let mut field = Field::new(graph::to_object_ref(id), get_text(doc, dict, b"T"));
    field.field_type = get_name(doc, dict, b"FT").and_then(|ft| FieldType::from_pdf_name(&ft));
    field.flags = get_int(doc, dict, b"Ff").map(FieldFlags::from_raw);
    field.options = read_options(doc, dict);
    field.max_len = get_int(doc, dict, b"MaxLen").and_then(|n| u32::try_from(n).ok());
    field.default_appearance = get_text(doc, dict, b"DA");
    field.quadding = get_int(doc, dict, b"Q");
    field
}

/// A kid with neither a partial name nor kids of its own is a widget.
fn is_widget_kid(dict: &Dictionary) -> bool {
    !dict.has(b"T") && !dict.has(b"Kids")
}

/// Whether a field dictionary doubles as its widget annotation.
fn is_annotation(doc: &Document, dict: &Dictionary) -> bool {
    get_name(doc, dict, b"Subtype").as_deref() == Some("Widget")
        || (dict.has(b"Rect") && !dict.has(b"Kids"))
}

/// Read the `/Opt` array: plain entries or `[export label]` pairs.
fn read_options(doc: &Document, dict: &Dictionary) -> Vec<ChoiceOption> {
    get_array(doc, dict, b"Opt")
        .unwrap_or_default()
        .iter()
        .filter_map(|item| match graph::resolve(doc, item) {
            Object::Array(pair) if pair.len() >= 2 => {
                let export = graph::object_text(graph::resolve(doc, &pair[0]))?;
                let label = graph::object_text(graph::resolve(doc, &pair[1]))?;
                Some(ChoiceOption::new(export, label))
            }
            other => graph::object_text(other).map(ChoiceOption::plain),
        })
        .collect()
}

fn read_appearance(doc: &Document, dict: &Dictionary) -> Appearance {
    let Some(ap) = get_dict(doc, dict, b"AP") else {
        return Appearance::None;
    };
    match get(doc, ap, b"N") {
        Some(Object::Stream(_)) => Appearance::Single,
        Some(Object::Dictionary(states)) => Appearance::States(
            states
                .iter()
                .map(|(name, _)| String::from_utf8_lossy(name).into_owned())
                .collect(),
        ),
        _ => Appearance::None,
    }
}

/// Interpret a raw `/V` or `/DV` object for a field of the given type.
fn field_value(obj: &Object, field_type: Option<FieldType>) -> Option<FieldValue> {
    let texts = |items: &[Object]| -> Vec<String> {
        items.iter().filter_map(graph::object_text).collect()
    };
    match (field_type, obj) {
        (Some(FieldType::Signature), _) => None,
        (Some(FieldType::Text), other) => graph::object_text(other).map(FieldValue::Text),
        (Some(FieldType::Button), other) => graph::object_text(other).map(FieldValue::State),
        (Some(FieldType::Choice), Object::Array(items)) => {
            Some(FieldValue::Choices(texts(items.as_slice())))
        }
        (Some(FieldType::Choice), other) => graph::object_text(other).map(|t| {
            FieldValue::Choices(if t.is_empty() { Vec::new() } else { vec![t] })
        }),
        (None, Object::Array(items)) => Some(FieldValue::Choices(texts(items.as_slice()))),
        (None, Object::Name(_)) => graph::object_text(obj).map(FieldValue::State),
        (None, other) => graph::object_text(other).map(FieldValue::Text),
    }
}
