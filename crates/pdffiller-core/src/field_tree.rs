//! The AcroForm field tree.
//!
//! [`FieldTree`] is an arena owning every [`Field`] and [`Widget`] of a
//! document. Ownership flows top-down: the tree owns fields, fields list their
//! children and widgets by id, and the `parent` / `field` back-links are plain
//! ids. Inheritable attributes are stored only on the node that declares them
//! and are resolved on read by walking parent links ([`FieldTree::inherited`]).

use std::collections::HashMap;

use crate::{
    AnnotationFlags, ChoiceOption, FieldFlags, FieldKind, FieldType, FieldValue, FormError,
    OFF_STATE, ObjectRef, Rect,
};

/// Index of a [`Field`] inside its [`FieldTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(usize);

impl FieldId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Index of a [`Widget`] inside its [`FieldTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(usize);

impl WidgetId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A node of the field hierarchy.
///
/// Terminal fields carry a resolved [`kind`](Field::kind); purely
/// hierarchical nodes (name-space grouping) have `kind == None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: FieldId,
    /// Partial name from `/T`.
    pub partial_name: Option<String>,
    /// Fully-qualified dotted name.
    pub name: String,
    /// The field dictionary in the object graph.
    pub object: ObjectRef,
    /// Own `/FT` entry, if declared on this node.
    pub field_type: Option<FieldType>,
    /// Own `/Ff` entry, if declared on this node.
    pub flags: Option<FieldFlags>,
    /// Resolved kind for terminal fields.
    pub kind: Option<FieldKind>,
    /// Own `/V` entry.
    pub value: Option<FieldValue>,
    /// Own `/DV` entry.
    pub default_value: Option<FieldValue>,
    /// `/Opt` entries, in declared order.
    pub options: Vec<ChoiceOption>,
    /// `/MaxLen` of a text field.
    pub max_len: Option<u32>,
    /// Own `/DA` default appearance string.
    pub default_appearance: Option<String>,
    /// Own `/Q` quadding (0 left, 1 centered, 2 right).
    pub quadding: Option<i64>,
    pub parent: Option<FieldId>,
    pub children: Vec<FieldId>,
    pub widgets: Vec<WidgetId>,
}

impl Field {
    /// Create a detached node for the given field dictionary.
    pub fn new(object: ObjectRef, partial_name: Option<String>) -> Self {
        Self {
            id: FieldId(usize::MAX),
            partial_name,
            name: String::new(),
            object,
            field_type: None,
            flags: None,
            kind: None,
            value: None,
            default_value: None,
            options: Vec::new(),
            max_len: None,
            default_appearance: None,
            quadding: None,
            parent: None,
            children: Vec::new(),
            widgets: Vec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.kind.is_some()
    }
}

/// The normal (`/AP /N`) appearance of a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Appearance {
    /// No normal appearance stream.
    None,
    /// A single stateless stream.
    Single,
    /// A dictionary of streams keyed by appearance state name.
    States(Vec<String>),
}

/// The page this widget is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRef {
    /// 0-based page index.
    pub index: usize,
    pub object: ObjectRef,
}

/// Visual placement of one field instance on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub id: WidgetId,
    /// Owning field (lookup only).
    pub field: FieldId,
    /// The annotation dictionary. Equals the field's object when the field
    /// and its single widget share one dictionary.
    pub object: ObjectRef,
    pub page: Option<PageRef>,
    pub rect: Rect,
    pub appearance: Appearance,
    /// Active appearance state (`/AS`).
    pub current_state: Option<String>,
    /// Annotation flags (`/F`).
    pub flags: AnnotationFlags,
}

impl Widget {
    pub fn new(object: ObjectRef, rect: Rect) -> Self {
        Self {
            id: WidgetId(usize::MAX),
            field: FieldId(usize::MAX),
            object,
            page: None,
            rect,
            appearance: Appearance::None,
            current_state: None,
            flags: AnnotationFlags::empty(),
        }
    }

    /// Appearance state names, empty for stateless widgets.
    pub fn states(&self) -> &[String] {
        match &self.appearance {
            Appearance::States(states) => states,
            _ => &[],
        }
    }

    /// The first appearance state that is not `Off`.
    ///
    /// For checkboxes this is the "checked" state; for radio kids it is the
    /// kid's export value.
    pub fn on_state(&self) -> Option<&str> {
        self.states()
            .iter()
            .map(String::as_str)
            .find(|s| *s != OFF_STATE)
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.states().iter().any(|s| s == state)
    }
}

/// Arena holding the complete field hierarchy of one document, with a
/// name index over every named node.
#[derive(Debug, Clone, Default)]
pub struct FieldTree {
    fields: Vec<Field>,
    widgets: Vec<Option<Widget>>,
    roots: Vec<FieldId>,
    index: HashMap<String, FieldId>,
    /// Document-wide `/DA` from the AcroForm dictionary.
    pub default_appearance: Option<String>,
}

impl FieldTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `field` below `parent` (or as a root), computing its
    /// fully-qualified name.
    ///
    /// # Errors
    ///
    /// [`FormError::DuplicateFieldName`] if a sibling already uses the same
    /// partial name, or the qualified name is already taken.
    pub fn add_field(
        &mut self,
        parent: Option<FieldId>,
        mut field: Field,
    ) -> Result<FieldId, FormError> {
        let parent_name = parent.map(|p| self.fields[p.0].name.as_str());
        field.name = match (parent_name, field.partial_name.as_deref()) {
            (Some(p), Some(n)) if !p.is_empty() => format!("{p}.{n}"),
            (_, Some(n)) => n.to_string(),
            (Some(p), None) => p.to_string(),
            (None, None) => String::new(),
        };

        if let Some(partial) = &field.partial_name {
            let siblings = match parent {
                Some(p) => &self.fields[p.0].children,
                None => &self.roots,
            };
            let clash = siblings
                .iter()
                .any(|s| self.fields[s.0].partial_name.as_ref() == Some(partial));
            if clash || self.index.contains_key(&field.name) {
                return Err(FormError::DuplicateFieldName(field.name));
            }
        }

        let id = FieldId(self.fields.len());
        field.id = id;
        field.parent = parent;
        if field.partial_name.is_some() && !field.name.is_empty() {
            self.index.insert(field.name.clone(), id);
        }
        self.fields.push(field);
        match parent {
            Some(p) => self.fields[p.0].children.push(id),
            None => self.roots.push(id),
        }
        Ok(id)
    }

    /// Attach `widget` to `field`.
    pub fn add_widget(&mut self, field: FieldId, mut widget: Widget) -> WidgetId {
        let id = WidgetId(self.widgets.len());
        widget.id = id;
        widget.field = field;
        self.widgets.push(Some(widget));
        self.fields[field.0].widgets.push(id);
        id
    }

    /// Detach and destroy a widget, returning it.
    pub fn remove_widget(&mut self, id: WidgetId) -> Option<Widget> {
        let widget = self.widgets.get_mut(id.0)?.take()?;
        self.fields[widget.field.0].widgets.retain(|w| *w != id);
        Some(widget)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn roots(&self) -> &[FieldId] {
        &self.roots
    }

    pub fn field(&self, id: FieldId) -> &Field {
        &self.fields[id.0]
    }

    pub fn field_mut(&mut self, id: FieldId) -> &mut Field {
        &mut self.fields[id.0]
    }

    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id.0).and_then(Option::as_ref)
    }

    pub fn widget_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Live widgets of a field, in declaration order.
    pub fn widgets_of(&self, id: FieldId) -> impl Iterator<Item = &Widget> {
        self.fields[id.0]
            .widgets
            .iter()
            .filter_map(|w| self.widget(*w))
    }

    /// Look up a field id by fully-qualified name.
    pub fn id_of(&self, name: &str) -> Option<FieldId> {
        self.index.get(name).copied()
    }

    pub fn qualified_name(&self, id: FieldId) -> &str {
        &self.fields[id.0].name
    }

    /// Look up a field by fully-qualified name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.id_of(name).map(|id| self.field(id))
    }

    /// The node itself followed by each ancestor up to its root.
    pub fn ancestors(&self, id: FieldId) -> impl Iterator<Item = &Field> {
        let mut next = Some(id);
        std::iter::from_fn(move || {
            let current = self.field(next?);
            next = current.parent;
            Some(current)
        })
    }

    /// Resolve an inheritable attribute: the first node on the path from
    /// `id` to the root for which `select` yields a value.
    pub fn inherited<'a, T: ?Sized>(
        &'a self,
        id: FieldId,
        select: impl Fn(&'a Field) -> Option<&'a T>,
    ) -> Option<&'a T> {
        self.ancestors(id).find_map(select)
    }

    /// Bitwise OR of the node's own flags and all ancestors' flags.
    pub fn effective_flags(&self, id: FieldId) -> FieldFlags {
        self.ancestors(id)
            .filter_map(|f| f.flags)
            .fold(FieldFlags::empty(), |acc, f| acc | f)
    }

    pub fn effective_type(&self, id: FieldId) -> Option<FieldType> {
        self.ancestors(id).find_map(|f| f.field_type)
    }

    /// Current value, inherited from ancestors when not set on the node.
    pub fn value(&self, id: FieldId) -> Option<&FieldValue> {
        self.inherited(id, |f| f.value.as_ref())
    }

    pub fn default_value(&self, id: FieldId) -> Option<&FieldValue> {
        self.inherited(id, |f| f.default_value.as_ref())
    }

    /// Default appearance string, falling back to the AcroForm's `/DA`.
    pub fn default_appearance(&self, id: FieldId) -> Option<&str> {
        self.inherited(id, |f| f.default_appearance.as_deref())
            .or(self.default_appearance.as_deref())
    }

    pub fn quadding(&self, id: FieldId) -> i64 {
        self.ancestors(id).find_map(|f| f.quadding).unwrap_or(0)
    }

    /// All field ids in hierarchy pre-order (children after their parent).
    pub fn pre_order(&self) -> Vec<FieldId> {
        let mut out = Vec::with_capacity(self.fields.len());
        let mut stack: Vec<FieldId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.fields[id.0].children.iter().rev().copied());
        }
        out
    }

    /// Terminal fields in hierarchy pre-order.
    pub fn terminal_fields(&self) -> impl Iterator<Item = &Field> {
        self.pre_order()
            .into_iter()
            .map(|id| self.field(id))
            .filter(|f| f.is_terminal())
    }
}
