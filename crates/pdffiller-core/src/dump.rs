//! Flat, read-only projection of a [`FieldTree`].

use crate::value::{radio_exports, radio_options};
use crate::{FieldFlags, FieldId, FieldKind, FieldTree, FieldValue, OFF_STATE};

/// One dumped field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldRecord {
    /// Fully-qualified name.
    pub name: String,
    /// `None` for a group node that carries a value of its own.
    pub kind: Option<FieldKind>,
    /// Current value as a user would type it back in: the export value for
    /// radio groups, the state name for checkboxes.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub value: Option<FieldValue>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub default_value: Option<FieldValue>,
    /// Accepted values: option exports for choices and radio groups,
    /// appearance states (`Off` first) for checkboxes.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub options: Vec<String>,
    pub read_only: bool,
    pub required: bool,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub max_len: Option<u32>,
    /// 1-based page number of the first widget.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub page: Option<usize>,
}

/// List every terminal field, plus any group node with its own value, in
/// hierarchy pre-order.
pub fn dump(tree: &FieldTree) -> Vec<FieldRecord> {
    tree.pre_order()
        .into_iter()
        .filter(|id| {
            let field = tree.field(*id);
            field.is_terminal() || field.value.is_some()
        })
        .map(|id| record(tree, id))
        .collect()
}

fn record(tree: &FieldTree, id: FieldId) -> FieldRecord {
    let field = tree.field(id);
    let flags = tree.effective_flags(id);
    let (value, default_value, options) = match field.kind {
        Some(FieldKind::RadioGroup) => (
            tree.value(id).map(|v| radio_display(tree, id, v)),
            tree.default_value(id).map(|v| radio_display(tree, id, v)),
            match radio_options(tree, id) {
                opts if opts.is_empty() => field.options.iter().map(|o| o.export.clone()).collect(),
                opts => opts,
            },
        ),
        Some(FieldKind::CheckBox) => (
            tree.value(id).cloned(),
            tree.default_value(id).cloned(),
            checkbox_states(tree, id),
        ),
        Some(kind) if kind.is_choice() => (
            tree.value(id).cloned(),
            tree.default_value(id).cloned(),
            field.options.iter().map(|o| o.export.clone()).collect(),
        ),
        _ => (
            tree.value(id).cloned(),
            tree.default_value(id).cloned(),
            Vec::new(),
        ),
    };

    FieldRecord {
        name: field.name.clone(),
        kind: field.kind,
        value,
        default_value,
        options,
        read_only: flags.contains(FieldFlags::READ_ONLY),
        required: flags.contains(FieldFlags::REQUIRED),
        max_len: tree.inherited(id, |f| f.max_len.as_ref()).copied(),
        page: tree
            .widgets_of(id)
            .find_map(|w| w.page)
            .map(|p| p.index + 1),
    }
}

/// Map a radio state name to the export value the caller would use.
fn radio_display(tree: &FieldTree, id: FieldId, value: &FieldValue) -> FieldValue {
    let FieldValue::State(state) = value else {
        return value.clone();
    };
    if state == OFF_STATE {
        return value.clone();
    }
    tree.widgets_of(id)
        .zip(radio_exports(tree, id))
        .find(|(w, _)| w.on_state() == Some(state.as_str()))
        .and_then(|(_, (_, export))| export)
        .or_else(|| {
            // Widgets gone after flattening: `/Opt` states are kid ordinals.
            let index: usize = state.parse().ok()?;
            tree.field(id).options.get(index).map(|o| o.export.clone())
        })
        .map(FieldValue::State)
        .unwrap_or_else(|| value.clone())
}

/// Appearance states of all widgets of a checkbox, `Off` first.
fn checkbox_states(tree: &FieldTree, id: FieldId) -> Vec<String> {
    let mut states = vec![OFF_STATE.to_string()];
    for widget in tree.widgets_of(id) {
        for state in widget.states() {
            if !states.contains(state) {
                states.push(state.clone());
            }
        }
    }
    if states.len() == 1 {
        states.push("On".to_string());
    }
    states
}
