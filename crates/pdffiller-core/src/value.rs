//! Conversion of caller-supplied values into field state.
//!
//! [`resolve_value`] is the pure half of the value applier: it validates an
//! [`InputValue`] against a field's kind and computes the new `/V` together
//! with the appearance state each widget must switch to. Writing the result
//! into the object graph is the backend's job.

use std::fmt;

use crate::{FieldFlags, FieldId, FieldKind, FieldTree, FieldValue, OFF_STATE, WidgetId};

/// A value supplied by the caller for one field name.
///
/// Decoded from JSON or YAML scalars and string lists; `null` clears the
/// field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum InputValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl InputValue {
    /// Stringify a scalar; `None` for lists.
    pub fn as_scalar_string(&self) -> Option<String> {
        match self {
            InputValue::Null => Some(String::new()),
            InputValue::Bool(b) => Some(b.to_string()),
            InputValue::Number(n) => Some(format_number(*n)),
            InputValue::Text(s) => Some(s.clone()),
            InputValue::List(_) => None,
        }
    }

    /// Interpret as a checkbox toggle: `Some(true)` for "On"/1/true-like
    /// inputs, `Some(false)` for "Off"/0/false-like inputs, `None` otherwise.
    pub fn truthiness(&self) -> Option<bool> {
        match self {
            InputValue::Null => Some(false),
            InputValue::Bool(b) => Some(*b),
            InputValue::Number(n) if *n == 1.0 => Some(true),
            InputValue::Number(n) if *n == 0.0 => Some(false),
            InputValue::Number(_) | InputValue::List(_) => None,
            InputValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "on" | "yes" | "true" | "1" | "checked" | "x" => Some(true),
                "off" | "no" | "false" | "0" | "" | "unchecked" => Some(false),
                _ => None,
            },
        }
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        InputValue::Text(value.to_string())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        InputValue::Text(value)
    }
}

impl From<bool> for InputValue {
    fn from(value: bool) -> Self {
        InputValue::Bool(value)
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        InputValue::Number(value)
    }
}

impl From<i64> for InputValue {
    fn from(value: i64) -> Self {
        InputValue::Number(value as f64)
    }
}

impl From<Vec<String>> for InputValue {
    fn from(value: Vec<String>) -> Self {
        InputValue::List(value)
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputValue::List(items) => write!(f, "[{}]", items.join(", ")),
            InputValue::Null => f.write_str("null"),
            other => f.write_str(&other.as_scalar_string().unwrap_or_default()),
        }
    }
}

/// Integers print without a fractional part.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// The outcome of converting an input value for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// New field value (`/V`).
    pub value: FieldValue,
    /// New appearance state (`/AS`) per stateful widget.
    pub states: Vec<(WidgetId, String)>,
}

/// Validate `input` for field `id` and compute the resulting state.
///
/// Returns a human-readable reason when the value does not fit the field.
pub fn resolve_value(
    tree: &FieldTree,
    id: FieldId,
    input: &InputValue,
) -> Result<Resolution, String> {
    let field = tree.field(id);
    let Some(kind) = field.kind else {
        return Err("not a terminal field".to_string());
    };
    match kind {
        FieldKind::Text => resolve_text(input),
        FieldKind::CheckBox => resolve_checkbox(tree, id, input),
        FieldKind::RadioGroup => resolve_radio(tree, id, input),
        FieldKind::ChoiceList | FieldKind::ChoiceCombo => resolve_choice(tree, id, kind, input),
        FieldKind::PushButton | FieldKind::Signature => {
            Err(format!("{kind} fields do not accept values"))
        }
    }
}

fn resolve_text(input: &InputValue) -> Result<Resolution, String> {
    let text = input
        .as_scalar_string()
        .ok_or_else(|| "a text field expects a scalar value".to_string())?;
    Ok(Resolution {
        value: FieldValue::Text(text),
        states: Vec::new(),
    })
}

/// The on-state name of a checkbox: the first widget's non-`Off` state, or
/// `On` when no widget declares one.
pub fn checkbox_on_state(tree: &FieldTree, id: FieldId) -> String {
    tree.widgets_of(id)
        .find_map(|w| w.on_state())
        .unwrap_or("On")
        .to_string()
}

fn resolve_checkbox(
    tree: &FieldTree,
    id: FieldId,
    input: &InputValue,
) -> Result<Resolution, String> {
    // A literal state name selects only the widgets that declare it.
    if let InputValue::Text(name) = input {
        let declares = tree
            .widgets_of(id)
            .any(|w| w.has_state(name) && name != OFF_STATE);
        if declares {
            let states = tree
                .widgets_of(id)
                .filter(|w| !w.states().is_empty())
                .map(|w| {
                    let state = if w.has_state(name) { name } else { OFF_STATE };
                    (w.id, state.to_string())
                })
                .collect();
            return Ok(Resolution {
                value: FieldValue::State(name.clone()),
                states,
            });
        }
    }

    let checked = input.truthiness().ok_or_else(|| {
        format!("'{input}' is not a checkbox value (expected On/Off, 1/0, true/false)")
    })?;
    let on_state = checkbox_on_state(tree, id);
    let states = tree
        .widgets_of(id)
        .filter(|w| !w.states().is_empty())
        .map(|w| {
            let state = match (checked, w.has_state(&on_state)) {
                (false, _) => OFF_STATE,
                (true, true) => on_state.as_str(),
                (true, false) => w.on_state().unwrap_or(on_state.as_str()),
            };
            (w.id, state.to_string())
        })
        .collect();
    let value = if checked { on_state } else { OFF_STATE.to_string() };
    Ok(Resolution {
        value: FieldValue::State(value),
        states,
    })
}

/// Export value of each radio kid, in widget order.
///
/// With an `/Opt` array the export value of kid *i* is `Opt[i]`; otherwise
/// it is the kid's on-state name. Kids without an on-state have none.
pub fn radio_exports(tree: &FieldTree, id: FieldId) -> Vec<(WidgetId, Option<String>)> {
    let field = tree.field(id);
    tree.widgets_of(id)
        .enumerate()
        .map(|(i, w)| {
            let export = match field.options.get(i) {
                Some(opt) if w.on_state().is_some() => Some(opt.export.clone()),
                _ => w.on_state().map(str::to_string),
            };
            (w.id, export)
        })
        .collect()
}

/// Distinct radio export values in kid order.
pub fn radio_options(tree: &FieldTree, id: FieldId) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for (_, export) in radio_exports(tree, id) {
        if let Some(export) = export {
            if !out.contains(&export) {
                out.push(export);
            }
        }
    }
    out
}

fn resolve_radio(tree: &FieldTree, id: FieldId, input: &InputValue) -> Result<Resolution, String> {
    let exports = radio_exports(tree, id);
    let options = radio_options(tree, id);

    let wanted: Option<String> = match input {
        InputValue::Null | InputValue::Bool(false) => None,
        InputValue::Text(s) if s.is_empty() || s == OFF_STATE => None,
        InputValue::Text(s) => {
            let by_state = tree
                .widgets_of(id)
                .zip(&exports)
                .find(|(w, _)| w.on_state() == Some(s.as_str()))
                .and_then(|(_, (_, export))| export.clone());
            if options.contains(s) {
                Some(s.clone())
            } else if by_state.is_some() {
                by_state
            } else {
                return Err(format!(
                    "'{s}' matches no radio option (expected one of: {})",
                    options.join(", ")
                ));
            }
        }
        InputValue::Number(n) => {
            let text = format_number(*n);
            if options.contains(&text) {
                Some(text)
            } else if n.fract() == 0.0 && *n >= 0.0 && (*n as usize) < options.len() {
                Some(options[*n as usize].clone())
            } else {
                return Err(format!(
                    "{text} is neither a radio option nor an option index below {}",
                    options.len()
                ));
            }
        }
        InputValue::Bool(true) | InputValue::List(_) => {
            return Err(format!("'{input}' is not a radio option"));
        }
    };

    let unison = tree
        .effective_flags(id)
        .contains(FieldFlags::RADIOS_IN_UNISON);
    let mut selected_state: Option<String> = None;
    let mut states = Vec::with_capacity(exports.len());
    for (widget_id, export) in &exports {
        let Some(widget) = tree.widget(*widget_id) else {
            continue;
        };
        let matches = wanted.is_some() && export.as_ref() == wanted.as_ref();
        let select = matches && (selected_state.is_none() || unison);
        let state = match (select, widget.on_state()) {
            (true, Some(on)) => {
                selected_state.get_or_insert_with(|| on.to_string());
                on
            }
            _ => OFF_STATE,
        };
        states.push((*widget_id, state.to_string()));
    }

    Ok(Resolution {
        value: FieldValue::State(selected_state.unwrap_or_else(|| OFF_STATE.to_string())),
        states,
    })
}

fn resolve_choice(
    tree: &FieldTree,
    id: FieldId,
    kind: FieldKind,
    input: &InputValue,
) -> Result<Resolution, String> {
    let field = tree.field(id);
    let flags = tree.effective_flags(id);
    let editable = kind == FieldKind::ChoiceCombo && flags.contains(FieldFlags::EDIT);

    let requested: Vec<String> = match input {
        InputValue::Null => Vec::new(),
        InputValue::List(items) => items.clone(),
        other => {
            let text = other.as_scalar_string().unwrap_or_default();
            if text.is_empty() { Vec::new() } else { vec![text] }
        }
    };
    if requested.len() > 1 && !flags.contains(FieldFlags::MULTI_SELECT) {
        return Err(format!(
            "{} values given but the field does not allow multiple selection",
            requested.len()
        ));
    }

    let unknown: Vec<&str> = requested
        .iter()
        .filter(|r| !field.options.iter().any(|o| &o.export == *r))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() && !editable {
        let exports: Vec<&str> = field.options.iter().map(|o| o.export.as_str()).collect();
        return Err(format!(
            "'{}' not among the options (expected one of: {})",
            unknown.join(", "),
            exports.join(", ")
        ));
    }

    // Declared option order, not input order; free text of an editable combo
    // goes last.
    let mut selected: Vec<String> = field
        .options
        .iter()
        .filter(|o| requested.contains(&o.export))
        .map(|o| o.export.clone())
        .collect();
    for free in unknown {
        if !selected.iter().any(|s| s == free) {
            selected.push(free.to_string());
        }
    }

    Ok(Resolution {
        value: FieldValue::Choices(selected),
        states: Vec::new(),
    })
}
