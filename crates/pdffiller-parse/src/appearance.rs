//! Appearance stream synthesis for variable-text fields.
//!
//! Builds a form XObject that draws a text or combo field value using the
//! font, size and color from the field's `/DA` string. Fonts are taken from
//! the AcroForm `/DR` resources when defined there, otherwise from the
//! standard Type1 set.

use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use pdffiller_core::{Rect, fmt_number};

use crate::fonts::StandardFont;
use crate::graph::{self, get, get_dict, get_name};

/// Inner padding between the widget border and the text.
const PADDING: f64 = 2.0;
/// Largest size chosen for auto-sized (`0 Tf`) text.
const MAX_AUTO_SIZE: f64 = 12.0;
const MIN_AUTO_SIZE: f64 = 4.0;
const LINE_SPACING: f64 = 1.15;

/// Parsed `/DA` default appearance string.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultAppearance {
    /// Font resource name without the leading slash.
    pub font: String,
    /// Font size; `0` selects auto-sizing.
    pub size: f64,
    /// The color-setting operators (`g`, `rg` or `k`) with their operands.
    pub color: String,
}

impl DefaultAppearance {
    /// Parse a `/DA` string, keeping the last `Tf` and color operators.
    pub fn parse(da: &str) -> Self {
        let mut font = String::from("Helv");
        let mut size = 0.0;
        let mut color = String::from("0 g");
        let mut operands: Vec<&str> = Vec::new();

        for token in da.split_whitespace() {
            match token {
                "Tf" => {
                    if let [.., name, sz] = operands.as_slice() {
                        if let Some(name) = name.strip_prefix('/') {
                            font = name.to_string();
                        }
                        size = sz.parse().unwrap_or(0.0);
                    }
                    operands.clear();
                }
                "g" | "rg" | "k" => {
                    let arity = match token {
                        "g" => 1,
                        "rg" => 3,
                        _ => 4,
                    };
                    if operands.len() >= arity {
                        let args = &operands[operands.len() - arity..];
                        color = format!("{} {token}", args.join(" "));
                    }
                    operands.clear();
                }
                _ if token.starts_with('/') || token.parse::<f64>().is_ok() => operands.push(token),
                _ => operands.clear(),
            }
        }

        Self { font, size, color }
    }
}

/// How a value is laid out inside its widget.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextLayout {
    /// `/Q`: 0 left, 1 centered, 2 right.
    pub quadding: i64,
    pub multiline: bool,
    pub password: bool,
    /// Cell count for comb fields.
    pub comb: Option<u32>,
}

/// Build a form XObject showing `text` in a widget of the given rectangle.
///
/// The stream is not added to the document; the caller decides whether it
/// replaces an existing appearance or becomes a new object.
pub fn text_appearance(
    doc: &Document,
    da: &str,
    text: &str,
    rect: Rect,
    layout: TextLayout,
) -> Stream {
    let appearance = DefaultAppearance::parse(da);
    let (font_object, metrics) = resolve_font(doc, &appearance.font);
    let width = rect.width().abs();
    let height = rect.height().abs();

    let shown: String = if layout.password {
        "*".repeat(text.chars().count())
    } else {
        text.to_string()
    };

    let mut content = String::from("/Tx BMC\n");
    if !shown.is_empty() {
        let size = if appearance.size > 0.0 {
            appearance.size
        } else {
            auto_size(&metrics, &shown, width, height, layout.multiline)
        };

        content.push_str("q\n");
        content.push_str(&format!(
            "1 1 {} {} re W n\n",
            fmt_number(width - 2.0),
            fmt_number(height - 2.0)
        ));
        content.push_str("BT\n");
        content.push_str(&format!("/{} {} Tf\n", appearance.font, fmt_number(size)));
        content.push_str(&appearance.color);
        content.push('\n');

        if layout.multiline {
            let mut y = height - PADDING - size * 0.78;
            for line in wrap_lines(&metrics, &shown, size, width - 2.0 * PADDING) {
                let encoded = win_ansi_bytes(&line);
                let x = line_x(&metrics, &encoded, size, width, layout.quadding);
                show_at(&mut content, x, y, &encoded);
                y -= size * LINE_SPACING;
            }
        } else if let Some(cells) = layout.comb.filter(|n| *n > 0) {
            let cell = width / f64::from(cells);
            let y = baseline(size, height);
            for (i, ch) in shown.chars().take(cells as usize).enumerate() {
                let encoded = win_ansi_bytes(&ch.to_string());
                let x = cell * i as f64 + (cell - metrics.text_width(&encoded, size)) / 2.0;
                show_at(&mut content, x, y, &encoded);
            }
        } else {
            let encoded = win_ansi_bytes(&shown);
            let x = line_x(&metrics, &encoded, size, width, layout.quadding);
            show_at(&mut content, x, baseline(size, height), &encoded);
        }

        content.push_str("ET\nQ\n");
    }
    content.push_str("EMC\n");

    let mut fonts = Dictionary::new();
    fonts.set(appearance.font.as_str(), font_object);
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![
                0.into(),
                0.into(),
                Object::Real(width as f32),
                Object::Real(height as f32),
            ],
            "Resources" => dictionary! { "Font" => fonts },
        },
        content.into_bytes(),
    )
}

/// Find `name` in the AcroForm `/DR /Font` resources, falling back to a
/// standard font dictionary. Returns the resource entry and the metrics used
/// for layout.
fn resolve_font(doc: &Document, name: &str) -> (Object, StandardFont) {
    let defined = graph::acroform(doc)
        .and_then(|form| get_dict(doc, form, b"DR"))
        .and_then(|dr| get_dict(doc, dr, b"Font"))
        .and_then(|fonts| fonts.get(name.as_bytes()).ok());

    if let Some(entry) = defined {
        let metrics = match graph::resolve(doc, entry) {
            Object::Dictionary(font) => get_name(doc, font, b"BaseFont")
                .and_then(|base| StandardFont::from_name(&base)),
            _ => None,
        }
        .or_else(|| StandardFont::from_name(name))
        .unwrap_or(StandardFont::Helvetica);
        return (entry.clone(), metrics);
    }

    let font = StandardFont::from_name(name).unwrap_or(StandardFont::Helvetica);
    let mut dict = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
    };
    if font.is_text_font() {
        dict.set("Encoding", "WinAnsiEncoding");
    }
    (Object::Dictionary(dict), font)
}

fn auto_size(metrics: &StandardFont, text: &str, width: f64, height: f64, multiline: bool) -> f64 {
    let by_height = if multiline {
        MAX_AUTO_SIZE
    } else {
        (height - 2.0 * PADDING) / LINE_SPACING
    };
    let mut size = by_height.min(MAX_AUTO_SIZE);
    if !multiline {
        let units = metrics.text_width(&win_ansi_bytes(text), 1.0);
        if units > 0.0 {
            size = size.min((width - 2.0 * PADDING) / units);
        }
    }
    size.max(MIN_AUTO_SIZE)
}

fn baseline(size: f64, height: f64) -> f64 {
    ((height - size * 0.78) / 2.0).max(PADDING)
}

fn line_x(metrics: &StandardFont, encoded: &[u8], size: f64, width: f64, quadding: i64) -> f64 {
    let text_width = metrics.text_width(encoded, size);
    match quadding {
        1 => (width - text_width) / 2.0,
        2 => width - PADDING - text_width,
        _ => PADDING,
    }
}

fn show_at(content: &mut String, x: f64, y: f64, encoded: &[u8]) {
    content.push_str(&format!(
        "1 0 0 1 {} {} Tm\n({}) Tj\n",
        fmt_number(x),
        fmt_number(y),
        escape_literal(encoded)
    ));
}

/// Greedy word wrap honoring explicit line breaks.
fn wrap_lines(metrics: &StandardFont, text: &str, size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split(['\n', '\r']) {
        let mut line = String::new();
        for word in paragraph.split(' ') {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            let too_wide = metrics.text_width(&win_ansi_bytes(&candidate), size) > max_width;
            if !line.is_empty() && too_wide {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }
    lines
}

/// Encode text for a simple font, replacing unmappable characters with `?`.
fn win_ansi_bytes(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        let (bytes, _, unmappable) = encoding_rs::WINDOWS_1252.encode(ch.encode_utf8(&mut buf));
        if unmappable {
            out.push(b'?');
        } else {
            out.extend_from_slice(&bytes);
        }
    }
    out
}

/// Render bytes as the body of a literal string operand.
fn escape_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for b in bytes {
        match b {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(char::from(*b));
            }
            b'\r' => out.push_str("\\r"),
            b'\n' => out.push_str("\\n"),
            0x20..=0x7E => out.push(char::from(*b)),
            _ => out.push_str(&format!("\\{b:03o}")),
        }
    }
    out
}

/// The `/AP /N` stream object id of a widget, when it has a single one.
pub(crate) fn normal_stream_id(doc: &Document, widget: &Dictionary) -> Option<lopdf::ObjectId> {
    let ap = get_dict(doc, widget, b"AP")?;
    match ap.get(b"N").ok()? {
        Object::Reference(id) if matches!(get(doc, ap, b"N"), Some(Object::Stream(_))) => Some(*id),
        _ => None,
    }
}
