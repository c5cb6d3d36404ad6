//! Typed read/write views over the lopdf object graph.
//!
//! Every lookup follows indirect references, so callers see the same value
//! whether a writer stored an entry inline or as `n 0 R`.

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use pdffiller_core::{ObjectRef, Rect};

use crate::error::BackendError;

/// Reference chains longer than this are treated as broken.
const MAX_REFERENCE_HOPS: usize = 16;

/// Follow `obj` through indirect references.
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    let mut current = obj;
    for _ in 0..MAX_REFERENCE_HOPS {
        match current {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(next) => current = next,
                Err(_) => return current,
            },
            _ => return current,
        }
    }
    current
}

/// Look up `key` in `dict`, resolving references.
pub fn get<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().map(|obj| resolve(doc, obj))
}

pub fn get_dict<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    match get(doc, dict, key)? {
        Object::Dictionary(d) => Some(d),
        Object::Stream(s) => Some(&s.dict),
        _ => None,
    }
}

pub fn get_array<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a [Object]> {
    match get(doc, dict, key)? {
        Object::Array(items) => Some(items),
        _ => None,
    }
}

/// A name entry, as a UTF-8 string.
pub fn get_name(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match get(doc, dict, key)? {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// A text string entry (or a name, which some writers use instead).
pub fn get_text(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    object_text(get(doc, dict, key)?)
}

pub fn get_int(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<i64> {
    match get(doc, dict, key)? {
        Object::Integer(i) => Some(*i),
        Object::Real(f) => Some(*f as i64),
        _ => None,
    }
}

/// A 4-number rectangle entry such as `/Rect` or `/BBox`.
pub fn get_rect(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<Rect> {
    let items = get_array(doc, dict, key)?;
    rect_from_array(doc, items).ok()
}

/// A numeric array entry such as `/Matrix`.
pub fn get_numbers(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<Vec<f64>> {
    get_array(doc, dict, key)?
        .iter()
        .map(|item| object_to_f64(resolve(doc, item)).ok())
        .collect()
}

/// Extract a [`Rect`] from a lopdf array of 4 numbers `[x0, y0, x1, y1]`.
pub fn rect_from_array(doc: &Document, array: &[Object]) -> Result<Rect, BackendError> {
    if array.len() != 4 {
        return Err(BackendError::Parse(format!(
            "expected 4-element array for box, got {}",
            array.len()
        )));
    }
    let x0 = object_to_f64(resolve(doc, &array[0]))?;
    let y0 = object_to_f64(resolve(doc, &array[1]))?;
    let x1 = object_to_f64(resolve(doc, &array[2]))?;
    let y1 = object_to_f64(resolve(doc, &array[3]))?;
    Ok(Rect::new(x0, y0, x1, y1))
}

/// Convert a lopdf numeric object (Integer or Real) to f64.
pub fn object_to_f64(obj: &Object) -> Result<f64, BackendError> {
    match obj {
        Object::Integer(i) => Ok(*i as f64),
        Object::Real(f) => Ok(*f as f64),
        _ => Err(BackendError::Parse(format!("expected number, got {obj:?}"))),
    }
}

/// Text content of a string or name object.
pub fn object_text(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE or UTF-8 with a byte order mark,
/// otherwise the single-byte document encoding.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        String::from_utf8_lossy(rest).into_owned()
    } else {
        // PDFDocEncoding agrees with Windows-1252 on printable ASCII and Latin-1.
        let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
        text.into_owned()
    }
}

/// Encode `text` as a PDF text string object.
///
/// Latin-1 text is written as a literal single-byte string; anything else as
/// UTF-16BE with a byte order mark.
pub fn encode_text_string(text: &str) -> Object {
    let (bytes, _, unmappable) = encoding_rs::WINDOWS_1252.encode(text);
    // 0x80..0x9F differ between Windows-1252 and PDFDocEncoding.
    if !unmappable && !bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
        return Object::String(bytes.into_owned(), StringFormat::Literal);
    }
    let mut out = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(out, StringFormat::Hexadecimal)
}

pub fn to_object_ref(id: ObjectId) -> ObjectRef {
    ObjectRef::new(id.0, id.1)
}

pub fn to_object_id(r: ObjectRef) -> ObjectId {
    (r.id, r.generation)
}

/// Mutable dictionary of an indirect object (or a stream's dictionary).
pub fn dict_mut(doc: &mut Document, id: ObjectId) -> Result<&mut Dictionary, BackendError> {
    match doc.get_object_mut(id) {
        Ok(Object::Dictionary(dict)) => Ok(dict),
        Ok(Object::Stream(stream)) => Ok(&mut stream.dict),
        Ok(other) => Err(BackendError::Parse(format!(
            "object {} {} R is a {}, expected a dictionary",
            id.0,
            id.1,
            kind_name(other)
        ))),
        Err(e) => Err(BackendError::Parse(format!(
            "object {} {} R not found: {e}",
            id.0, id.1
        ))),
    }
}

pub fn dict<'a>(doc: &'a Document, id: ObjectId) -> Result<&'a Dictionary, BackendError> {
    match doc.get_object(id) {
        Ok(Object::Dictionary(dict)) => Ok(dict),
        Ok(Object::Stream(stream)) => Ok(&stream.dict),
        Ok(other) => Err(BackendError::Parse(format!(
            "object {} {} R is a {}, expected a dictionary",
            id.0,
            id.1,
            kind_name(other)
        ))),
        Err(e) => Err(BackendError::Parse(format!(
            "object {} {} R not found: {e}",
            id.0, id.1
        ))),
    }
}

pub(crate) fn kind_name(obj: &Object) -> &'static str {
    match obj {
        Object::Null => "null",
        Object::Boolean(_) => "boolean",
        Object::Integer(_) | Object::Real(_) => "number",
        Object::Name(_) => "name",
        Object::String(..) => "string",
        Object::Array(_) => "array",
        Object::Dictionary(_) => "dictionary",
        Object::Stream(_) => "stream",
        Object::Reference(_) => "reference",
    }
}

fn catalog_id(doc: &Document) -> Option<ObjectId> {
    match doc.trailer.get(b"Root").ok()? {
        Object::Reference(id) => Some(*id),
        _ => None,
    }
}

/// The document's `/AcroForm` dictionary, if any.
pub fn acroform(doc: &Document) -> Option<&Dictionary> {
    let catalog = dict(doc, catalog_id(doc)?).ok()?;
    get_dict(doc, catalog, b"AcroForm")
}

/// Mutable `/AcroForm` dictionary, whether stored inline in the catalog or
/// as its own object.
pub fn acroform_mut(doc: &mut Document) -> Option<&mut Dictionary> {
    let catalog_id = catalog_id(doc)?;
    let form_ref = match dict(doc, catalog_id).ok()?.get(b"AcroForm").ok()? {
        Object::Reference(id) => Some(*id),
        _ => None,
    };
    match form_ref {
        Some(id) => dict_mut(doc, id).ok(),
        None => match dict_mut(doc, catalog_id).ok()?.get_mut(b"AcroForm").ok()? {
            Object::Dictionary(form) => Some(form),
            _ => None,
        },
    }
}

/// Mutable view of the array stored under `key` in object `owner`,
/// following one level of indirection.
pub fn array_mut<'a>(
    doc: &'a mut Document,
    owner: ObjectId,
    key: &[u8],
) -> Option<&'a mut Vec<Object>> {
    let target = match dict(doc, owner).ok()?.get(key).ok()? {
        Object::Reference(id) => Some(*id),
        _ => None,
    };
    match target {
        Some(id) => match doc.get_object_mut(id).ok()? {
            Object::Array(items) => Some(items),
            _ => None,
        },
        None => match dict_mut(doc, owner).ok()?.get_mut(key).ok()? {
            Object::Array(items) => Some(items),
            _ => None,
        },
    }
}

/// Remove every `Reference(target)` from the array at `owner[key]`.
///
/// Returns `true` if anything was removed.
pub fn remove_reference(doc: &mut Document, owner: ObjectId, key: &[u8], target: ObjectId) -> bool {
    let Some(items) = array_mut(doc, owner, key) else {
        return false;
    };
    let before = items.len();
    items.retain(|item| !matches!(item, Object::Reference(id) if *id == target));
    items.len() != before
}

/// Look up `key` on a page, walking up the page tree via `/Parent`.
pub fn page_inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = page_id;
    for _ in 0..MAX_REFERENCE_HOPS * 4 {
        let node = dict(doc, current).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(resolve(doc, value));
        }
        current = match node.get(b"Parent").ok()? {
            Object::Reference(id) => *id,
            _ => return None,
        };
    }
    None
}
