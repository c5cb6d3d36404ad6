//! Shared helpers for CLI integration tests.

#![allow(dead_code)]

use std::io::Write;

use assert_cmd::Command;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

pub fn cmd() -> Command {
    Command::cargo_bin("pdffiller").unwrap()
}

fn box_stream(doc: &mut Document, width: i64, height: i64) -> ObjectId {
    doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        },
        format!("0 0 1 rg 0 0 {width} {height} re f").into_bytes(),
    ))
}

fn states(doc: &mut Document, on: &str) -> Dictionary {
    let on_stream = box_stream(doc, 20, 20);
    let off_stream = box_stream(doc, 20, 20);
    let mut normal = Dictionary::new();
    normal.set(on, Object::Reference(on_stream));
    normal.set("Off", Object::Reference(off_stream));
    dictionary! { "N" => normal }
}

/// One page with `name` (text, max length 20), `subscribe` (checkbox) and
/// `plan` (radio group `A`/`B`, currently `A`).
pub fn sample_form() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let page_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let name_ap = box_stream(&mut doc, 200, 20);
    let name = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "P" => page_id,
        "FT" => "Tx",
        "T" => Object::string_literal("name"),
        "MaxLen" => 20,
        "Rect" => vec![50.into(), 700.into(), 250.into(), 720.into()],
        "DA" => Object::string_literal("/Helv 12 Tf 0 g"),
        "AP" => dictionary! { "N" => Object::Reference(name_ap) },
        "F" => 4,
    });
    let subscribe_ap = states(&mut doc, "On");
    let subscribe = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "P" => page_id,
        "FT" => "Btn",
        "T" => Object::string_literal("subscribe"),
        "V" => "Off",
        "AS" => "Off",
        "Rect" => vec![50.into(), 650.into(), 70.into(), 670.into()],
        "AP" => subscribe_ap,
        "F" => 4,
    });
    let plan = doc.new_object_id();
    let mut kids = Vec::new();
    for (state, x) in [("A", 50i64), ("B", 100i64)] {
        let ap = states(&mut doc, state);
        kids.push(doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "P" => page_id,
            "Parent" => Object::Reference(plan),
            "AS" => if state == "A" { "A" } else { "Off" },
            "Rect" => vec![x.into(), 600.into(), (x + 20).into(), 620.into()],
            "AP" => ap,
            "F" => 4,
        }));
    }
    doc.objects.insert(
        plan,
        Object::Dictionary(dictionary! {
            "FT" => "Btn",
            "T" => Object::string_literal("plan"),
            "Ff" => Object::Integer(1 << 15),
            "V" => "A",
            "Kids" => kids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        }),
    );

    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        b"BT /F1 12 Tf 72 760 Td (Application form) Tj ET".to_vec(),
    ));
    let mut annots = vec![Object::Reference(name), Object::Reference(subscribe)];
    annots.extend(kids.iter().map(|id| Object::Reference(*id)));
    doc.objects.insert(
        page_id,
        Object::Dictionary(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
            "Annots" => annots,
        }),
    );
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => dictionary! {
            "Fields" => vec![
                Object::Reference(name),
                Object::Reference(subscribe),
                Object::Reference(plan),
            ],
            "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
            "DR" => dictionary! {
                "Font" => dictionary! { "Helv" => Object::Reference(font_id) },
            },
        },
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

pub fn write_temp(bytes: &[u8], suffix: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    f.write_all(bytes).unwrap();
    f.flush().unwrap();
    f
}

pub fn sample_file() -> tempfile::NamedTempFile {
    write_temp(&sample_form(), ".pdf")
}

/// Annotation count of the first page.
pub fn annot_count(path: &std::path::Path) -> usize {
    let doc = Document::load_mem(&std::fs::read(path).unwrap()).unwrap();
    let page_id = *doc.get_pages().values().next().unwrap();
    doc.get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"Annots").ok())
        .and_then(|annots| annots.as_array().ok())
        .map_or(0, Vec::len)
}
