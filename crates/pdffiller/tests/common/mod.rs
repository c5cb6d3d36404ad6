//! Form documents built with lopdf for integration tests.

#![allow(dead_code)]

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

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

/// Serialize a one-page document whose AcroForm lists `fields` and whose
/// page lists `annots`.
fn finish(doc: Document, fields: Vec<ObjectId>, annots: Vec<ObjectId>) -> Vec<u8> {
    finish_pages(doc, fields, vec![annots])
}

/// Serialize a document with one page per entry of `pages`.
fn finish_pages(mut doc: Document, fields: Vec<ObjectId>, pages: Vec<Vec<ObjectId>>) -> Vec<u8> {
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let mut page_ids = Vec::with_capacity(pages.len());
    for annots in &pages {
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            b"BT /F1 12 Tf 72 760 Td (Application form) Tj ET".to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
            "Annots" => annots.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        });
        for id in annots {
            if let Ok(Object::Dictionary(annot)) = doc.get_object_mut(*id) {
                annot.set("P", Object::Reference(page_id));
            }
        }
        page_ids.push(page_id);
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => Object::Integer(page_ids.len() as i64),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => dictionary! {
            "Fields" => fields.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
            "DR" => dictionary! {
                "Font" => dictionary! { "Helv" => Object::Reference(font_id) },
            },
        },
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("serialize test document");
    buf
}

/// `name` (text), `subscribe` (checkbox, on-state `On`) and `plan` (radio
/// group with kids `A` and `B`, default `A`).
pub fn sample_form() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");

    let name_ap = box_stream(&mut doc, 200, 20);
    let name = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => Object::string_literal("name"),
        "Rect" => vec![50.into(), 700.into(), 250.into(), 720.into()],
        "DA" => Object::string_literal("/Helv 12 Tf 0 g"),
        "AP" => dictionary! { "N" => Object::Reference(name_ap) },
        "F" => 4,
    });

    let subscribe_ap = states(&mut doc, "On");
    let subscribe = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
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
            "DV" => "A",
            "Kids" => kids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        }),
    );

    let mut annots = vec![name, subscribe];
    annots.extend(&kids);
    finish(doc, vec![name, subscribe, plan], annots)
}

/// A two-level hierarchy: `applicant.first`, `applicant.last` and a
/// `country` combo box with three options.
pub fn nested_form() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");

    let applicant = doc.new_object_id();
    let mut kids = Vec::new();
    for (part, y) in [("first", 700i64), ("last", 670i64)] {
        kids.push(doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "Parent" => Object::Reference(applicant),
            "T" => Object::string_literal(part),
            "Rect" => vec![50.into(), y.into(), 250.into(), (y + 20).into()],
            "F" => 4,
        }));
    }
    doc.objects.insert(
        applicant,
        Object::Dictionary(dictionary! {
            "T" => Object::string_literal("applicant"),
            "FT" => "Tx",
            "DA" => Object::string_literal("/Helv 10 Tf 0 g"),
            "Kids" => kids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        }),
    );

    let country = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Ch",
        "Ff" => Object::Integer(1 << 17),
        "T" => Object::string_literal("country"),
        "Opt" => vec![
            Object::Array(vec![Object::string_literal("de"), Object::string_literal("Germany")]),
            Object::Array(vec![Object::string_literal("fr"), Object::string_literal("France")]),
            Object::Array(vec![Object::string_literal("it"), Object::string_literal("Italy")]),
        ],
        "Rect" => vec![50.into(), 600.into(), 250.into(), 620.into()],
        "F" => 4,
    });

    let mut annots = kids.clone();
    annots.push(country);
    finish(doc, vec![applicant, country], annots)
}

/// A text field `name` with a widget on each of two pages, plus a third
/// widget on the first page that only names the field through `/Parent`.
pub fn split_form() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let field = doc.new_object_id();
    let mut widgets = Vec::new();
    for y in [700i64, 700, 500] {
        let ap = box_stream(&mut doc, 200, 20);
        widgets.push(doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "Parent" => Object::Reference(field),
            "Rect" => vec![50.into(), y.into(), 250.into(), (y + 20).into()],
            "AP" => dictionary! { "N" => Object::Reference(ap) },
            "F" => 4,
        }));
    }
    doc.objects.insert(
        field,
        Object::Dictionary(dictionary! {
            "FT" => "Tx",
            "T" => Object::string_literal("name"),
            "Kids" => vec![Object::Reference(widgets[0]), Object::Reference(widgets[1])],
        }),
    );
    finish_pages(
        doc,
        vec![field],
        vec![vec![widgets[0], widgets[2]], vec![widgets[1]]],
    )
}

/// Page content length and annotation count of the first page.
pub fn page_summary(bytes: &[u8]) -> (usize, usize) {
    page_summaries(bytes)[0]
}

/// Content length and annotation count of every page, in page order.
pub fn page_summaries(bytes: &[u8]) -> Vec<(usize, usize)> {
    let doc = Document::load_mem(bytes).expect("reload output");
    doc.get_pages()
        .values()
        .map(|page_id| {
            let content = doc.get_page_content(*page_id).expect("page content");
            let annots = doc
                .get_dictionary(*page_id)
                .ok()
                .and_then(|page| page.get(b"Annots").ok())
                .and_then(|annots| annots.as_array().ok())
                .map_or(0, Vec::len);
            (content.len(), annots)
        })
        .collect()
}
