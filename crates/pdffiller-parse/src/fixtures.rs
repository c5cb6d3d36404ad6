//! In-memory test documents.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::FormDocument;

/// A colored box appearance of the given size.
pub(crate) fn appearance_stream(doc: &mut Document, width: i64, height: i64) -> ObjectId {
    let content = format!("0 0 1 rg 0 0 {width} {height} re f");
    doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        },
        content.into_bytes(),
    ))
}

/// On/off appearance dictionary for a button widget.
pub(crate) fn state_appearances(doc: &mut Document, on: &str) -> Dictionary {
    let on_stream = appearance_stream(doc, 20, 20);
    let off_stream = appearance_stream(doc, 20, 20);
    let mut normal = Dictionary::new();
    normal.set(on, Object::Reference(on_stream));
    normal.set("Off", Object::Reference(off_stream));
    dictionary! { "N" => normal }
}

/// Wrap `fields` in a one-page document with an AcroForm.
///
/// `annots` are listed on the page; each also gets `/P` set when it is a
/// dictionary object.
pub(crate) fn form_document(
    doc: Document,
    fields: Vec<ObjectId>,
    annots: Vec<ObjectId>,
) -> (FormDocument, ObjectId) {
    let (form, pages) = paged_form_document(doc, fields, vec![annots]);
    (form, pages[0])
}

/// Like [`form_document`] with one page per entry of `pages`, each listing
/// its own annotations. Returns the page ids in order.
pub(crate) fn paged_form_document(
    mut doc: Document,
    fields: Vec<ObjectId>,
    pages: Vec<Vec<ObjectId>>,
) -> (FormDocument, Vec<ObjectId>) {
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
    let acroform_id = doc.add_object(dictionary! {
        "Fields" => fields.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
        "DR" => dictionary! {
            "Font" => dictionary! { "Helv" => Object::Reference(font_id) },
        },
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => Object::Reference(acroform_id),
    });
    doc.trailer.set("Root", catalog_id);
    (FormDocument::from_document(doc), page_ids)
}

/// Object ids of [`sample_form`].
pub(crate) struct Sample {
    pub doc: FormDocument,
    pub page: ObjectId,
    pub name: ObjectId,
    pub subscribe: ObjectId,
    pub plan: ObjectId,
    pub plan_kids: [ObjectId; 2],
}

/// `name` (text), `subscribe` (checkbox, on-state `On`) and `plan` (radio
/// group with kids `A` and `B`, currently `A`).
pub(crate) fn sample_form() -> Sample {
    let mut doc = Document::with_version("1.7");

    let name_ap = appearance_stream(&mut doc, 200, 20);
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

    let subscribe_ap = state_appearances(&mut doc, "On");
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
    let mut kids = [(0, 0); 2];
    for (i, (state, x)) in [("A", 50i64), ("B", 100i64)].into_iter().enumerate() {
        let ap = state_appearances(&mut doc, state);
        kids[i] = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "Parent" => Object::Reference(plan),
            "AS" => if i == 0 { "A" } else { "Off" },
            "Rect" => vec![x.into(), 600.into(), (x + 20).into(), 620.into()],
            "AP" => ap,
            "F" => 4,
        });
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

    let (doc, page) = form_document(
        doc,
        vec![name, subscribe, plan],
        vec![name, subscribe, kids[0], kids[1]],
    );
    Sample {
        doc,
        page,
        name,
        subscribe,
        plan,
        plan_kids: kids,
    }
}

/// Object ids of [`split_form`].
pub(crate) struct SplitForm {
    pub doc: FormDocument,
    pub pages: Vec<ObjectId>,
    pub field: ObjectId,
    /// Two widgets listed in `/Kids` (one per page), then one only
    /// reachable from the first page's `/Annots` through `/Parent`.
    pub widgets: [ObjectId; 3],
}

/// A text field `name` whose widgets span two pages.
pub(crate) fn split_form() -> SplitForm {
    let mut doc = Document::with_version("1.7");
    let field = doc.new_object_id();
    let mut widgets = [(0, 0); 3];
    for (i, y) in [700i64, 700, 500].into_iter().enumerate() {
        let ap = appearance_stream(&mut doc, 200, 20);
        widgets[i] = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "Parent" => Object::Reference(field),
            "Rect" => vec![50.into(), y.into(), 250.into(), (y + 20).into()],
            "AP" => dictionary! { "N" => Object::Reference(ap) },
            "F" => 4,
        });
    }
    doc.objects.insert(
        field,
        Object::Dictionary(dictionary! {
            "FT" => "Tx",
            "T" => Object::string_literal("name"),
            "V" => Object::string_literal("Jane"),
            "Kids" => vec![Object::Reference(widgets[0]), Object::Reference(widgets[1])],
        }),
    );
    let (doc, pages) = paged_form_document(
        doc,
        vec![field],
        vec![vec![widgets[0], widgets[2]], vec![widgets[1]]],
    );
    SplitForm {
        doc,
        pages,
        field,
        widgets,
    }
}

/// Fetch a dictionary for assertions.
pub(crate) fn dict_of(doc: &FormDocument, id: ObjectId) -> &Dictionary {
    match doc.inner().get_object(id) {
        Ok(Object::Dictionary(d)) => d,
        Ok(Object::Stream(s)) => &s.dict,
        other => panic!("object {id:?} is not a dictionary: {other:?}"),
    }
}
