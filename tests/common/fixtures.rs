use dossier::{CaseId, CaseRecord, DocumentPlan, SectionPlan};
use dossier_templating::HandlebarsTemplates;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use serde_json::json;

pub const CASE_ID: &str = "case-7";

/// Section templates declare their label and page count as attributes; the
/// fake renderer reads them back to decide what PDF to produce.
pub const SECTION_TEMPLATE: &str = r#"<section data-label="{{sectionName}}" data-pages="{{pages}}" data-case="{{caseId}}"><h1>{{sectionName}}</h1><p>{{name}}</p></section>"#;

pub const TOC_TEMPLATE: &str = r#"<section data-label="{{sectionName}}" data-pages="{{#if tocPages}}{{tocPages}}{{else}}1{{/if}}"><ol>{{#each entries}}<li>{{title}}:{{startPage}}</li>{{/each}}</ol><p>{{generatedOn}}</p></section>"#;

pub fn templates() -> HandlebarsTemplates {
    let mut templates = HandlebarsTemplates::new();
    templates
        .register("section", SECTION_TEMPLATE)
        .expect("section template should compile");
    templates
        .register("toc", TOC_TEMPLATE)
        .expect("toc template should compile");
    templates
}

pub fn case_id() -> CaseId {
    CaseId::from(CASE_ID)
}

pub fn case_record() -> CaseRecord {
    let facts = json!({
        "name": "A. Person",
        "licenceDate": "2024-03-05",
        "returnedToCustody": null,
    });
    CaseRecord::new(CASE_ID, facts.as_object().cloned().unwrap_or_default())
}

/// A template section that renders to `pages` pages.
pub fn section(title: &str, pages: usize) -> SectionPlan {
    SectionPlan::template(title, "section").with_variable("pages", json!(pages))
}

/// Licence (2 pages), Report (1 page), Order (3 pages) behind a table of contents.
pub fn three_section_dossier() -> DocumentPlan {
    DocumentPlan::dossier("DOSSIER", "toc")
        .with_section(section("Licence", 2))
        .with_section(section("Report", 1))
        .with_section(section("Order", 3))
}

/// An A4 PDF whose page `n` shows the text "{label} {n}".
pub fn pdf_with_pages(label: &str, pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages);
    for n in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 760.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("{} {}", label, n).into_bytes(),
                        StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap_or_default(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("fixture PDF should serialise");
    bytes
}
