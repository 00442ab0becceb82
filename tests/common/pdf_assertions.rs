use lopdf::Document as LopdfDocument;
use lopdf::content::Content;

/// Every string shown with `Tj` on each page, in page order. Covers both the
/// original page content and stamped overlays.
pub fn page_texts(doc: &LopdfDocument) -> Vec<Vec<String>> {
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let bytes = doc.get_page_content(page_id).unwrap_or_default();
            Content::decode(&bytes)
                .map(|content| {
                    content
                        .operations
                        .into_iter()
                        .filter(|op| op.operator == "Tj")
                        .filter_map(|op| {
                            op.operands
                                .first()
                                .and_then(|o| o.as_str().ok())
                                .map(|s| String::from_utf8_lossy(s).into_owned())
                        })
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect()
}

/// Asserts that `page` (1-based) shows `text` somewhere.
pub fn assert_page_shows(pages: &[Vec<String>], page: usize, text: &str) {
    let shown = &pages[page - 1];
    assert!(
        shown.iter().any(|s| s == text),
        "page {} should show '{}', found {:?}",
        page,
        text,
        shown
    );
}

pub fn assert_page_lacks(pages: &[Vec<String>], page: usize, text: &str) {
    let shown = &pages[page - 1];
    assert!(
        !shown.iter().any(|s| s == text),
        "page {} should not show '{}', found {:?}",
        page,
        text,
        shown
    );
}
