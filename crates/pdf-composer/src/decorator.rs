use crate::error::ComposerError;
use crate::page::{PageBox, install_fonts, media_box, overlay_content};
use crate::text::{StampFont, encode_win_ansi};
use dossier_types::NumberingSpec;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, StringFormat};
use log::debug;

/// Where on the page a stamp is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopCenter,
    TopRight,
    BottomCenter,
    BottomRight,
}

/// A single line of text stamped onto a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamp {
    pub text: String,
    pub anchor: Anchor,
    pub font: StampFont,
}

impl Stamp {
    pub fn new(text: impl Into<String>, anchor: Anchor) -> Self {
        Self {
            text: text.into(),
            anchor,
            font: StampFont::Regular,
        }
    }

    pub fn bold(mut self) -> Self {
        self.font = StampFont::Bold;
        self
    }
}

/// Font size and page margins used for every stamp, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecorationStyle {
    pub font_size: f32,
    pub margin_x: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl Default for DecorationStyle {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            margin_x: 36.0,
            margin_top: 36.0,
            margin_bottom: 24.0,
        }
    }
}

/// Stamps page numbers, headers and footers onto finished PDFs.
///
/// Positions are computed from each page's own media box, so mixed page
/// sizes are decorated correctly. Pages that receive no stamp are left
/// byte-for-byte unchanged in the page tree.
#[derive(Debug, Clone, Default)]
pub struct PdfDecorator {
    style: DecorationStyle,
}

impl PdfDecorator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: DecorationStyle) -> Self {
        Self { style }
    }

    /// Numbers every page after the first `pages_to_skip`, starting at 1.
    pub fn number_pages(&self, pdf: &[u8], pages_to_skip: usize) -> Result<Vec<u8>, ComposerError> {
        let spec = NumberingSpec {
            number_of_pages_to_skip: pages_to_skip,
            ..NumberingSpec::default()
        };
        self.stamp_pages(pdf, |page| {
            spec.label_for(page)
                .map(|n| Stamp::new(n.to_string(), Anchor::BottomCenter))
                .into_iter()
                .collect()
        })
    }

    /// Page numbers plus optional header and footer text, each with its
    /// own starting page.
    pub fn number_pages_with_header_footer(
        &self,
        pdf: &[u8],
        spec: &NumberingSpec,
    ) -> Result<Vec<u8>, ComposerError> {
        spec.validate()?;
        self.stamp_pages(pdf, |page| {
            let mut stamps = Vec::with_capacity(3);
            if let Some(n) = spec.label_for(page) {
                stamps.push(Stamp::new(n.to_string(), Anchor::BottomRight));
            }
            if let Some(header) = spec.header_for(page) {
                stamps.push(Stamp::new(header, Anchor::TopRight));
            }
            if let Some(footer) = spec.footer_for(page) {
                stamps.push(Stamp::new(footer, Anchor::BottomCenter).bold());
            }
            stamps
        })
    }

    /// The same centred header on every page.
    pub fn central_header(&self, pdf: &[u8], text: &str) -> Result<Vec<u8>, ComposerError> {
        self.stamp_pages(pdf, |_| vec![Stamp::new(text, Anchor::TopCenter).bold()])
    }

    /// Applies the stamps returned by `plan` for each 1-based page index.
    pub fn stamp_pages<F>(&self, pdf: &[u8], plan: F) -> Result<Vec<u8>, ComposerError>
    where
        F: Fn(usize) -> Vec<Stamp>,
    {
        let mut doc = crate::load(pdf)?;
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let mut fonts: Option<[(&'static str, ObjectId); 2]> = None;
        let mut stamped = 0usize;

        for (index, page_id) in page_ids.iter().enumerate() {
            let stamps = plan(index + 1);
            if stamps.is_empty() {
                continue;
            }
            let page_box = media_box(&doc, *page_id)?;
            let fonts = *fonts.get_or_insert_with(|| register_fonts(&mut doc));
            install_fonts(&mut doc, *page_id, &fonts)?;
            let overlay = self.overlay_for(&page_box, &stamps)?;
            overlay_content(&mut doc, *page_id, overlay)?;
            stamped += 1;
        }

        debug!("[DECORATOR] Stamped {} of {} pages", stamped, page_ids.len());
        crate::save(&mut doc)
    }

    fn overlay_for(&self, page: &PageBox, stamps: &[Stamp]) -> Result<Vec<u8>, ComposerError> {
        let size = self.style.font_size;
        let mut operations = vec![Operation::new("q", vec![]), Operation::new("BT", vec![])];
        for stamp in stamps {
            let encoded = encode_win_ansi(&stamp.text);
            let width = stamp.font.text_width(&encoded, size);
            let (x, y) = self.position(page, stamp.anchor, width);
            operations.push(Operation::new(
                "Tf",
                vec![Object::Name(stamp.font.resource_name().as_bytes().to_vec()), size.into()],
            ));
            operations.push(Operation::new(
                "Tm",
                vec![
                    Object::Integer(1),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(1),
                    x.into(),
                    y.into(),
                ],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(encoded, StringFormat::Literal)],
            ));
        }
        operations.push(Operation::new("ET", vec![]));
        operations.push(Operation::new("Q", vec![]));
        Ok(Content { operations }.encode()?)
    }

    fn position(&self, page: &PageBox, anchor: Anchor, text_width: f32) -> (f32, f32) {
        let centred_x = page.llx + (page.width() - text_width) / 2.0;
        let right_x = page.urx - self.style.margin_x - text_width;
        let top_y = page.ury - self.style.margin_top;
        let bottom_y = page.lly + self.style.margin_bottom;
        match anchor {
            Anchor::TopCenter => (centred_x, top_y),
            Anchor::TopRight => (right_x, top_y),
            Anchor::BottomCenter => (centred_x, bottom_y),
            Anchor::BottomRight => (right_x, bottom_y),
        }
    }
}

fn register_fonts(doc: &mut Document) -> [(&'static str, ObjectId); 2] {
    [StampFont::Regular, StampFont::Bold].map(|font| (font.resource_name(), doc.add_object(font.dictionary())))
}
