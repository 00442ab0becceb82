//! Page-level surgery: inherited attributes, resources and content overlays.

use crate::error::ComposerError;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

/// A page rectangle in default user space units (points).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl PageBox {
    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }
}

/// Looks up a page attribute, walking up the `/Parent` chain for
/// inheritable keys such as `/MediaBox` and `/Resources`.
pub(crate) fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = doc.get_object(page_id).ok()?.as_dict().ok()?;
    // Page trees are shallow; the bound only guards against Parent cycles.
    for _ in 0..64 {
        if let Ok(value) = current.get(key) {
            return Some(value.clone());
        }
        let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_object(parent).ok()?.as_dict().ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn resolve_dict(doc: &Document, obj: &Object) -> Option<Dictionary> {
    resolve(doc, obj)?.as_dict().ok().cloned()
}

/// The page's own media box, resolved through inheritance.
pub fn media_box(doc: &Document, page_id: ObjectId) -> Result<PageBox, ComposerError> {
    let missing = || ComposerError::MalformedDocument(format!("page {:?} has no usable /MediaBox", page_id));
    let obj = inherited_attribute(doc, page_id, b"MediaBox").ok_or_else(missing)?;
    let array = resolve(doc, &obj).and_then(|o| o.as_array().ok()).ok_or_else(missing)?;
    if array.len() != 4 {
        return Err(missing());
    }
    let mut coords = [0f32; 4];
    for (slot, value) in coords.iter_mut().zip(array) {
        *slot = resolve(doc, value)
            .and_then(|v| v.as_float().ok())
            .ok_or_else(missing)?;
    }
    // Normalise boxes written with swapped corners.
    Ok(PageBox {
        llx: coords[0].min(coords[2]),
        lly: coords[1].min(coords[3]),
        urx: coords[0].max(coords[2]),
        ury: coords[1].max(coords[3]),
    })
}

/// Gives the page its own `/Resources` dictionary with the given fonts
/// registered under `/Font`. Shared or inherited resource dictionaries are
/// copied rather than modified, so other pages are left untouched.
pub(crate) fn install_fonts(
    doc: &mut Document,
    page_id: ObjectId,
    fonts: &[(&str, ObjectId)],
) -> Result<(), ComposerError> {
    let mut resources = inherited_attribute(doc, page_id, b"Resources")
        .and_then(|obj| resolve_dict(doc, &obj))
        .unwrap_or_default();

    let mut font_dict = resources
        .get(b"Font")
        .ok()
        .and_then(|obj| resolve_dict(doc, obj))
        .unwrap_or_default();
    for (name, id) in fonts {
        font_dict.set(*name, Object::Reference(*id));
    }
    resources.set("Font", Object::Dictionary(font_dict));

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page.set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Adds a new content stream to an existing page, overlaying it on top.
///
/// The page's existing content is bracketed by `q`/`Q` so that any graphics
/// state it leaves behind (transforms, colours) cannot leak into the
/// overlay. A page without `/Contents` simply receives the overlay.
pub fn overlay_content(
    doc: &mut Document,
    page_id: ObjectId,
    content_stream: Vec<u8>,
) -> Result<(), ComposerError> {
    let overlay_id = doc.add_object(Object::Stream(Stream::new(dictionary! {}, content_stream)));

    let existing = {
        let page_dict = doc.get_object(page_id)?.as_dict()?;
        match page_dict.get(b"Contents") {
            Ok(Object::Array(items)) => items.clone(),
            Ok(single) => vec![single.clone()],
            Err(_) => Vec::new(),
        }
    };

    let mut contents = Vec::with_capacity(existing.len() + 3);
    if !existing.is_empty() {
        let open_id = doc.add_object(Object::Stream(Stream::new(dictionary! {}, b"q\n".to_vec())));
        let close_id = doc.add_object(Object::Stream(Stream::new(dictionary! {}, b"\nQ\n".to_vec())));
        contents.push(Object::Reference(open_id));
        contents.extend(existing);
        contents.push(Object::Reference(close_id));
    }
    contents.push(Object::Reference(overlay_id));

    let page_dict = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page_dict.set("Contents", Object::Array(contents));
    Ok(())
}
