//! Page-tree merging by deep object copy.

use crate::error::ComposerError;
use crate::page::inherited_attribute;
use lopdf::{Document, Object, ObjectId};
use std::collections::HashMap;

/// Tracks which source objects have already been copied into the target.
struct ObjectCopier<'a> {
    source_doc: &'a Document,
    target_doc: &'a mut Document,
    id_map: HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source_doc: &'a Document, target_doc: &'a mut Document) -> Self {
        Self {
            source_doc,
            target_doc,
            id_map: HashMap::new(),
        }
    }

    fn copy_object(&mut self, source_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return Ok(*target_id);
        }

        // Reserve the id before recursing so reference cycles terminate.
        let new_id = self.target_doc.add_object(Object::Null);
        self.id_map.insert(source_id, new_id);

        let obj = self.source_doc.get_object(source_id)?.clone();
        let new_obj = self.remap_references(obj)?;
        self.target_doc.objects.insert(new_id, new_obj);
        Ok(new_id)
    }

    /// Copies a page without its `/Parent`, pinning the inheritable
    /// attributes it relied on so it renders identically in the new tree.
    fn copy_page(&mut self, page_id: ObjectId) -> Result<ObjectId, ComposerError> {
        let mut page = self.source_doc.get_object(page_id)?.as_dict()?.clone();
        page.remove(b"Parent");
        for key in [&b"MediaBox"[..], &b"CropBox"[..], &b"Resources"[..], &b"Rotate"[..]] {
            if !page.has(key) {
                if let Some(value) = inherited_attribute(self.source_doc, page_id, key) {
                    page.set(key.to_vec(), value);
                }
            }
        }
        // Recorded first so back-references such as an annotation's /P land here.
        let new_page_id = self.target_doc.add_object(Object::Null);
        self.id_map.insert(page_id, new_page_id);
        let remapped = self.remap_references(Object::Dictionary(page))?;
        self.target_doc.objects.insert(new_page_id, remapped);
        Ok(new_page_id)
    }

    fn remap_references(&mut self, obj: Object) -> Result<Object, lopdf::Error> {
        match obj {
            Object::Reference(id) => Ok(Object::Reference(self.copy_object(id)?)),
            Object::Array(arr) => arr
                .into_iter()
                .map(|o| self.remap_references(o))
                .collect::<Result<Vec<_>, _>>()
                .map(Object::Array),
            Object::Dictionary(mut dict) => {
                for (_, value) in dict.iter_mut() {
                    *value = self.remap_references(std::mem::replace(value, Object::Null))?;
                }
                Ok(Object::Dictionary(dict))
            }
            Object::Stream(mut stream) => {
                for (_, value) in stream.dict.iter_mut() {
                    *value = self.remap_references(std::mem::replace(value, Object::Null))?;
                }
                Ok(Object::Stream(stream))
            }
            _ => Ok(obj),
        }
    }
}

/// Merges the pages of `source` into `target`, either before or after the
/// existing pages. Page order within `source` is preserved.
pub fn merge_documents(target: &mut Document, source: Document, prepend: bool) -> Result<(), ComposerError> {
    let source_pages: Vec<ObjectId> = source.get_pages().into_values().collect();
    if source_pages.is_empty() {
        return Ok(());
    }

    let mut copier = ObjectCopier::new(&source, target);
    let mut copied = Vec::with_capacity(source_pages.len());
    for page_id in &source_pages {
        copied.push(copier.copy_page(*page_id)?);
    }

    let root_id = target.trailer.get(b"Root")?.as_reference()?;
    let pages_id = target.get_object(root_id)?.as_dict()?.get(b"Pages")?.as_reference()?;

    for page_id in &copied {
        if let Ok(Object::Dictionary(page)) = target.get_object_mut(*page_id) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }

    let pages_dict = target.get_object_mut(pages_id)?.as_dict_mut()?;
    let existing = pages_dict.get(b"Kids")?.as_array()?.clone();
    let count = pages_dict.get(b"Count")?.as_i64()?;
    let new_kids: Vec<Object> = copied.into_iter().map(Object::Reference).collect();

    let kids = if prepend {
        new_kids.into_iter().chain(existing).collect()
    } else {
        existing.into_iter().chain(new_kids).collect()
    };
    pages_dict.set("Kids", Object::Array(kids));
    pages_dict.set("Count", count + source_pages.len() as i64);
    Ok(())
}

/// Concatenates complete PDFs into one, in the order given.
pub fn concatenate(parts: &[&[u8]]) -> Result<Vec<u8>, ComposerError> {
    let mut iter = parts.iter();
    let first = iter
        .next()
        .ok_or_else(|| ComposerError::Other("nothing to concatenate".to_string()))?;
    let mut target = crate::load(first)?;
    for part in iter {
        merge_documents(&mut target, crate::load(part)?, false)?;
    }
    crate::save(&mut target)
}
