//! PDF outline entries for the sections of a rendered study guide.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};
use thiserror::Error;

/// Errors that can occur while adding section bookmarks to a rendered PDF.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// The PDF bytes could not be parsed or written by `lopdf`.
    #[error("failed to process PDF bytes: {0}")]
    Pdf(#[from] lopdf::Error),
    /// The trailer has no `/Root` catalog reference.
    #[error("PDF catalog entry is missing")]
    MissingCatalog,
    /// The catalog object is not a dictionary.
    #[error("PDF catalog entry is not a dictionary")]
    InvalidCatalog,
    /// A recorded page number does not exist in the rendered document.
    #[error("section {section_index} refers to missing page {page_number}")]
    MissingPage {
        section_index: usize,
        page_number: usize,
    },
}

impl From<std::io::Error> for BookmarkError {
    fn from(err: std::io::Error) -> Self {
        Self::Pdf(err.into())
    }
}

/// Adds one top-level outline entry per section title.
///
/// Each entry gets a `/Dest [page /Fit]` pointing at the page recorded for the
/// section.  Sections without a recorded page, such as an empty heading, get no
/// entry.  When no entry remains the input is returned unchanged.
pub fn apply_section_bookmarks(
    pdf_bytes: &[u8],
    titles: &[String],
    section_pages: &[Option<usize>],
) -> Result<Vec<u8>, BookmarkError> {
    let mut document = Document::load_mem(pdf_bytes)?;

    let pages = document.get_pages();
    let outline_entries = collect_outline_entries(&mut document, titles, section_pages, &pages)?;

    if outline_entries.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let outlines_id = document.new_object_id();
    link_outline_entries(outlines_id, &mut document, &outline_entries);

    insert_outlines_root(outlines_id, &mut document, &outline_entries)?;

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

struct OutlineEntry {
    object_id: ObjectId,
    page_ref: ObjectId,
    title: String,
}

fn collect_outline_entries(
    document: &mut Document,
    titles: &[String],
    section_pages: &[Option<usize>],
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<OutlineEntry>, BookmarkError> {
    let mut entries = Vec::new();

    for (index, (title, maybe_page)) in titles.iter().zip(section_pages.iter()).enumerate() {
        let Some(page_number) = *maybe_page else {
            continue;
        };
        if title.trim().is_empty() {
            continue;
        }
        let missing = BookmarkError::MissingPage {
            section_index: index,
            page_number,
        };
        let page_ref = match u32::try_from(page_number) {
            Ok(key) => pages.get(&key).copied().ok_or(missing)?,
            Err(_) => return Err(missing),
        };

        entries.push(OutlineEntry {
            object_id: document.new_object_id(),
            page_ref,
            title: title.clone(),
        });
    }

    Ok(entries)
}

fn link_outline_entries(outlines_id: ObjectId, document: &mut Document, entries: &[OutlineEntry]) {
    for (index, entry) in entries.iter().enumerate() {
        let mut dictionary = Dictionary::new();
        dictionary.set("Title", Object::string_literal(entry.title.as_str()));
        dictionary.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(entry.page_ref),
                Object::Name("Fit".into()),
            ]),
        );
        dictionary.set("Parent", Object::Reference(outlines_id));

        if let Some(previous) = index.checked_sub(1).and_then(|prev| entries.get(prev)) {
            dictionary.set("Prev", Object::Reference(previous.object_id));
        }
        if let Some(next) = entries.get(index + 1) {
            dictionary.set("Next", Object::Reference(next.object_id));
        }

        document
            .objects
            .insert(entry.object_id, Object::Dictionary(dictionary));
    }
}

fn insert_outlines_root(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &[OutlineEntry],
) -> Result<(), BookmarkError> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;

    let mut dictionary = Dictionary::new();
    dictionary.set("Type", Object::Name("Outlines".into()));
    dictionary.set("Count", Object::Integer(entries.len() as i64));
    if let Some(first) = entries.first() {
        dictionary.set("First", Object::Reference(first.object_id));
    }
    if let Some(last) = entries.last() {
        dictionary.set("Last", Object::Reference(last.object_id));
    }

    document
        .objects
        .get_mut(&catalog_id)
        .ok_or(BookmarkError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| BookmarkError::InvalidCatalog)?
        .set("Outlines", Object::Reference(outlines_id));

    document
        .objects
        .insert(outlines_id, Object::Dictionary(dictionary));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(value: &str) -> Object {
        Object::Name(value.as_bytes().to_vec())
    }

    fn blank_pdf(page_count: usize) -> Vec<u8> {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();

        let kids: Vec<Object> = (0..page_count)
            .map(|_| {
                let mut page = Dictionary::new();
                page.set("Type", name("Page"));
                page.set("Parent", Object::Reference(pages_id));
                page.set(
                    "MediaBox",
                    Object::Array(
                        [0, 0, 595, 842]
                            .into_iter()
                            .map(Object::Integer)
                            .collect(),
                    ),
                );
                Object::Reference(document.add_object(page))
            })
            .collect();

        let mut pages = Dictionary::new();
        pages.set("Type", name("Pages"));
        pages.set("Count", Object::Integer(page_count as i64));
        pages.set("Kids", Object::Array(kids));
        document.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", name("Catalog"));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = document.add_object(catalog);
        document.trailer.set("Root", Object::Reference(catalog_id));

        let mut bytes = Vec::new();
        document.save_to(&mut bytes).unwrap();
        bytes
    }

    fn outline_titles(bytes: &[u8]) -> Vec<String> {
        let document = Document::load_mem(bytes).unwrap();
        let catalog_id = document
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .unwrap();
        let outlines_id = document
            .get_dictionary(catalog_id)
            .unwrap()
            .get(b"Outlines")
            .and_then(Object::as_reference)
            .unwrap();

        let mut titles = Vec::new();
        let mut next = document
            .get_dictionary(outlines_id)
            .unwrap()
            .get(b"First")
            .and_then(Object::as_reference)
            .ok();
        while let Some(id) = next {
            let entry = document.get_dictionary(id).unwrap();
            let title = entry.get(b"Title").and_then(Object::as_str).unwrap();
            titles.push(String::from_utf8_lossy(title).into_owned());
            next = entry.get(b"Next").and_then(Object::as_reference).ok();
        }
        titles
    }

    #[test]
    fn outline_is_attached_to_catalog() {
        let titles = vec![
            "Introduction".to_owned(),
            "".to_owned(),
            "Further Reading".to_owned(),
        ];
        let bytes =
            apply_section_bookmarks(&blank_pdf(2), &titles, &[Some(1), Some(1), Some(2)]).unwrap();

        assert_eq!(outline_titles(&bytes), vec!["Introduction", "Further Reading"]);
    }

    #[test]
    fn sections_without_pages_leave_pdf_untouched() {
        let pdf = blank_pdf(1);
        let titles = vec!["Introduction".to_owned()];
        assert_eq!(apply_section_bookmarks(&pdf, &titles, &[None]).unwrap(), pdf);
    }

    #[test]
    fn out_of_range_page_is_reported() {
        let titles = vec!["Introduction".to_owned(), "Summary".to_owned()];

        let err = apply_section_bookmarks(&blank_pdf(1), &titles, &[Some(1), Some(5)]).unwrap_err();
        assert!(matches!(
            err,
            BookmarkError::MissingPage {
                section_index: 1,
                page_number: 5
            }
        ));

        let err =
            apply_section_bookmarks(&blank_pdf(1), &titles[..1], &[Some(usize::MAX)]).unwrap_err();
        assert!(matches!(err, BookmarkError::MissingPage { section_index: 0, .. }));
    }
}
