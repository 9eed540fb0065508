//! Serialization of a [`SectionMap`] into a paged PDF document.
//!
//! Every string that ends up in the PDF passes through
//! [`clean_text`](crate::cleanup::clean_text) first.  The result is kept in
//! memory; writing it to disk is left to the caller.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use genpdf::elements::{Break, LinearLayout, Paragraph};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Color, Style, StyledString};
use genpdf::{Alignment, Margins, PaperSize};
use log::{debug, info};

use crate::builder::{DocumentBuilder, PageMarked};
use crate::cleanup::clean_text;
use crate::error::RenderError;
use crate::fonts::FontSources;
use crate::sections::SectionMap;

/// Text printed at the top of every page.
pub const HEADER_TEXT: &str = "Educational Article / Study Guide";

/// File name offered when the PDF is downloaded.
pub const DOWNLOAD_FILE_NAME: &str = "study_guide.pdf";

/// Content type of the rendered artifact.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Path the command line writes to when no output is given.
pub const DEFAULT_OUTPUT_PATH: &str = "output.pdf";

const PAGE_MARGIN_MM: i32 = 10;
const HEADING_COLOR: Color = Color::Rgb(30, 30, 120);

/// A rendered PDF held in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPdf {
    /// The encoded document.
    pub bytes: Vec<u8>,
    /// 1-based page on which each section heading starts, in section order.
    pub section_pages: Vec<Option<usize>>,
}

impl RenderedPdf {
    /// Writes the document to `path`, replacing whatever was there.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        fs::write(path.as_ref(), &self.bytes)?;
        Ok(())
    }
}

/// Renders section maps into PDF documents.
///
/// The font family is loaded on the first successful render and reused for
/// later ones.  A failed load is not cached.
#[derive(Clone)]
pub struct PdfRenderer {
    title: String,
    fonts: FontSources,
    family: OnceLock<FontFamily<FontData>>,
    #[cfg(feature = "bookmarks")]
    bookmarks: bool,
}

impl fmt::Debug for PdfRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfRenderer")
            .field("title", &self.title)
            .field("fonts", &self.fonts)
            .field("fonts_loaded", &self.family.get().is_some())
            .finish_non_exhaustive()
    }
}

impl PdfRenderer {
    /// Creates a renderer for documents with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fonts: FontSources::default(),
            family: OnceLock::new(),
            #[cfg(feature = "bookmarks")]
            bookmarks: true,
        }
    }

    /// Replaces the locations searched for fonts.
    pub fn with_fonts(mut self, fonts: FontSources) -> Self {
        self.fonts = fonts;
        self.family = OnceLock::new();
        self
    }

    /// Enables or disables the outline entry added for every section.
    #[cfg(feature = "bookmarks")]
    pub fn with_bookmarks(mut self, bookmarks: bool) -> Self {
        self.bookmarks = bookmarks;
        self
    }

    fn font_family(&self) -> Result<FontFamily<FontData>, RenderError> {
        if let Some(family) = self.family.get() {
            return Ok(family.clone());
        }
        let family = self.fonts.load_family()?;
        let _ = self.family.set(family.clone());
        Ok(family)
    }

    /// Renders `sections` in insertion order below a centered title.
    pub fn render(&self, sections: &SectionMap) -> Result<RenderedPdf, RenderError> {
        let title = clean_text(&self.title);
        let header = clean_text(HEADER_TEXT);

        let builder = DocumentBuilder::new(self.font_family()?)
            .with_title(title.clone())
            .with_paper_size(PaperSize::A4)
            .with_margins(Margins::trbl(
                PAGE_MARGIN_MM,
                PAGE_MARGIN_MM,
                PAGE_MARGIN_MM,
                PAGE_MARGIN_MM,
            ))
            .with_header(move |_page| header_block(&header));
        let pages = builder.page_counter();
        let mut document = builder.build();

        document.push(
            Paragraph::new(StyledString::new(title, Style::new().bold().with_font_size(16)))
                .aligned(Alignment::Center),
        );
        document.push(Break::new(2));

        let mut first_pages = Vec::with_capacity(sections.len());
        for (heading, body) in sections {
            let heading = Paragraph::new(StyledString::new(clean_text(heading), heading_style()));
            let (heading, first_page) = PageMarked::new(heading, pages.clone());
            document.push(heading);
            document.push(Break::new(0.5));
            first_pages.push(first_page);

            push_body(&mut document, &clean_text(body.trim()));
            document.push(Break::new(1));
        }

        let mut bytes = Vec::new();
        document.render(&mut bytes)?;

        let section_pages: Vec<Option<usize>> =
            first_pages.iter().map(|page| page.get()).collect();
        debug!(
            "Rendered {} sections over {} pages",
            sections.len(),
            pages.current()
        );

        #[cfg(feature = "bookmarks")]
        let bytes = if self.bookmarks {
            let titles: Vec<String> = sections.titles().map(clean_text).collect();
            crate::bookmarks::apply_section_bookmarks(&bytes, &titles, &section_pages)?
        } else {
            bytes
        };

        info!("Rendered study guide PDF ({} bytes)", bytes.len());
        Ok(RenderedPdf {
            bytes,
            section_pages,
        })
    }
}

fn header_block(text: &str) -> LinearLayout {
    LinearLayout::vertical()
        .element(
            Paragraph::new(StyledString::new(
                text.to_owned(),
                Style::new().bold().with_font_size(14),
            ))
            .aligned(Alignment::Center),
        )
        .element(Break::new(1))
}

fn heading_style() -> Style {
    Style::new()
        .bold()
        .with_font_size(12)
        .with_color(HEADING_COLOR)
}

fn body_style() -> Style {
    Style::new()
        .with_font_size(11)
        .with_color(Color::Rgb(0, 0, 0))
}

/// Pushes one wrapped paragraph per line; blank lines become vertical space.
fn push_body(document: &mut genpdf::Document, body: &str) {
    for line in body.lines() {
        if line.trim().is_empty() {
            document.push(Break::new(1));
        } else {
            document.push(Paragraph::new(StyledString::new(line.to_owned(), body_style())));
        }
    }
}
