//! Document construction helpers for the PDF serializer.

use std::cell::Cell;
use std::rc::Rc;

use genpdf::error::Error;
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style;
use genpdf::{self, Element, Margins, PageDecorator, Position, RenderResult, Size};

type HeaderFactory = dyn Fn(usize) -> Box<dyn Element>;

/// Shared counter of the page currently being rendered (1-based, 0 before the first page).
#[derive(Clone, Debug, Default)]
pub struct PageCounter(Rc<Cell<usize>>);

impl PageCounter {
    /// Returns the number of the page currently being rendered.
    pub fn current(&self) -> usize {
        self.0.get()
    }

    fn advance(&self) -> usize {
        let next = self.0.get() + 1;
        self.0.set(next);
        next
    }
}

/// Builder for `genpdf::Document` instances pre-configured with the crate defaults.
pub struct DocumentBuilder {
    font_family: FontFamily<FontData>,
    title: Option<String>,
    paper_size: Option<Size>,
    margins: Option<Margins>,
    header: Option<Box<HeaderFactory>>,
    pages: PageCounter,
}

impl DocumentBuilder {
    /// Creates a builder for documents set in `font_family`.
    pub fn new(font_family: FontFamily<FontData>) -> Self {
        Self {
            font_family,
            title: None,
            paper_size: None,
            margins: None,
            header: None,
            pages: PageCounter::default(),
        }
    }

    /// Sets the title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the paper size used for newly created documents.
    pub fn with_paper_size(mut self, paper_size: impl Into<Size>) -> Self {
        self.paper_size = Some(paper_size.into());
        self
    }

    /// Sets the margins applied through the page decorator.
    pub fn with_margins(mut self, margins: impl Into<Margins>) -> Self {
        self.margins = Some(margins.into());
        self
    }

    /// Configures a header callback that is invoked for every page.
    pub fn with_header<F, E>(mut self, header: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        self.header = Some(Box::new(move |page| {
            Box::new(header(page)) as Box<dyn Element>
        }));
        self
    }

    /// Returns the counter the page decorator advances for every new page.
    pub fn page_counter(&self) -> PageCounter {
        self.pages.clone()
    }

    /// Builds a fully configured `genpdf::Document` instance.
    pub fn build(self) -> genpdf::Document {
        let mut document = genpdf::Document::new(self.font_family);

        if let Some(title) = self.title {
            document.set_title(title);
        }

        if let Some(paper_size) = self.paper_size {
            document.set_paper_size(paper_size);
        }

        let decorator = ConfiguredPageDecorator {
            pages: self.pages,
            margins: self.margins,
            header: self.header,
        };
        document.set_page_decorator(decorator);

        document
    }
}

struct ConfiguredPageDecorator {
    pages: PageCounter,
    margins: Option<Margins>,
    header: Option<Box<HeaderFactory>>,
}

impl PageDecorator for ConfiguredPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        let page = self.pages.advance();

        if let Some(margins) = self.margins {
            area.add_margins(margins);
        }

        if let Some(header_cb) = &self.header {
            let mut element = header_cb(page);
            let result = element.render(context, area.clone(), style)?;
            area.add_offset(Position::new(0, result.size.height));
        }

        Ok(area)
    }
}

/// Wraps an element and records the page on which it first produced output.
pub struct PageMarked<E> {
    inner: E,
    pages: PageCounter,
    first_page: Rc<Cell<Option<usize>>>,
}

impl<E: Element> PageMarked<E> {
    /// Wraps `inner`; the returned cell is filled once the element renders.
    pub fn new(inner: E, pages: PageCounter) -> (Self, Rc<Cell<Option<usize>>>) {
        let first_page = Rc::new(Cell::new(None));
        let element = Self {
            inner,
            pages,
            first_page: Rc::clone(&first_page),
        };
        (element, first_page)
    }
}

impl<E: Element> Element for PageMarked<E> {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: genpdf::render::Area<'_>,
        style: style::Style,
    ) -> Result<RenderResult, Error> {
        let result = self.inner.render(context, area, style)?;
        if self.first_page.get().is_none() && result.size.height > genpdf::Mm::default() {
            self.first_page.set(Some(self.pages.current()));
        }
        Ok(result)
    }
}
