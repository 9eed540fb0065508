//! HTML rendering of the browser interface.
//!
//! Cards show the section text as generated.  Unlike the PDF, no character
//! cleanup is applied here; the template only HTML-escapes the text.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::GuideError;
use crate::generator::StudyGuide;
use crate::render::{RenderedPdf, DOWNLOAD_FILE_NAME, PDF_CONTENT_TYPE};
use crate::request::{Depth, Tone};

const TEMPLATE_NAME: &str = "index.html";
const TEMPLATE: &str = include_str!("../templates/index.html");

/// One titled block of the results area.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Card {
    pub title: String,
    pub body: String,
}

/// Link that downloads the rendered PDF.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Download {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub href: String,
}

impl Download {
    /// Embeds `pdf` as a base64 `data:` URI.
    pub fn from_pdf(pdf: &RenderedPdf) -> Self {
        Self {
            file_name: DOWNLOAD_FILE_NAME,
            content_type: PDF_CONTENT_TYPE,
            href: format!("data:{};base64,{}", PDF_CONTENT_TYPE, STANDARD.encode(&pdf.bytes)),
        }
    }
}

/// Everything the page template displays.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page {
    pub topic: String,
    pub depth: &'static str,
    pub tone: &'static str,
    pub depths: Vec<&'static str>,
    pub tones: Vec<&'static str>,
    pub warning: Option<String>,
    pub error: Option<String>,
    pub cards: Vec<Card>,
    pub download: Option<Download>,
}

impl Page {
    /// The empty form with the given field values.
    pub fn form(topic: impl Into<String>, depth: Depth, tone: Tone) -> Self {
        Self {
            topic: topic.into(),
            depth: depth.as_str(),
            tone: tone.as_str(),
            depths: Depth::ALL.iter().map(|d| d.as_str()).collect(),
            tones: Tone::ALL.iter().map(|t| t.as_str()).collect(),
            warning: None,
            error: None,
            cards: Vec::new(),
            download: None,
        }
    }

    /// The form followed by the outcome of a generation.
    ///
    /// Input errors become a warning, every other failure a single error
    /// message.  Only a successful generation shows cards and a download.
    pub fn from_outcome(
        topic: impl Into<String>,
        depth: Depth,
        tone: Tone,
        outcome: &Result<StudyGuide, GuideError>,
    ) -> Self {
        let mut page = Self::form(topic, depth, tone);
        match outcome {
            Ok(guide) => {
                page.cards = guide
                    .sections
                    .iter()
                    .map(|(title, body)| Card {
                        title: title.to_owned(),
                        body: body.to_owned(),
                    })
                    .collect();
                page.download = Some(Download::from_pdf(&guide.pdf));
            }
            Err(GuideError::InputInvalid(message)) => page.warning = Some(message.clone()),
            Err(err) => page.error = Some(format!("Error: {err}")),
        }
        page
    }
}

/// Renders [`Page`] values with the bundled template.
#[derive(Debug)]
pub struct UiRenderer {
    tera: Tera,
}

impl UiRenderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)?;
        Ok(Self { tera })
    }

    pub fn render(&self, page: &Page) -> Result<String, tera::Error> {
        let context = Context::from_serialize(page)?;
        self.tera.render(TEMPLATE_NAME, &context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::request::GenerationRequest;
    use crate::sections::{split_sections, HeadingMarker};

    fn sample_guide() -> StudyGuide {
        let raw = "## Introduction\nCaf\u{e9} <b>bold</b>\n## Further Reading\nSee X\n";
        StudyGuide {
            request: GenerationRequest::new("Coffee", Depth::Beginner, Tone::Simple).unwrap(),
            raw_response: raw.to_owned(),
            sections: split_sections(raw, HeadingMarker::default()),
            pdf: RenderedPdf {
                bytes: b"%PDF-1.3".to_vec(),
                section_pages: vec![Some(1), Some(1)],
            },
        }
    }

    #[test]
    fn form_page_lists_options_and_keeps_selection() {
        let html = UiRenderer::new()
            .unwrap()
            .render(&Page::form("", Depth::Advanced, Tone::Conversational))
            .unwrap();
        assert!(html.contains(r#"<option value="Intermediate">Intermediate</option>"#));
        assert!(html.contains(r#"<option value="Advanced" selected>Advanced</option>"#));
        assert!(html.contains(r#"<option value="Conversational" selected>"#));
        assert!(!html.contains("Download PDF"));
    }

    #[test]
    fn form_offers_every_depth_and_tone() {
        let page = Page::form("Rust", Depth::default(), Tone::default());
        assert_eq!(page.depths, vec!["Beginner", "Intermediate", "Advanced"]);
        assert_eq!(page.tones, vec!["Academic", "Simple", "Conversational"]);
        assert_eq!((page.depth, page.tone), ("Beginner", "Academic"));
    }

    #[test]
    fn successful_outcome_shows_cards_and_download() {
        let page = Page::from_outcome("Coffee", Depth::Beginner, Tone::Simple, &Ok(sample_guide()));
        assert_eq!(page.cards.len(), 2);
        assert_eq!(page.cards[0].body, "Caf\u{e9} <b>bold</b>\n");

        let download = page.download.as_ref().unwrap();
        assert_eq!(download.file_name, "study_guide.pdf");
        assert_eq!(download.href, "data:application/pdf;base64,JVBERi0xLjM=");

        let html = UiRenderer::new().unwrap().render(&page).unwrap();
        assert!(html.contains("Caf\u{e9} &lt;b&gt;bold&lt;&#x2F;b&gt;"));
        assert!(html.contains(r#"download="study_guide.pdf""#));
        assert!(html.contains("data:application/pdf;base64,JVBERi0xLjM="));
    }

    #[test]
    fn input_error_is_a_warning() {
        let outcome = Err(GuideError::InputInvalid("Please enter a topic first!".into()));
        let page = Page::from_outcome("", Depth::Beginner, Tone::Academic, &outcome);
        assert_eq!(page.warning.as_deref(), Some("Please enter a topic first!"));
        assert!(page.error.is_none());
        assert!(page.cards.is_empty());
        assert!(page.download.is_none());
    }

    #[test]
    fn service_error_is_one_message() {
        let outcome = Err(GuideError::ServiceUnavailable(ServiceError::Status {
            status: 403,
            message: "API key not valid".into(),
        }));
        let page = Page::from_outcome("Rust", Depth::Beginner, Tone::Academic, &outcome);
        assert_eq!(
            page.error.as_deref(),
            Some("Error: content service unavailable: service returned 403: API key not valid")
        );
        assert!(page.download.is_none());
        assert_eq!(page.topic, "Rust");
    }
}
