//! The generation pipeline: prompt, request, split, render.

use log::{info, warn};

use crate::config::Config;
use crate::error::GuideError;
use crate::prompt::build_prompt;
use crate::render::{PdfRenderer, RenderedPdf};
use crate::request::{Depth, GenerationRequest, Tone};
use crate::sections::{split_sections, HeadingMarker, SectionMap};
use crate::service::{ContentService, GeminiClient};

/// Everything produced by one successful generation.
#[derive(Clone, Debug)]
pub struct StudyGuide {
    pub request: GenerationRequest,
    /// The unmodified text returned by the content service.
    pub raw_response: String,
    pub sections: SectionMap,
    pub pdf: RenderedPdf,
}

/// Runs the stages of a generation in order, stopping at the first failure.
#[derive(Clone, Debug)]
pub struct StudyGuideGenerator<S> {
    service: S,
    renderer: PdfRenderer,
    marker: HeadingMarker,
}

impl StudyGuideGenerator<GeminiClient> {
    /// Builds a generator backed by the Gemini client described in `config`.
    pub fn from_config(config: &Config) -> Result<Self, GuideError> {
        let service = GeminiClient::new(&config.service)?;
        let renderer =
            PdfRenderer::new(config.document_title.clone()).with_fonts(config.font_sources());
        Ok(Self::new(service, renderer))
    }
}

/// Content service behind a trait object, for callers that swap implementations.
pub type DynContentService = Box<dyn ContentService + Send + Sync>;

impl<S: ContentService> StudyGuideGenerator<S> {
    pub fn new(service: S, renderer: PdfRenderer) -> Self {
        Self {
            service,
            renderer,
            marker: HeadingMarker::default(),
        }
    }

    /// Erases the concrete service type.
    pub fn boxed(self) -> StudyGuideGenerator<DynContentService>
    where
        S: Send + Sync + 'static,
    {
        StudyGuideGenerator {
            service: Box::new(self.service),
            renderer: self.renderer,
            marker: self.marker,
        }
    }

    /// Replaces the heading convention used for both the prompt and the split.
    pub fn with_marker(mut self, marker: HeadingMarker) -> Self {
        self.marker = marker;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Validates the raw form fields, then generates.
    ///
    /// A blank topic fails with [`GuideError::InputInvalid`] before the
    /// content service is contacted.
    pub fn generate_from(&self, topic: &str, depth: Depth, tone: Tone) -> Result<StudyGuide, GuideError> {
        let request = GenerationRequest::new(topic, depth, tone).map_err(|err| {
            warn!("Rejected generation request: {}", err);
            err
        })?;
        self.generate(request)
    }

    /// Generates the guide for an already validated request.
    pub fn generate(&self, request: GenerationRequest) -> Result<StudyGuide, GuideError> {
        info!(
            "Generating study guide on '{}' ({}, {})",
            request.topic(),
            request.depth(),
            request.tone()
        );

        let prompt = build_prompt(&request, self.marker);
        let raw_response = self.service.generate(&prompt)?;
        let sections = split_sections(&raw_response, self.marker);
        info!("Split response into {} sections", sections.len());

        let pdf = self.renderer.render(&sections)?;

        Ok(StudyGuide {
            request,
            raw_response,
            sections,
            pdf,
        })
    }
}
