//! Study guide generation: prompt a text generation service, split the
//! answer into sections, show them as cards and export them as a PDF.

pub mod builder;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod fonts;
pub mod generator;
pub mod prompt;
pub mod render;
pub mod request;
pub mod sections;
pub mod service;
pub mod ui;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use config::Config;
pub use error::{ConfigError, GuideError, RenderError, ServiceError};
pub use fonts::FontSources;
pub use generator::{StudyGuide, StudyGuideGenerator};
pub use render::{PdfRenderer, RenderedPdf};
pub use request::{Depth, GenerationRequest, Tone};
pub use sections::{split_lines, split_sections, HeadingMarker, SectionMap};
pub use service::{ContentService, GeminiClient};
