use std::cell::{Cell, RefCell};
use std::fs;

use study_guide::ui::{Page, UiRenderer};
use study_guide::{
    ContentService, Depth, FontSources, GuideError, HeadingMarker, PdfRenderer, ServiceError,
    StudyGuideGenerator, Tone,
};

/// Content service returning a canned response and remembering the prompts it saw.
struct CannedService {
    response: Result<String, u16>,
    prompts: RefCell<Vec<String>>,
    calls: Cell<usize>,
}

impl CannedService {
    fn replying(text: &str) -> Self {
        Self {
            response: Ok(text.to_owned()),
            prompts: RefCell::new(Vec::new()),
            calls: Cell::new(0),
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            response: Err(status),
            prompts: RefCell::new(Vec::new()),
            calls: Cell::new(0),
        }
    }
}

impl ContentService for CannedService {
    fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        self.calls.set(self.calls.get() + 1);
        self.prompts.borrow_mut().push(prompt.to_owned());
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(ServiceError::Status {
                status: *status,
                message: "simulated outage".to_owned(),
            }),
        }
    }
}

fn generator(service: CannedService) -> StudyGuideGenerator<CannedService> {
    StudyGuideGenerator::new(service, PdfRenderer::new("Study Guide"))
}

#[test]
fn headed_response_becomes_ordered_sections() {
    let generator = generator(CannedService::replying(
        "## Introduction\nHello\n## Further Reading\nSee X\n",
    ));

    match generator.generate_from("Greetings", Depth::Beginner, Tone::Simple) {
        Ok(guide) => {
            let entries: Vec<_> = guide.sections.iter().collect();
            assert_eq!(
                entries,
                vec![("Introduction", "Hello\n"), ("Further Reading", "See X\n")]
            );
            assert!(guide.pdf.bytes.starts_with(b"%PDF"));
            assert_eq!(guide.request.topic(), "Greetings");
        }
        Err(GuideError::SerializationFailed(err)) => {
            assert!(!FontSources::default().available(), "unexpected render failure: {err}");
        }
        Err(other) => panic!("unexpected error: {other}"),
    }
    assert_eq!(generator.service().calls.get(), 1);
}

#[test]
fn plain_response_stays_in_introduction() {
    let generator = generator(CannedService::replying("Just text, no headings.\n"));

    match generator.generate_from("Anything", Depth::Intermediate, Tone::Academic) {
        Ok(guide) => {
            assert_eq!(guide.sections.len(), 1);
            assert_eq!(
                guide.sections.get("Introduction"),
                Some("Just text, no headings.\n")
            );
            assert_eq!(guide.pdf.section_pages.len(), 1);
        }
        Err(GuideError::SerializationFailed(err)) => {
            assert!(!FontSources::default().available(), "unexpected render failure: {err}");
        }
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_topic_never_reaches_the_service() {
    let generator = generator(CannedService::replying("unused"));

    let err = generator
        .generate_from("   ", Depth::Beginner, Tone::Academic)
        .unwrap_err();

    assert!(matches!(err, GuideError::InputInvalid(_)));
    assert_eq!(generator.service().calls.get(), 0);
}

#[test]
fn service_failure_is_one_tagged_error() {
    let generator = generator(CannedService::failing(503));

    let err = generator
        .generate_from("Volcanoes", Depth::Advanced, Tone::Conversational)
        .unwrap_err();

    match &err {
        GuideError::ServiceUnavailable(ServiceError::Status { status, .. }) => {
            assert_eq!(*status, 503)
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        err.to_string(),
        "content service unavailable: service returned 503: simulated outage"
    );

    // The generator keeps working for the next attempt.
    assert!(generator
        .generate_from("Volcanoes", Depth::Advanced, Tone::Conversational)
        .is_err());
    assert_eq!(generator.service().calls.get(), 2);
}

#[test]
fn prompt_carries_fields_and_marker() {
    let generator = generator(CannedService::failing(500)).with_marker(HeadingMarker::new('#', 3));

    let _ = generator.generate_from("Cells, Mitosis", Depth::Intermediate, Tone::Conversational);

    let prompts = generator.service().prompts.borrow();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("topics: Cells, Mitosis."));
    assert!(prompts[0].contains("- Depth: Intermediate"));
    assert!(prompts[0].contains("- Tone: Conversational"));
    assert!(prompts[0].contains("### Heading"));
}

const SYSTEM_FONT_FILES: [&str; 4] = [
    "DejaVuSans.ttf",
    "DejaVuSans-Bold.ttf",
    "DejaVuSans-Oblique.ttf",
    "DejaVuSans-BoldOblique.ttf",
];

#[test]
fn missing_fonts_fail_serialization_without_breaking_the_generator() {
    let fonts_dir = tempfile::tempdir().expect("temp dir");
    let renderer = PdfRenderer::new("Study Guide")
        .with_fonts(FontSources::new(fonts_dir.path()).with_bundled_dir(fonts_dir.path()));
    let generator = StudyGuideGenerator::new(
        CannedService::replying("## Overview\nSome text\n"),
        renderer,
    );

    let outcome = generator.generate_from("Rivers", Depth::Beginner, Tone::Simple);
    let err = outcome.as_ref().unwrap_err();
    assert!(matches!(err, GuideError::SerializationFailed(_)), "{err}");
    assert_eq!(generator.service().calls.get(), 1);

    let page = Page::from_outcome("Rivers", Depth::Beginner, Tone::Simple, &outcome);
    let banner = page.error.as_deref().expect("error banner");
    assert!(banner.starts_with("Error: study guide serialization failed: "), "{banner}");
    assert!(page.warning.is_none());
    assert!(page.cards.is_empty());
    assert!(page.download.is_none());

    let html = UiRenderer::new().expect("template parses").render(&page).unwrap();
    assert_eq!(html.matches("notice error").count(), 1);
    assert!(!html.contains("Download PDF"));

    // Once fonts show up, the same generator renders again.
    let defaults = FontSources::default();
    let system_dir = defaults.system_dir();
    if SYSTEM_FONT_FILES.iter().all(|name| system_dir.join(name).is_file()) {
        for name in SYSTEM_FONT_FILES {
            fs::copy(system_dir.join(name), fonts_dir.path().join(name)).unwrap();
        }
        let guide = generator
            .generate_from("Rivers", Depth::Beginner, Tone::Simple)
            .expect("render after fonts were added");
        assert!(guide.pdf.bytes.starts_with(b"%PDF"));
    } else {
        assert!(matches!(
            generator.generate_from("Rivers", Depth::Beginner, Tone::Simple),
            Err(GuideError::SerializationFailed(_))
        ));
    }
    assert_eq!(generator.service().calls.get(), 2);
}
