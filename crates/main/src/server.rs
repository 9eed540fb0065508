//! Browser interface served over HTTP.

use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use study_guide::generator::DynContentService;
use study_guide::ui::{Page, UiRenderer};
use study_guide::{Config, Depth, StudyGuideGenerator, Tone};

/// State shared by the handlers.
///
/// Nothing in here changes between requests; every generation produces its
/// own in-memory PDF.
#[derive(Clone)]
pub struct AppState {
    generator: Arc<StudyGuideGenerator<DynContentService>>,
    ui: Arc<UiRenderer>,
}

impl AppState {
    pub fn new(generator: StudyGuideGenerator<DynContentService>) -> anyhow::Result<Self> {
        Ok(Self {
            generator: Arc::new(generator),
            ui: Arc::new(UiRenderer::new()?),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenerateForm {
    #[serde(default)]
    topic: String,
    depth: Depth,
    tone: Tone,
}

/// Runs the HTTP server until interrupted.
///
/// The blocking HTTP client inside the generator is created and finally
/// dropped outside of the async runtime.
pub fn serve(config: &Config) -> anyhow::Result<()> {
    let generator = StudyGuideGenerator::from_config(config)?.boxed();
    let state = AppState::new(generator)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(listen(state.clone(), &config.bind_addr));
    drop(runtime);
    result
}

async fn listen(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("++ Serving study guide UI on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
    tracing::info!("Shutting down");
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// The empty form.
async fn index(State(state): State<AppState>) -> Result<Html<String>, (StatusCode, &'static str)> {
    render(&state, &Page::form("", Depth::default(), Tone::default()))
}

/// Runs one generation on a blocking worker and renders its outcome.
///
/// Input errors come back as a warning and failures as one error message,
/// both on the same form so the user can try again.
async fn generate(
    State(state): State<AppState>,
    Form(form): Form<GenerateForm>,
) -> Result<Html<String>, (StatusCode, &'static str)> {
    let generator = Arc::clone(&state.generator);
    let topic = form.topic.clone();
    let (depth, tone) = (form.depth, form.tone);

    let outcome = tokio::task::spawn_blocking(move || generator.generate_from(&topic, depth, tone))
        .await
        .map_err(|e| {
            tracing::error!("Generation task failed: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        })?;

    match &outcome {
        Ok(guide) => tracing::info!(
            sections = guide.sections.len(),
            pdf_bytes = guide.pdf.bytes.len(),
            "Study guide generated"
        ),
        Err(e) if e.is_input_error() => tracing::warn!("Rejected input: {}", e),
        Err(e) => tracing::error!("Generation error: {}", e),
    }

    render(&state, &Page::from_outcome(form.topic, depth, tone, &outcome))
}

fn render(state: &AppState, page: &Page) -> Result<Html<String>, (StatusCode, &'static str)> {
    state.ui.render(page).map(Html).map_err(|e| {
        tracing::error!("Template error: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    })
}
