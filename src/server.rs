use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::cards::RenderOptions;
use crate::error::Error;
use crate::fonts::FontConfig;
use crate::form::{FormEntries, build_briefing, download_filename, resolve_title};
use crate::gdocs::DocsClient;
use crate::model::BriefingStamp;

const DOC_CREATED_MESSAGE: &str = "Documento creado exitosamente";
const DOC_FAILURE_DETAILS: &str = "Check server logs. Ensure service-account.json is valid.";
const PDF_FAILURE_DETAILS: &str = "Check server logs. The PDF could not be generated.";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub addr: SocketAddr,
    /// Enable a permissive CORS layer.
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 4321)),
            cors: false,
        }
    }
}

/// Shared, read-only state for all requests.
#[derive(Clone)]
pub struct AppState {
    pub options: Arc<RenderOptions>,
    pub fonts: Arc<FontConfig>,
    /// `None` when no service account is configured.
    pub docs: Option<Arc<dyn DocsClient>>,
}

impl AppState {
    pub fn new(options: RenderOptions, fonts: FontConfig, docs: Option<Arc<dyn DocsClient>>) -> Self {
        Self {
            options: Arc::new(options),
            fonts: Arc::new(fonts),
            docs,
        }
    }
}

/// A collaborator (serializer or remote API) failed. `error` is sent to the
/// caller verbatim, `details` is a fixed hint for the endpoint.
#[derive(Debug)]
pub struct CollaboratorFailure {
    pub error: String,
    pub details: &'static str,
}

impl CollaboratorFailure {
    pub fn pdf(e: Error) -> Self {
        log::error!("PDF generation failed: {e}");
        Self {
            error: e.to_string(),
            details: PDF_FAILURE_DETAILS,
        }
    }

    pub fn docs(e: Error) -> Self {
        log::error!("Google Docs request failed: {e}");
        Self {
            error: e.to_string(),
            details: DOC_FAILURE_DETAILS,
        }
    }
}

#[derive(Serialize)]
struct FailureBody<'a> {
    error: &'a str,
    details: &'a str,
}

impl IntoResponse for CollaboratorFailure {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(FailureBody {
                error: &self.error,
                details: self.details,
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct DocCreated {
    pub success: bool,
    pub message: String,
    pub url: String,
}

async fn download_pdf(
    State(state): State<AppState>,
    FormEntries(entries): FormEntries,
) -> Result<Response, CollaboratorFailure> {
    let title = resolve_title(&entries, &state.options);
    let filename = download_filename(&title);
    let briefing = build_briefing(entries, &state.options, BriefingStamp::now());

    let options = Arc::clone(&state.options);
    let fonts = Arc::clone(&state.fonts);
    let bytes = tokio::task::spawn_blocking(move || crate::render_briefing_pdf(&briefing, &options, &fonts))
        .await
        .map_err(|e| Error::Pdf(e.to_string()))
        .and_then(|rendered| rendered)
        .map_err(CollaboratorFailure::pdf)?;

    let disposition = HeaderValue::from_bytes(format!("attachment; filename=\"{filename}\"").as_bytes())
        .map_err(|e| CollaboratorFailure::pdf(Error::Pdf(format!("invalid filename header: {e}"))))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

async fn save_doc(
    State(state): State<AppState>,
    FormEntries(entries): FormEntries,
) -> Result<Json<DocCreated>, CollaboratorFailure> {
    let Some(docs) = state.docs.clone() else {
        return Err(CollaboratorFailure::docs(Error::Remote(
            "Google Docs is not configured on this server".into(),
        )));
    };
    let title = state.options.heading(Some(resolve_title(&entries, &state.options).as_str()));

    let doc = tokio::task::spawn_blocking(move || docs.create_briefing_doc(&title, &entries))
        .await
        .map_err(|e| Error::Remote(e.to_string()))
        .and_then(|created| created)
        .map_err(CollaboratorFailure::docs)?;

    Ok(Json(DocCreated {
        success: true,
        message: DOC_CREATED_MESSAGE.to_string(),
        url: doc.url,
    }))
}

async fn health() -> &'static str {
    "ok"
}

pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let app = Router::new()
        .route("/health", get(health))
        .route("/api/download-pdf", post(download_pdf))
        .route("/api/save-doc", post(save_doc))
        .with_state(state);

    if config.cors {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    }
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: ServerConfig, state: AppState) -> Result<(), Error> {
    let app = router(state, &config);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    log::info!("listening on http://{}", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}
