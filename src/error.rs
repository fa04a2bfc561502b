use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("font error: {0}")]
    Font(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    // Auth and Remote carry the upstream message; callers see it as-is.
    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Remote(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
