mod common;

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::IntoResponse;
use tower::ServiceExt;

use briefdoc::gdocs::{DocsClient, RemoteDocument};
use briefdoc::server::{AppState, CollaboratorFailure, ServerConfig, router};
use briefdoc::{Error, FieldEntry, FontConfig, RenderOptions};

/// Records calls and answers with a fixed document or a canned failure.
struct FakeDocs {
    fail_with: Option<fn() -> Error>,
    calls: Mutex<Vec<(String, Vec<FieldEntry>)>>,
}

impl FakeDocs {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail_with: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing(fail_with: fn() -> Error) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(fail_with),
            calls: Mutex::new(Vec::new()),
        })
    }
}

impl DocsClient for FakeDocs {
    fn create_briefing_doc(&self, title: &str, entries: &[FieldEntry]) -> Result<RemoteDocument, Error> {
        self.calls
            .lock()
            .unwrap()
            .push((title.to_string(), entries.to_vec()));
        match &self.fail_with {
            Some(fail_with) => Err(fail_with()),
            None => Ok(RemoteDocument::from_id("doc-42")),
        }
    }
}

fn app(docs: Option<Arc<dyn DocsClient>>) -> Router {
    let state = AppState::new(RenderOptions::default(), FontConfig::default(), docs);
    router(state, &ServerConfig::default())
}

fn multipart_post(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, common::multipart_content_type())
        .body(Body::from(common::multipart_body(fields)))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn download_returns_pdf_attachment() {
    let response = app(None)
        .oneshot(multipart_post(
            "/api/download-pdf",
            &[("Empresa", "Acme Corp"), ("Telefono", "555-1234")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Briefing_Acme_Corp.pdf\""
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(common::pdf_page_count(&bytes), 1);
}

#[tokio::test]
async fn download_without_title_field_uses_placeholder_filename() {
    let response = app(None)
        .oneshot(multipart_post("/api/download-pdf", &[("Contacto", "Ana")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Briefing_Sin_Nombre.pdf\""
    );
}

#[tokio::test]
async fn download_paginates_large_forms() {
    let labels: Vec<String> = (1..=30).map(|i| format!("campo_{i}")).collect();
    let fields: Vec<(&str, &str)> = labels.iter().map(|l| (l.as_str(), "valor")).collect();
    let response = app(None)
        .oneshot(multipart_post("/api/download-pdf", &fields))
        .await
        .unwrap();

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(common::pdf_page_count(&bytes), 3);
}

#[tokio::test]
async fn download_accepts_urlencoded_bodies() {
    let request = Request::post("/api/download-pdf")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("Empresa=Caf%C3%A9+Luna&Telefono=555"))
        .unwrap();
    let response = app(None).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION].as_bytes(),
        "attachment; filename=\"Briefing_Café_Luna.pdf\"".as_bytes()
    );
}

#[tokio::test]
async fn unsupported_content_type_is_rejected() {
    let request = Request::post("/api/download-pdf")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"Empresa":"Acme"}"#))
        .unwrap();
    let response = app(None).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn save_doc_reports_document_url() {
    let docs = FakeDocs::ok();
    let response = app(Some(docs.clone()))
        .oneshot(multipart_post(
            "/api/save-doc",
            &[("Empresa", "Acme Corp"), ("Telefono", "555-1234")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Documento creado exitosamente");
    assert_eq!(body["url"], "https://docs.google.com/document/d/doc-42/edit");

    let calls = docs.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "Briefing: Acme Corp");
    assert_eq!(
        calls[0].1,
        [
            FieldEntry::new("Empresa", "Acme Corp"),
            FieldEntry::new("Telefono", "555-1234"),
        ]
    );
}

#[tokio::test]
async fn save_doc_surfaces_upstream_failure() {
    let docs = FakeDocs::failing(|| Error::Remote("The caller does not have permission".into()));
    let response = app(Some(docs))
        .oneshot(multipart_post("/api/save-doc", &[("Empresa", "Acme")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "The caller does not have permission");
    assert_eq!(
        body["details"],
        "Check server logs. Ensure service-account.json is valid."
    );
}

#[tokio::test]
async fn save_doc_surfaces_token_endpoint_failure_unprefixed() {
    let docs = FakeDocs::failing(|| Error::Auth("invalid_grant: Invalid JWT Signature.".into()));
    let response = app(Some(docs))
        .oneshot(multipart_post("/api/save-doc", &[("Empresa", "Acme")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "invalid_grant: Invalid JWT Signature.");
}

#[tokio::test]
async fn pdf_failures_carry_their_own_hint() {
    let response = CollaboratorFailure::pdf(Error::Pdf("document has no pages".into())).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "PDF generation failed: document has no pages");
    assert_eq!(body["details"], "Check server logs. The PDF could not be generated.");

    let response = CollaboratorFailure::docs(Error::Remote("quota exceeded".into())).into_response();
    let body = json_body(response).await;
    assert_eq!(body["error"], "quota exceeded");
    assert_eq!(
        body["details"],
        "Check server logs. Ensure service-account.json is valid."
    );
}

#[tokio::test]
async fn save_doc_without_credentials_fails() {
    let response = app(None)
        .oneshot(multipart_post("/api/save-doc", &[("Empresa", "Acme")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Google Docs is not configured on this server");
}

#[tokio::test]
async fn health_answers_ok() {
    let response = app(None)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}
