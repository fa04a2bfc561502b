use std::time::{SystemTime, UNIX_EPOCH};

use axum::Form;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::cards::RenderOptions;
use crate::model::{Briefing, BriefingStamp, FieldEntry};

/// Ordered form fields extracted from a `multipart/form-data` or
/// `application/x-www-form-urlencoded` request body.
#[derive(Debug, Default)]
pub struct FormEntries(pub Vec<FieldEntry>);

enum BodyKind {
    Multipart,
    UrlEncoded,
    Unsupported,
}

fn body_kind(req: &Request) -> BodyKind {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();
    if content_type.starts_with("multipart/form-data") {
        BodyKind::Multipart
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        BodyKind::UrlEncoded
    } else {
        BodyKind::Unsupported
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<Vec<FieldEntry>, Response> {
    let mut entries = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(IntoResponse::into_response)?
    {
        let Some(label) = field.name().map(str::to_owned) else {
            continue;
        };
        // File parts are reported by name; their bytes are not rendered.
        let file_name = field.file_name().map(str::to_owned);
        let value = match file_name {
            Some(file_name) => file_name,
            None => field.text().await.map_err(IntoResponse::into_response)?,
        };
        entries.push(FieldEntry { label, value });
    }
    Ok(entries)
}

impl<S> FromRequest<S> for FormEntries
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let entries = match body_kind(&req) {
            BodyKind::Multipart => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(IntoResponse::into_response)?;
                read_multipart(multipart).await?
            }
            BodyKind::UrlEncoded => {
                let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(IntoResponse::into_response)?;
                pairs
                    .into_iter()
                    .map(|(label, value)| FieldEntry { label, value })
                    .collect()
            }
            BodyKind::Unsupported => {
                return Err((
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "expected multipart/form-data or application/x-www-form-urlencoded",
                )
                    .into_response());
            }
        };
        log::debug!("decoded {} form fields", entries.len());
        Ok(FormEntries(entries))
    }
}

/// Value of the configured title field, if present.
pub fn title_value<'a>(entries: &'a [FieldEntry], options: &RenderOptions) -> Option<&'a str> {
    entries
        .iter()
        .find(|e| e.label == options.title_field)
        .map(|e| e.value.as_str())
}

/// Title after defaulting: the title field's value, or the placeholder when
/// it is missing or empty.
pub fn resolve_title(entries: &[FieldEntry], options: &RenderOptions) -> String {
    options.resolve_title(title_value(entries, options)).to_string()
}

/// `Briefing_<title>.pdf`, with every whitespace run in the title replaced by
/// one underscore. Quotes and backslashes are replaced too so the name can sit
/// inside a quoted `Content-Disposition` parameter.
pub fn download_filename(title: &str) -> String {
    let mut name = String::with_capacity(title.len() + 13);
    name.push_str("Briefing_");
    let mut in_space = false;
    for ch in title.chars() {
        if ch.is_whitespace() {
            if !in_space {
                name.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        match ch {
            '"' | '\\' => name.push('_'),
            c if c.is_control() => {}
            c => name.push(c),
        }
    }
    name.push_str(".pdf");
    name
}

/// Uppercase base-36 rendering of `n`.
pub fn base36(mut n: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

impl BriefingStamp {
    /// Identifier derived from the current time in milliseconds and today's
    /// local date as `dd/mm/yyyy`.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Self {
            id: format!("BRIEF-{}", base36(millis)),
            date: jiff::Zoned::now().strftime("%d/%m/%Y").to_string(),
        }
    }
}

/// Assemble renderer input from decoded entries. Every entry is kept,
/// including the title field itself.
pub fn build_briefing(
    entries: Vec<FieldEntry>,
    options: &RenderOptions,
    stamp: BriefingStamp,
) -> Briefing {
    let title = title_value(&entries, options)
        .filter(|t| !t.is_empty())
        .map(str::to_owned);
    Briefing {
        title,
        entries,
        stamp,
    }
}
