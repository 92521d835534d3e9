//! The listing and upload pages.
//!
//! Listing shows the first page of the PDF folder, newest first; upload
//! validates the selection locally, then hands the bytes to the storage
//! backend under a freshly derived key.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use bytes::Bytes;
use chrono::Utc;
use tracing::warn;

use crate::errors::AppError;
use crate::handlers::{html_escape, notice, page};
use crate::models::file_entry::FileCard;
use crate::models::session::{Session, SessionState};
use crate::services::storage_client::{
    PDF_MIME, StorageApiError, friendly_upload_error, object_key,
};
use crate::state::AppState;

/// GET `/` — every uploaded PDF, newest first.
///
/// Listing failures are shown verbatim with a prefix and leave the file set
/// empty; there is no retry.
pub async fn list_files(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.sessions.current();
    let token = snapshot.session.as_ref().map(|s| s.access_token.clone());

    let (cards, error) = match state.storage.list_pdfs(token.as_deref()).await {
        Ok(entries) => {
            let now = Utc::now();
            let cards: Vec<FileCard> = entries
                .iter()
                .map(|entry| {
                    FileCard::from_entry(entry, state.storage.public_url(&entry.name), now)
                })
                .collect();
            (cards, None)
        }
        Err(err) => {
            if let StorageApiError::Provider { status, .. } = &err {
                warn!(status, "storage listing rejected");
            }
            (Vec::new(), Some(format!("Could not load files: {err}")))
        }
    };

    Html(render_listing(&snapshot, &cards, error.as_deref()))
}

/// GET `/upload` — the upload form, gated on a live session.
pub async fn upload_page(State(state): State<AppState>) -> Response {
    let snapshot = state.sessions.current();
    if snapshot.loading {
        return Html(page(
            "Loading",
            r#"<section class="panel"><p>Checking your session…</p></section>"#,
        ))
        .into_response();
    }
    match snapshot.session {
        Some(session) => Html(render_upload(&session, None)).into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

/// POST `/upload` — validate the multipart selection and push it to storage.
pub async fn upload_submit(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let snapshot = state.sessions.current();
    let Some(session) = snapshot.session else {
        return Ok(Redirect::to("/login").into_response());
    };

    let mut picked: Option<(String, Option<String>, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::new(StatusCode::BAD_REQUEST, err.to_string()))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|err| AppError::new(StatusCode::BAD_REQUEST, err.to_string()))?;
            picked = Some((file_name, content_type, bytes));
        }
    }

    let Some((file_name, content_type, bytes)) = picked else {
        return Ok(upload_result(
            &session,
            "error",
            "Please choose a PDF file.".into(),
        ));
    };

    if !is_pdf_selection(content_type.as_deref()) {
        return Ok(upload_result(
            &session,
            "error",
            "Only PDF files are allowed.".into(),
        ));
    }

    let identifier = session
        .student_number()
        .unwrap_or_else(|| "student".to_string());
    let key = object_key(&identifier, &file_name, Utc::now());

    // The held session can go stale between rendering the form and the
    // submit; re-check immediately before the provider call.
    let Some(live) = state.sessions.current().session else {
        return Ok(Redirect::to("/login").into_response());
    };

    match state.storage.upload_pdf(&key, bytes, &live.access_token).await {
        Ok(()) => Ok(upload_result(
            &session,
            "success",
            "PDF uploaded successfully.".into(),
        )),
        Err(err) => {
            if let StorageApiError::Provider { status, .. } = &err {
                warn!(status, "upload rejected");
            }
            Ok(upload_result(
                &session,
                "error",
                format!("Upload failed: {}", friendly_upload_error(&err)),
            ))
        }
    }
}

/// The declared type must be exactly the PDF MIME type; nothing else is
/// sent to the backend.
fn is_pdf_selection(content_type: Option<&str>) -> bool {
    content_type == Some(PDF_MIME)
}

fn upload_result(session: &Session, kind: &'static str, text: String) -> Response {
    Html(render_upload(session, Some((kind, text)))).into_response()
}

fn render_listing(state: &SessionState, cards: &[FileCard], error: Option<&str>) -> String {
    let mut header = String::from("<header><div><h1>Lecture notes &amp; pages</h1>");
    if let Some(session) = &state.session {
        if let Some(id) = session.student_number() {
            header.push_str(&format!(
                r#"<p class="who">Student number: <strong>{}</strong></p>"#,
                html_escape(&id)
            ));
        }
    }
    header.push_str("</div><nav>");
    if state.session.is_some() {
        header.push_str(
            concat!(
                r#"<a class="button" href="/upload">Upload PDF</a>"#,
                r#"<form method="post" action="/logout">"#,
                r#"<button type="submit" class="danger">Sign out</button></form>"#
            ),
        );
    } else {
        header.push_str(r#"<a class="button" href="/login">Sign in</a>"#);
    }
    header.push_str("</nav></header>");

    let mut main = String::from("<main>");
    if let Some(error) = error {
        main.push_str(&notice("error", error));
    } else if cards.is_empty() {
        main.push_str(
            concat!(
                r#"<div class="empty"><h2>No files yet</h2>"#,
                r#"<p>Start by uploading your first PDF.</p>"#,
                r#"<a class="button" href="/upload">Upload PDF</a></div>"#
            ),
        );
    } else {
        main.push_str(&format!(
            r#"<p>Total: <strong>{}</strong> file(s)</p><div class="grid">"#,
            cards.len()
        ));
        for card in cards {
            main.push_str(&render_card(card));
        }
        main.push_str("</div>");
    }
    main.push_str("</main>");

    page("Files", &format!("{header}{main}"))
}

fn render_card(card: &FileCard) -> String {
    let id_attr = card
        .id
        .map(|id| format!(r#" data-id="{id}""#))
        .unwrap_or_default();
    let mime = card
        .mime
        .as_deref()
        .map(|mime| format!(" · {}", html_escape(mime)))
        .unwrap_or_default();
    format!(
        concat!(
            r#"<article class="card"{id_attr}>"#,
            r#"<h3>{title}</h3>"#,
            r#"<p class="meta">{age} · {size}{mime}</p>"#,
            r#"<div class="actions">"#,
            r#"<a class="button" href="{url}" target="_blank" rel="noopener noreferrer">View</a>"#,
            r#"<a class="button secondary" href="{url}" download>Download</a>"#,
            r#"</div></article>"#
        ),
        id_attr = id_attr,
        title = html_escape(&card.title),
        age = html_escape(&card.age),
        size = html_escape(&card.size),
        mime = mime,
        url = html_escape(&card.url),
    )
}

fn render_upload(session: &Session, message: Option<(&str, String)>) -> String {
    let mut body = String::from(r#"<section class="panel"><h1>Upload a PDF</h1>"#);
    body.push_str(&format!(
        r#"<p class="who">Hello, {}!</p>"#,
        html_escape(&session.display_label())
    ));
    body.push_str(
        concat!(
            r#"<form method="post" action="/upload" enctype="multipart/form-data">"#,
            r#"<input type="file" name="file" accept="application/pdf" required>"#,
            r#"<button type="submit">Upload</button></form>"#
        ),
    );
    if let Some((kind, text)) = message {
        body.push_str(&notice(kind, &text));
    }
    body.push_str(
        concat!(
            r#"<p><a href="/">Back to the file list</a></p>"#,
            r#"<form method="post" action="/logout">"#,
            r#"<button type="submit" class="danger">Sign out</button></form></section>"#
        ),
    );
    page("Upload", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::{AuthUser, ProfileMetadata};
    use uuid::Uuid;

    fn signed_in_state() -> SessionState {
        SessionState {
            loading: false,
            session: Some(Session {
                access_token: "jwt".into(),
                user: AuthUser {
                    id: Uuid::new_v4(),
                    email: Some("12345@student.local".into()),
                    email_confirmed_at: None,
                    user_metadata: ProfileMetadata {
                        student_id: Some("12345".into()),
                        display_name: Some("Student 12345".into()),
                    },
                },
            }),
        }
    }

    fn card(name: &str) -> FileCard {
        FileCard {
            id: Some(Uuid::new_v4()),
            title: name.to_string(),
            url: format!("https://backend.local/storage/v1/object/public/uploads/pdfs/{name}"),
            age: "today".into(),
            size: "1.00 MB".into(),
            mime: Some("application/pdf".into()),
        }
    }

    #[test]
    fn test_only_exact_pdf_mime_is_accepted() {
        assert!(is_pdf_selection(Some("application/pdf")));
        assert!(!is_pdf_selection(Some("text/plain")));
        assert!(!is_pdf_selection(Some("application/pdf; charset=binary")));
        assert!(!is_pdf_selection(None));
    }

    #[test]
    fn test_empty_listing_renders_empty_state() {
        let html = render_listing(&signed_in_state(), &[], None);
        assert!(html.contains("No files yet"));
        assert!(!html.contains("class=\"card\""));
    }

    #[test]
    fn test_listing_renders_one_card_per_entry_with_public_url() {
        let cards = vec![card("a.pdf"), card("b.pdf"), card("c.pdf")];
        let html = render_listing(&signed_in_state(), &cards, None);
        assert_eq!(html.matches(r#"<article class="card""#).count(), 3);
        for card in &cards {
            assert!(html.contains(&card.url));
        }
        assert!(html.contains("Total: <strong>3</strong>"));
    }

    #[test]
    fn test_listing_error_renders_verbatim_with_prefix() {
        let html = render_listing(
            &SessionState {
                loading: false,
                session: None,
            },
            &[],
            Some("Could not load files: Bucket not found"),
        );
        assert!(html.contains("Could not load files: Bucket not found"));
        assert!(!html.contains("No files yet"));
    }

    #[test]
    fn test_signed_out_listing_offers_sign_in() {
        let state = SessionState {
            loading: false,
            session: None,
        };
        let html = render_listing(&state, &[], None);
        assert!(html.contains(r#"href="/login""#));
        assert!(!html.contains("/logout"));
    }

    #[test]
    fn test_upload_page_greets_the_student() {
        let state = signed_in_state();
        let html = render_upload(state.session.as_ref().unwrap(), None);
        assert!(html.contains("Student 12345"));
        assert!(html.contains(r#"enctype="multipart/form-data""#));
    }
}
