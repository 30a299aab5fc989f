use axum::{
    extract::{Path, State},
    response::Html,
};
use tracing::{info, instrument};

use crate::{
    AppState,
    db::errors::DbError,
    errors::{Error, Result},
    types::StorageKey,
    workflow::ScanResult,
};

/// Recognize the text of a stored image and list its lines, longest one highlighted
#[instrument(skip(state))]
pub async fn scan_image(State(state): State<AppState>, Path(key): Path<String>) -> Result<Html<String>> {
    let key = StorageKey::parse(&key).ok_or_else(|| Error::ScanFailed {
        message: format!("invalid image name {key:?}"),
    })?;

    let image = state.storage.retrieve(&key).await.map_err(|e| match e {
        DbError::NotFound => Error::ScanFailed {
            message: format!("image {key} not found"),
        },
        e => Error::ScanFailed { message: e.to_string() },
    })?;

    let text = state
        .ocr
        .recognize(&image, key.as_str())
        .await
        .map_err(|e| Error::ScanFailed { message: format!("{e:#}") })?;

    let scan = ScanResult::from_text(&text)?;
    info!(lines = scan.lines.len(), "Scanned image");

    state.templates.render("scan.html", &scan)
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{StaticDictionary, StaticOcrEngine, TestApp, create_test_app};
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};

    async fn upload(app: &TestApp, filename: &str) -> String {
        let form = MultipartForm::new().add_part("file", Part::bytes(b"image".to_vec()).file_name(filename));
        let response = app.server.post("/").multipart(form).await;
        response.assert_status(StatusCode::SEE_OTHER);
        response.header("location").to_str().unwrap().to_string()
    }

    fn notice_cookie(response: &axum_test::TestResponse) -> String {
        response.header("set-cookie").to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_scan_lists_lines_and_highlights_longest() {
        let app = create_test_app(StaticOcrEngine::text("一鳴驚人\n\n  \n學而時習之\n溫故知新\n"), StaticDictionary::default()).await;
        let location = upload(&app, "page.png").await;

        let response = app.server.get(&location).await;

        response.assert_status_ok();
        let page = response.text();
        for line in ["一鳴驚人", "學而時習之", "溫故知新"] {
            assert!(page.contains(&format!(r#"value="{line}""#)), "{line}");
        }
        assert!(page.contains(r#"<span class="longest">學而時習之</span>"#));
    }

    #[tokio::test]
    async fn test_scan_of_key_needing_encoding() {
        let app = create_test_app(StaticOcrEngine::text("學而時習之"), StaticDictionary::default()).await;
        let location = upload(&app, "成語 #1.png").await;

        app.server.get(&location).await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_blank_ocr_output_redirects_with_no_text_notice() {
        let app = create_test_app(StaticOcrEngine::text(" \n\t\n"), StaticDictionary::default()).await;
        let location = upload(&app, "blank.png").await;

        let response = app.server.get(&location).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/");
        assert!(notice_cookie(&response).starts_with("idiomcard_notice="));
    }

    #[tokio::test]
    async fn test_ocr_failure_redirects_with_scan_failed_notice() {
        let app = create_test_app(StaticOcrEngine::failing("unreadable image"), StaticDictionary::default()).await;
        let location = upload(&app, "broken.png").await;

        let response = app.server.get(&location).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/");

        let pair = notice_cookie(&response).split(';').next().unwrap().to_string();
        let form = app.server.get("/").add_header("cookie", pair.as_str()).await;
        assert!(form.text().contains("unreadable image"));
    }

    #[tokio::test]
    async fn test_missing_image_redirects_home() {
        let app = create_test_app(StaticOcrEngine::text("x"), StaticDictionary::default()).await;

        let response = app.server.get("/scan/never-uploaded.png").await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/");
    }

    #[tokio::test]
    async fn test_key_with_separator_is_refused() {
        let app = create_test_app(StaticOcrEngine::text("x"), StaticDictionary::default()).await;

        let response = app.server.get("/scan/uploads%5Csecret.png").await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/");
    }
}
