//! Error taxonomy of the upload → scan → select → lookup → persist workflow.
//!
//! Stage failures never surface as error pages. They are logged, turned into a transient notice
//! and answered with a redirect to the upload form, where the user starts over. Only a missing
//! card, malformed payloads and infrastructure failures get a real error status.

use crate::db::errors::DbError;
use crate::notice;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

/// Body of the 404 returned for a card link with no matching record
pub const CARD_NOT_FOUND_MESSAGE: &str = "成語未找到";

#[derive(ThisError, Debug)]
pub enum Error {
    /// The upload form was submitted without a `file` part
    #[error("Upload is missing the file part")]
    MissingFile,

    /// The `file` part carried no filename
    #[error("Upload has an empty filename")]
    EmptyFilename,

    /// The filename cannot be used as a storage key
    #[error("Filename {filename:?} is not a valid storage key")]
    InvalidFilename { filename: String },

    /// Reading the multipart body or writing the blob failed
    #[error("Failed to store upload: {message}")]
    UploadFailed { message: String },

    /// OCR produced nothing but blank lines
    #[error("No text found in image")]
    NoTextFound,

    /// The image could not be loaded or recognized
    #[error("Failed to scan image: {message}")]
    ScanFailed { message: String },

    /// Nothing was selected
    #[error("No text selected")]
    NoSelection,

    /// Not enough selected texts or explanations to draw a card from
    #[error("Need at least {required} selected texts and explanations, got {selected} and {explanations}")]
    InsufficientData {
        required: usize,
        selected: usize,
        explanations: usize,
    },

    /// Writing the idiom record failed
    #[error("Failed to persist idiom card: {message}")]
    PersistFailed { message: String },

    /// No idiom record matches the requested card
    #[error("Idiom card {idiom:?} not found")]
    NotFound { idiom: String },

    /// Malformed request payload
    #[error("{message}")]
    BadRequest { message: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Stage failures recovered by redirecting back to the upload form
    pub fn is_workflow_failure(&self) -> bool {
        matches!(
            self,
            Error::MissingFile
                | Error::EmptyFilename
                | Error::InvalidFilename { .. }
                | Error::UploadFailed { .. }
                | Error::NoTextFound
                | Error::ScanFailed { .. }
                | Error::NoSelection
                | Error::InsufficientData { .. }
                | Error::PersistFailed { .. }
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            e if e.is_workflow_failure() => StatusCode::SEE_OTHER,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Database(DbError::NotFound) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::MissingFile => "未找到檔案部分".to_string(),
            Error::EmptyFilename => "沒有選擇檔案".to_string(),
            Error::InvalidFilename { filename } => format!("無法使用的檔名: {filename}"),
            Error::UploadFailed { message } => format!("上傳檔案時發生錯誤: {message}"),
            Error::NoTextFound => "未掃描到任何文字".to_string(),
            Error::ScanFailed { message } => format!("掃描圖片時發生錯誤: {message}"),
            Error::NoSelection => "沒有選擇任何文字".to_string(),
            Error::InsufficientData { required, .. } => format!("至少需要 {required} 個成語與 {required} 個解釋"),
            Error::PersistFailed { message } => format!("資料儲存錯誤: {message}"),
            Error::NotFound { .. } => CARD_NOT_FOUND_MESSAGE.to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::Database(DbError::NotFound) => "Resource not found".to_string(),
            Error::Database(_) | Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::PersistFailed { .. } | Error::Database(_) | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::UploadFailed { .. } | Error::ScanFailed { .. } => {
                tracing::warn!("Workflow stage failed: {}", self);
            }
            _ => {
                tracing::debug!("Client error: {}", self);
            }
        }

        if self.is_workflow_failure() {
            return notice::redirect_with_notice("/", &self.user_message());
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn test_workflow_failures_redirect_home_with_notice() {
        let response = Error::NoTextFound.into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
        let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with(notice::NOTICE_COOKIE));
    }

    #[test]
    fn test_not_found_is_plain_404() {
        let err = Error::NotFound {
            idiom: "不存在的成語".to_string(),
        };
        assert!(!err.is_workflow_failure());

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/plain")
        );
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = Error::Other(anyhow::anyhow!("connection refused on 10.0.0.3"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "Internal server error");
    }

    #[test]
    fn test_insufficient_data_message_names_requirement() {
        let err = Error::InsufficientData {
            required: 3,
            selected: 2,
            explanations: 5,
        };
        assert!(err.is_workflow_failure());
        assert!(err.user_message().contains('3'));
    }
}
