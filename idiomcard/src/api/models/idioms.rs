use crate::db::models::idioms::IdiomDBResponse;
use crate::dictionary::Explanation;
use crate::types::IdiomId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Default number of cards returned by the listing endpoint.
pub const DEFAULT_LIMIT: i64 = 50;

/// Maximum number of cards that can be requested per page.
pub const MAX_LIMIT: i64 = 500;

/// Query parameters for listing idiom cards
#[derive(Debug, Default, Deserialize)]
pub struct ListIdiomsQuery {
    /// Only cards for exactly this idiom
    pub idiom: Option<String>,

    /// Number of cards to skip (default: 0)
    pub skip: Option<i64>,

    /// Maximum number of cards to return (default: 50, max: 500)
    pub limit: Option<i64>,
}

impl ListIdiomsQuery {
    #[inline]
    pub fn skip(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }

    /// Clamped between 1 and [`MAX_LIMIT`]
    #[inline]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// Persisted idiom card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdiomResponse {
    pub id: IdiomId,
    pub idiom: String,
    pub explanation: String,
    pub link: String,
    pub created_at: NaiveDateTime,
}

impl From<IdiomDBResponse> for IdiomResponse {
    fn from(db: IdiomDBResponse) -> Self {
        Self {
            id: db.id,
            idiom: db.idiom,
            explanation: db.explanation,
            link: db.link,
            created_at: db.created_at,
        }
    }
}

/// Body of the `/generate_link` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateLinkResponse {
    pub link: String,
}

/// One row of the results page
#[derive(Debug, Clone, Serialize)]
pub struct ExplanationEntry {
    pub text: String,
    pub explanation: String,
}

impl From<(String, Explanation)> for ExplanationEntry {
    fn from((text, explanation): (String, Explanation)) -> Self {
        Self {
            text,
            explanation: explanation.to_string(),
        }
    }
}
