use crate::types::IdiomId;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Database request for persisting an idiom card
#[derive(Debug, Clone)]
pub struct IdiomCreateDBRequest {
    pub idiom: String,
    pub explanation: String,
    pub link: String,
}

impl IdiomCreateDBRequest {
    /// Card for `idiom`, linked as `/card/{idiom}`
    pub fn new(idiom: impl Into<String>, explanation: impl Into<String>) -> Self {
        let idiom = idiom.into();
        let link = card_link(&idiom);
        Self {
            idiom,
            explanation: explanation.into(),
            link,
        }
    }
}

/// The shareable path of the card for `idiom`
pub fn card_link(idiom: &str) -> String {
    format!("/card/{idiom}")
}

/// Database response for an idiom card. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct IdiomDBResponse {
    pub id: IdiomId,
    pub idiom: String,
    pub explanation: String,
    pub link: String,
    pub created_at: NaiveDateTime,
}
