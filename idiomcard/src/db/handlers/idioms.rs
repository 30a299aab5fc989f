//! Database repository for idiom cards.

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::idioms::{IdiomCreateDBRequest, IdiomDBResponse},
    },
};
use sqlx::SqliteConnection;
use tracing::instrument;

/// Filter for listing idiom cards
#[derive(Debug, Clone)]
pub struct IdiomFilter {
    /// Only cards for exactly this idiom
    pub idiom: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

impl IdiomFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { idiom: None, skip, limit }
    }

    pub fn with_idiom(mut self, idiom: impl Into<String>) -> Self {
        self.idiom = Some(idiom.into());
        self
    }
}

pub struct Idioms<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Idioms<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// The earliest-inserted card for `idiom`, if any.
    ///
    /// Idioms are not unique; storage order decides which duplicate a card link shows.
    #[instrument(skip(self), err)]
    pub async fn first_by_idiom(&mut self, idiom: &str) -> Result<Option<IdiomDBResponse>> {
        let card = sqlx::query_as::<_, IdiomDBResponse>(
            r#"
            SELECT id, idiom, explanation, link, created_at
            FROM idioms
            WHERE idiom = ?1
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(idiom)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(card)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Idioms<'c> {
    type CreateRequest = IdiomCreateDBRequest;
    type Response = IdiomDBResponse;
    type Filter = IdiomFilter;

    #[instrument(skip(self, request), fields(idiom = %request.idiom), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let card = sqlx::query_as::<_, IdiomDBResponse>(
            r#"
            INSERT INTO idioms (idiom, explanation, link)
            VALUES (?1, ?2, ?3)
            RETURNING id, idiom, explanation, link, created_at
            "#,
        )
        .bind(&request.idiom)
        .bind(&request.explanation)
        .bind(&request.link)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(card)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let cards = sqlx::query_as::<_, IdiomDBResponse>(
            r#"
            SELECT id, idiom, explanation, link, created_at
            FROM idioms
            WHERE ?1 IS NULL OR idiom = ?1
            ORDER BY id ASC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(filter.idiom.as_deref())
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_pool;

    #[tokio::test]
    async fn test_create_assigns_increasing_ids_and_link() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Idioms::new(&mut conn);

        let first = repo.create(&IdiomCreateDBRequest::new("學而時習之", "學了又時常溫習")).await.unwrap();
        let second = repo.create(&IdiomCreateDBRequest::new("溫故知新", "溫習舊的而得到新的體會")).await.unwrap();

        assert!(second.id > first.id);
        assert_eq!(first.idiom, "學而時習之");
        assert_eq!(first.link, "/card/學而時習之");
        assert_eq!(second.explanation, "溫習舊的而得到新的體會");
    }

    #[tokio::test]
    async fn test_first_by_idiom_returns_earliest_duplicate() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Idioms::new(&mut conn);

        let earliest = repo.create(&IdiomCreateDBRequest::new("一鳴驚人", "第一個解釋")).await.unwrap();
        repo.create(&IdiomCreateDBRequest::new("一鳴驚人", "第二個解釋")).await.unwrap();

        let found = repo.first_by_idiom("一鳴驚人").await.unwrap().expect("card should exist");
        assert_eq!(found, earliest);
        assert_eq!(found.explanation, "第一個解釋");
    }

    #[tokio::test]
    async fn test_first_by_idiom_is_exact_match() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Idioms::new(&mut conn);

        repo.create(&IdiomCreateDBRequest::new("一鳴驚人", "解釋")).await.unwrap();

        assert!(repo.first_by_idiom("一鳴").await.unwrap().is_none());
        assert!(repo.first_by_idiom("不存在的成語").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Idioms::new(&mut conn);

        for (idiom, explanation) in [("甲", "1"), ("乙", "2"), ("甲", "3"), ("丙", "4")] {
            repo.create(&IdiomCreateDBRequest::new(idiom, explanation)).await.unwrap();
        }

        let all = repo.list(&IdiomFilter::new(0, 10)).await.unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));

        let page = repo.list(&IdiomFilter::new(1, 2)).await.unwrap();
        let explanations: Vec<_> = page.iter().map(|c| c.explanation.as_str()).collect();
        assert_eq!(explanations, vec!["2", "3"]);

        let only_jia = repo.list(&IdiomFilter::new(0, 10).with_idiom("甲")).await.unwrap();
        let explanations: Vec<_> = only_jia.iter().map(|c| c.explanation.as_str()).collect();
        assert_eq!(explanations, vec!["1", "3"]);
    }
}
