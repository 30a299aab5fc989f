use axum::{
    Json,
    extract::{Path, Query, State},
    response::Html,
};
use minijinja::context;
use tracing::{info, instrument};

use crate::{
    AppState,
    api::models::{
        forms::GenerateLinkForm,
        idioms::{GenerateLinkResponse, IdiomResponse, ListIdiomsQuery},
    },
    db::{
        handlers::{Idioms, Repository, idioms::IdiomFilter},
        models::idioms::IdiomCreateDBRequest,
    },
    errors::{Error, Result},
    workflow::draw_card,
};

/// Draw an idiom and an explanation from the submission, persist them and answer with the card link
#[instrument(skip_all, fields(selected = form.selected_texts.len(), explanations = form.explanations.len()))]
pub async fn generate_link(State(state): State<AppState>, form: GenerateLinkForm) -> Result<Json<GenerateLinkResponse>> {
    let draw = {
        let mut rng = rand::rng();
        draw_card(&form.selected_texts, &form.explanations, state.config.card.sample_size, &mut rng)?
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::PersistFailed { message: e.to_string() })?;
    let mut repo = Idioms::new(&mut conn);
    let card = repo
        .create(&IdiomCreateDBRequest::new(draw.idiom, draw.explanation))
        .await
        .map_err(|e| Error::PersistFailed { message: e.to_string() })?;

    info!(id = card.id, idiom = %card.idiom, "Persisted idiom card");
    Ok(Json(GenerateLinkResponse { link: card.link }))
}

/// Show the earliest card persisted for `idiom`
#[instrument(skip(state))]
pub async fn render_card(State(state): State<AppState>, Path(idiom): Path<String>) -> Result<Html<String>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Idioms::new(&mut conn);

    let card = repo.first_by_idiom(&idiom).await?.ok_or(Error::NotFound { idiom })?;

    state.templates.render(
        "card.html",
        context! { idiom => card.idiom, explanation => card.explanation },
    )
}

/// List persisted cards in insertion order
#[instrument(skip(state))]
pub async fn list_idioms(State(state): State<AppState>, Query(query): Query<ListIdiomsQuery>) -> Result<Json<Vec<IdiomResponse>>> {
    let mut filter = IdiomFilter::new(query.skip(), query.limit());
    if let Some(idiom) = query.idiom {
        filter = filter.with_idiom(idiom);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Idioms::new(&mut conn);
    let cards = repo.list(&filter).await?;

    Ok(Json(cards.into_iter().map(IdiomResponse::from).collect()))
}
