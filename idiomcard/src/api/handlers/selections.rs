use axum::{extract::State, response::Html};
use minijinja::context;
use tracing::{info, instrument};

use crate::{
    AppState,
    api::models::{forms::SelectionForm, idioms::ExplanationEntry},
    dictionary::{Explanation, lookup_all},
    errors::Result,
    workflow::{lookup_keys, require_selection},
};

/// Echo the chosen texts back, unchanged, as the input of the lookup stage
#[instrument(skip_all, fields(selected = form.selected_texts.len()))]
pub async fn select_text(State(state): State<AppState>, form: SelectionForm) -> Result<Html<String>> {
    require_selection(&form.selected_texts)?;

    state.templates.render("select.html", context! { selected_texts => form.selected_texts })
}

/// Look up an explanation for every selected text.
///
/// A failed lookup only affects its own entry, which shows a marker instead of an explanation.
#[instrument(skip_all, fields(selected = form.selected_texts.len()))]
pub async fn get_idiom(State(state): State<AppState>, form: SelectionForm) -> Result<Html<String>> {
    let texts = lookup_keys(&form.selected_texts);
    let results = lookup_all(state.dictionary.clone(), &texts, state.config.dictionary.max_concurrency).await;

    let found = results.iter().filter(|(_, e)| matches!(e, Explanation::Found(_))).count();
    info!(found, total = results.len(), "Looked up explanations");

    let entries: Vec<ExplanationEntry> = results.into_iter().map(ExplanationEntry::from).collect();
    state.templates.render("results.html", context! { explanations => entries })
}
