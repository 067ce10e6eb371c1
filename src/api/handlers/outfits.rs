use std::collections::BTreeSet;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::{AppState, AuthUser},
    error::{AppError, AppResult},
    models::{GenerationRequest, ItemFilter, NewOutfit, Outfit, OutfitSuggestion},
};

/// Suggests up to three outfits from the caller's wardrobe
pub async fn generate(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> AppResult<Json<Vec<OutfitSuggestion>>> {
    let Json(request) = payload?;

    let items = state
        .store
        .list_items(user.id(), &ItemFilter::default())
        .await?;

    let suggestions = state
        .planner
        .plan(&items, request.occasion, request.temperature)
        .await;

    tracing::info!(
        occasion = %request.occasion,
        temperature = ?request.temperature,
        wardrobe_size = items.len(),
        suggestions = suggestions.len(),
        "Generated outfit suggestions"
    );

    Ok(Json(suggestions))
}

/// Saves an outfit made only of the caller's own items
pub async fn create_outfit(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<NewOutfit>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Outfit>)> {
    let Json(new_outfit) = payload?;

    let requested: BTreeSet<&str> = new_outfit.items.ids().into_iter().collect();
    let ids: Vec<&str> = requested.iter().copied().collect();
    let owned = state.store.find_items(user.id(), &ids).await?;

    if owned.len() != requested.len() {
        tracing::warn!(
            requested = requested.len(),
            owned = owned.len(),
            "Outfit references items outside the caller's wardrobe"
        );
        return Err(AppError::Forbidden("forbidden_items".to_string()));
    }

    let outfit = state.store.create_outfit(user.id(), new_outfit).await?;
    tracing::info!(outfit_id = %outfit.id, "Saved outfit");

    Ok((StatusCode::CREATED, Json(outfit)))
}

pub async fn list_outfits(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<Outfit>>> {
    let outfits = state.store.list_outfits(user.id()).await?;
    Ok(Json(outfits))
}
