use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::{AppState, AuthUser},
    error::{AppError, AppResult},
    models::{ItemFilter, ItemPatch, NewItem, WardrobeItem, WardrobeSummary},
};

fn item_not_found() -> AppError {
    AppError::NotFound("item_not_found".to_string())
}

/// Lists the caller's items, optionally filtered by category, color or season
pub async fn list_items(
    State(state): State<AppState>,
    user: AuthUser,
    filter: Result<Query<ItemFilter>, QueryRejection>,
) -> AppResult<Json<Vec<WardrobeItem>>> {
    let Query(filter) = filter?;
    let items = state.store.list_items(user.id(), &filter).await?;
    Ok(Json(items))
}

pub async fn get_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<WardrobeItem>> {
    state
        .store
        .get_item(user.id(), &id)
        .await?
        .map(Json)
        .ok_or_else(item_not_found)
}

pub async fn create_item(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<NewItem>, JsonRejection>,
) -> AppResult<(StatusCode, Json<WardrobeItem>)> {
    let Json(new_item) = payload?;
    new_item.validate()?;

    let item = state.store.create_item(user.id(), new_item).await?;
    tracing::info!(item_id = %item.id, category = %item.category, "Created item");

    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<ItemPatch>, JsonRejection>,
) -> AppResult<Json<WardrobeItem>> {
    let Json(patch) = payload?;
    patch.validate()?;

    let item = state
        .store
        .update_item(user.id(), &id, patch)
        .await?
        .ok_or_else(item_not_found)?;

    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if state.store.delete_item(user.id(), &id).await? {
        tracing::info!(item_id = %id, "Deleted item");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(item_not_found())
    }
}

/// Counts of the caller's items by category, season and color
pub async fn summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<WardrobeSummary>> {
    let items = state
        .store
        .list_items(user.id(), &ItemFilter::default())
        .await?;
    Ok(Json(WardrobeSummary::from_items(&items)))
}
