use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::{AppState, AuthUser},
    error::{AppError, AppResult},
    models::{CalendarEntry, CalendarQuery, NewCalendarEntry},
};

fn forbidden() -> AppError {
    AppError::Forbidden("forbidden".to_string())
}

/// Lists the caller's calendar entries, optionally limited to one month
pub async fn list_entries(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<CalendarQuery>, QueryRejection>,
) -> AppResult<Json<Vec<CalendarEntry>>> {
    let Query(query) = query?;
    let entries = state
        .store
        .list_calendar(user.id(), query.range()?)
        .await?;
    Ok(Json(entries))
}

pub async fn create_entry(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<NewCalendarEntry>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CalendarEntry>)> {
    let Json(request) = payload?;
    let date = request.parse_date()?;

    let outfit = state
        .store
        .get_outfit(&request.outfit_id)
        .await?
        .ok_or_else(|| AppError::NotFound("outfit_not_found".to_string()))?;

    if outfit.user_id != user.id() {
        return Err(forbidden());
    }

    let entry = state
        .store
        .create_calendar_entry(user.id(), &outfit.id, date)
        .await?;
    tracing::info!(entry_id = %entry.id, outfit_id = %outfit.id, %date, "Scheduled outfit");

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let entry = state
        .store
        .get_calendar_entry(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("entry_not_found".to_string()))?;

    if entry.user_id != user.id() {
        return Err(forbidden());
    }

    state.store.delete_calendar_entry(&entry.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
